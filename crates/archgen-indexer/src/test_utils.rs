//! Test utilities for archgen-indexer

use std::fs;
use tempfile::TempDir;

/// Create a temporary repository from `(relative path, content)` pairs.
pub fn create_repo_with_structure(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }

    temp_dir
}

/// A small TypeScript service layer with imports, inheritance and a singleton.
pub fn create_test_repo() -> TempDir {
    create_repo_with_structure(&[
        (
            "src/index.ts",
            r#"import { UserService } from './services/user.service';
import express from 'express';

export function main(port: number): void {
    const service = UserService.getInstance();
    service.loadUsers();
}
"#,
        ),
        (
            "src/services/user.service.ts",
            r#"import { BaseService } from './base';
import { User } from '../models/user';

export class UserService extends BaseService implements Startable {
    private static instance: UserService;
    private users: User[] = [];

    static getInstance(): UserService {
        return this.instance;
    }

    loadUsers(): void {
    }
}
"#,
        ),
        (
            "src/services/base.ts",
            r#"export interface Startable {
    start(): void;
    name: string;
}

export class BaseService {
    protected ready = false;
}
"#,
        ),
        (
            "src/models/user.ts",
            r#"export interface User extends Entity {
    id: string;
    email?: string;
}
"#,
        ),
        ("node_modules/express/index.js", "module.exports = express;"),
    ])
}
