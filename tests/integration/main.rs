//! End-to-end tests for the archgen binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn archgen(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("archgen").unwrap();
    cmd.current_dir(cwd)
        .env_remove("GITHUB_TOKEN")
        .env_remove("AI_TYPE")
        .env_remove("AI_API_KEY")
        .env_remove("AI_MODEL")
        .env_remove("AI_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn sample_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let files = [
        (
            "src/index.ts",
            "import { UserService } from './services/user.service';\nexport function main() {}\n",
        ),
        (
            "src/services/user.service.ts",
            "export class UserService {\n  getUser(id: string) {}\n}\n",
        ),
        ("node_modules/left-pad/index.js", "module.exports = {};\n"),
    ];
    for (path, content) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    dir
}

#[test]
fn test_help_lists_commands() {
    let cwd = TempDir::new().unwrap();
    archgen(cwd.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_init_never_overwrites() {
    let cwd = TempDir::new().unwrap();
    let env_file = cwd.path().join(".env");

    archgen(cwd.path()).arg("init").assert().success();
    let written = fs::read_to_string(&env_file).unwrap();
    assert!(written.contains("GITHUB_TOKEN="));
    assert!(written.contains("AI_TYPE="));

    fs::write(&env_file, "GITHUB_TOKEN=mine\n").unwrap();
    archgen(cwd.path()).arg("init").assert().success();
    assert_eq!(fs::read_to_string(&env_file).unwrap(), "GITHUB_TOKEN=mine\n");
}

#[test]
fn test_generate_json_to_stdout() {
    let repo = sample_repo();
    let cwd = TempDir::new().unwrap();

    let output = archgen(cwd.path())
        .args(["generate", "-r"])
        .arg(repo.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let diagram: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = diagram["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"src/index.ts"));
    assert!(ids.contains(&"src/services/user.service.ts#UserService"));
    assert!(!ids.iter().any(|id| id.starts_with("node_modules")));
    assert_eq!(diagram["metadata"]["type"], "functional");
}

#[test]
fn test_generate_writes_nested_output() {
    let repo = sample_repo();
    let cwd = TempDir::new().unwrap();

    archgen(cwd.path())
        .args(["generate", "-f", "mermaid", "-o", "out/diagrams/arch.mmd", "-r"])
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let mermaid = fs::read_to_string(cwd.path().join("out/diagrams/arch.mmd")).unwrap();
    assert!(mermaid.starts_with("graph TD"));
    assert!(mermaid.contains("src_index_ts -->|imports| src_services_user_service_ts:::depends"));
}

#[test]
fn test_enable_ai_without_key_still_generates() {
    let repo = sample_repo();
    let cwd = TempDir::new().unwrap();

    archgen(cwd.path())
        .args(["generate", "--enable-ai", "-r"])
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"nodes\""))
        .stderr(predicate::str::contains("continuing without it"));
}

#[test]
fn test_remote_without_token_fails() {
    let cwd = TempDir::new().unwrap();
    archgen(cwd.path())
        .args(["generate", "-r", "owner/repo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GitHub token is required"));
}

#[test]
fn test_unknown_format_fails() {
    let repo = sample_repo();
    let cwd = TempDir::new().unwrap();
    archgen(cwd.path())
        .args(["generate", "-f", "pdf", "-r"])
        .arg(repo.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported output format"));
}
