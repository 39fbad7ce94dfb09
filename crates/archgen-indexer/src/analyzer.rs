//! Regex-based content analyzer
//!
//! This is an approximate classifier, not a parser. Declarations are matched
//! line-oriented with no brace-depth tracking: an interface body ends at its
//! first `}`, a class body at the first `}` in column 0. Nested bodies may be
//! mis-captured and that is accepted.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($pattern).expect(concat!("invalid regex ", stringify!($name))));
    };
}

// ── Dependencies ────────────────────────────────────────────
static_regex!(ES_IMPORT, r#"import\s+(?:type\s+)?(?:[\w*{}\s,$]+?\s+from\s+)?['"]([^'"\n]+)['"]"#);
static_regex!(REQUIRE, r#"require\(\s*['"]([^'"\n]+)['"]\s*\)"#);
static_regex!(INCLUDE, r#"#include\s*["<]([^">\n]+)[">]"#);

// ── Module naming ───────────────────────────────────────────
static_regex!(EXPORT_DEFAULT_CLASS, r"export\s+default\s+class\s+(\w+)");
static_regex!(MODULE_EXPORTS, r"module\.exports\s*=\s*(\w+)");

// ── Declarations ────────────────────────────────────────────
static_regex!(
    INTERFACE,
    r"(?m)^[ \t]*(?:export\s+)?(?:default\s+)?interface\s+(\w+)(?:\s*<[^>{]*>)?(?:\s+extends\s+([^{]+?))?\s*\{([^}]*)\}"
);
static_regex!(
    CLASS,
    r"(?ms)^[ \t]*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+(\w+)(?:\s*<[^>{]*>)?(?:\s+extends\s+([\w.]+)(?:\s*<[^>{]*>)?)?(?:\s+implements\s+([^{]+?))?\s*\{(.*?)^\}"
);
static_regex!(
    FUNCTION,
    r"(?m)^(export\s+)?(?:default\s+)?(async\s+)?function\s*\*?\s*(\w+)\s*(?:<[^>(]*>)?\s*\(([^)]*)\)(?:\s*:\s*([^{]+?))?\s*\{"
);
static_regex!(
    ARROW_FUNCTION,
    r"(?m)^(export\s+)?const\s+(\w+)\s*(?::[^=\n]+)?=\s*(async\s+)?(?:\(([^)]*)\)|(\w+))\s*(?::\s*([^=\n]+?))?\s*=>"
);

// ── Members ─────────────────────────────────────────────────
static_regex!(
    CLASS_METHOD,
    r"(?m)^[ \t]+(?:(?:public|private|protected|static|async|override|abstract|get|set)\s+)*(\w+)\s*(?:<[^>(]*>)?\s*\([^)]*\)\s*(?::\s*[^{;]+)?\{"
);
static_regex!(
    CLASS_PROPERTY,
    r"(?m)^[ \t]+(?:(?:public|private|protected|static|readonly|declare|override)\s+)*(\w+)[?!]?\s*(?::[^;=\n]+)?(?:=[^;\n]*)?;"
);
static_regex!(INTERFACE_METHOD, r"(?m)^[ \t]*(?:readonly\s+)?(\w+)\s*\??\s*(?:<[^>(]*>)?\s*\(");
static_regex!(INTERFACE_PROPERTY, r"(?m)^[ \t]*(?:readonly\s+)?(\w+)\s*\??\s*:");
static_regex!(DECORATOR_LINE, r"(?m)^[ \t]*@[A-Za-z_]\w*");

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "function", "constructor", "super", "new",
];

/// Design-pattern fingerprints recognized by keyword checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignPattern {
    Singleton,
    Factory,
    Observer,
    Strategy,
    Decorator,
}

impl DesignPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesignPattern::Singleton => "singleton",
            DesignPattern::Factory => "factory",
            DesignPattern::Observer => "observer",
            DesignPattern::Strategy => "strategy",
            DesignPattern::Decorator => "decorator",
        }
    }
}

impl fmt::Display for DesignPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterfaceDecl {
    pub name: String,
    pub extends: Vec<String>,
    pub methods: Vec<String>,
    pub properties: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassDecl {
    pub name: String,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub methods: Vec<String>,
    pub properties: Vec<String>,
    pub patterns: Vec<DesignPattern>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    pub return_type: Option<String>,
    pub is_async: bool,
    pub is_exported: bool,
}

/// Structural summary of one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentAnalysis {
    pub module_name: Option<String>,
    pub interfaces: Vec<InterfaceDecl>,
    pub classes: Vec<ClassDecl>,
    pub functions: Vec<FunctionDecl>,
    /// Raw import targets in source order, duplicates removed
    pub dependencies: Vec<String>,
    pub patterns: Vec<DesignPattern>,
}

impl ContentAnalysis {
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
            && self.classes.is_empty()
            && self.functions.is_empty()
            && self.dependencies.is_empty()
    }
}

/// Analyze one file's text.
pub fn analyze(content: &str) -> ContentAnalysis {
    ContentAnalysis {
        module_name: module_name(content),
        interfaces: interfaces(content),
        classes: classes(content),
        functions: functions(content),
        dependencies: dependencies(content),
        patterns: detect_patterns(content),
    }
}

/// Import targets from ES imports, CommonJS requires and C includes, in source order.
pub fn dependencies(content: &str) -> Vec<String> {
    let mut found: Vec<(usize, &str)> = [&*ES_IMPORT, &*REQUIRE, &*INCLUDE]
        .iter()
        .flat_map(|re| re.captures_iter(content))
        .filter_map(|caps| caps.get(1).map(|m| (m.start(), m.as_str())))
        .collect();
    found.sort_by_key(|(offset, _)| *offset);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter(|(_, target)| seen.insert(*target))
        .map(|(_, target)| target.to_string())
        .collect()
}

pub fn module_name(content: &str) -> Option<String> {
    EXPORT_DEFAULT_CLASS
        .captures(content)
        .or_else(|| MODULE_EXPORTS.captures(content))
        .map(|caps| caps[1].to_string())
}

pub fn interfaces(content: &str) -> Vec<InterfaceDecl> {
    INTERFACE
        .captures_iter(content)
        .map(|caps| {
            let body = group(&caps, 3);
            InterfaceDecl {
                name: caps[1].to_string(),
                extends: split_names(group(&caps, 2)),
                methods: member_names(&INTERFACE_METHOD, body),
                properties: member_names(&INTERFACE_PROPERTY, body),
            }
        })
        .collect()
}

pub fn classes(content: &str) -> Vec<ClassDecl> {
    CLASS
        .captures_iter(content)
        .map(|caps| {
            let name = caps[1].to_string();
            let body = group(&caps, 4);
            ClassDecl {
                patterns: detect_patterns(&format!("{} {}", name, body)),
                extends: caps.get(2).map(|m| m.as_str().to_string()),
                implements: split_names(group(&caps, 3)),
                methods: member_names(&CLASS_METHOD, body),
                properties: member_names(&CLASS_PROPERTY, body),
                name,
            }
        })
        .collect()
}

/// Top-level `function` declarations and column-0 `const f = (...) =>` arrows.
pub fn functions(content: &str) -> Vec<FunctionDecl> {
    let declared = FUNCTION.captures_iter(content).map(|caps| {
        let decl = FunctionDecl {
            name: caps[3].to_string(),
            params: parse_params(group(&caps, 4)),
            return_type: non_empty(group(&caps, 5)),
            is_async: caps.get(2).is_some(),
            is_exported: caps.get(1).is_some(),
        };
        (caps.get(0).map_or(0, |m| m.start()), decl)
    });

    let arrows = ARROW_FUNCTION.captures_iter(content).map(|caps| {
        let params = caps
            .get(4)
            .or_else(|| caps.get(5))
            .map_or("", |m| m.as_str());
        let decl = FunctionDecl {
            name: caps[2].to_string(),
            params: parse_params(params),
            return_type: non_empty(group(&caps, 6)),
            is_async: caps.get(3).is_some(),
            is_exported: caps.get(1).is_some(),
        };
        (caps.get(0).map_or(0, |m| m.start()), decl)
    });

    let mut all: Vec<_> = declared.chain(arrows).collect();
    all.sort_by_key(|(offset, _)| *offset);
    all.into_iter().map(|(_, decl)| decl).collect()
}

/// Whole-text design-pattern checklist.
pub fn detect_patterns(text: &str) -> Vec<DesignPattern> {
    let has = |needle: &str| text.contains(needle);
    let any = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

    let mut patterns = Vec::new();
    if has("getInstance") && has("instance") {
        patterns.push(DesignPattern::Singleton);
    }
    if has("create") && has("Factory") {
        patterns.push(DesignPattern::Factory);
    }
    if any(&["subscribe", "addListener", "addEventListener", "observer"]) && any(&["notify", "emit"]) {
        patterns.push(DesignPattern::Observer);
    }
    if has("Strategy") && any(&["execute", "algorithm"]) {
        patterns.push(DesignPattern::Strategy);
    }
    if has("Decorator") || DECORATOR_LINE.is_match(text) {
        patterns.push(DesignPattern::Decorator);
    }
    patterns
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map_or("", |m| m.as_str())
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Split a comma-separated type list, dropping generic arguments.
fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(|part| part.split('<').next().unwrap_or("").trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn member_names(re: &Regex, body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    re.captures_iter(body)
        .map(|caps| caps[1].to_string())
        .filter(|name| !CONTROL_KEYWORDS.contains(&name.as_str()))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn parse_params(params: &str) -> Vec<String> {
    params
        .split(',')
        .filter_map(|param| {
            let name = param
                .split([':', '='])
                .next()
                .unwrap_or("")
                .trim()
                .trim_start_matches("...")
                .trim_end_matches('?');
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependencies_in_source_order() {
        let content = r#"
#include "util.h"
import { a, b } from './a';
const fs = require('fs');
import * as path from "path";
import './side-effect';
import Default from './a';
#include <stdio.h>
"#;
        assert_eq!(
            dependencies(content),
            vec!["util.h", "./a", "fs", "path", "./side-effect", "stdio.h"]
        );
    }

    #[test]
    fn test_multiline_import() {
        let content = "import {\n  Alpha,\n  Beta,\n} from '../shared/types';\n";
        assert_eq!(dependencies(content), vec!["../shared/types"]);
    }

    #[test]
    fn test_module_name() {
        assert_eq!(
            module_name("export default class Router {}").as_deref(),
            Some("Router")
        );
        assert_eq!(module_name("module.exports = app;").as_deref(), Some("app"));
        assert_eq!(module_name("export const x = 1;"), None);
    }

    #[test]
    fn test_interface_extraction() {
        let content = r#"
export interface Repository<T> extends Reader<T>, Writer {
    readonly table: string;
    find(id: string): Promise<T>;
    count?: number;
}
"#;
        let found = interfaces(content);
        assert_eq!(found.len(), 1);
        let repo = &found[0];
        assert_eq!(repo.name, "Repository");
        assert_eq!(repo.extends, vec!["Reader", "Writer"]);
        assert_eq!(repo.methods, vec!["find"]);
        assert_eq!(repo.properties, vec!["table", "count"]);
    }

    #[test]
    fn test_class_extraction() {
        let content = r#"
export class OrderService extends BaseService implements Startable, Stoppable {
    private orders: Order[] = [];
    static instance: OrderService;

    static getInstance(): OrderService {
        return OrderService.instance;
    }

    async place(order: Order): Promise<void> {
        if (order) {
            this.orders.push(order);
        }
    }
}
"#;
        let found = classes(content);
        assert_eq!(found.len(), 1);
        let class = &found[0];
        assert_eq!(class.name, "OrderService");
        assert_eq!(class.extends.as_deref(), Some("BaseService"));
        assert_eq!(class.implements, vec!["Startable", "Stoppable"]);
        assert!(class.methods.contains(&"getInstance".to_string()));
        assert!(class.methods.contains(&"place".to_string()));
        assert!(!class.methods.contains(&"if".to_string()));
        assert!(class.properties.contains(&"orders".to_string()));
        assert_eq!(class.patterns, vec![DesignPattern::Singleton]);
    }

    #[test]
    fn test_class_without_parents() {
        let found = classes("class Plain {\n  x = 1;\n}\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].extends, None);
        assert!(found[0].implements.is_empty());
    }

    #[test]
    fn test_function_extraction() {
        let content = r#"
export async function fetchUsers(page: number, size = 10): Promise<User[]> {
    return [];
}

function helper(...args) {
}

export const add = (a: number, b: number): number => a + b;
const twice = x => x * 2;
    const nested = () => 1;
"#;
        let found = functions(content);
        let names: Vec<_> = found.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["fetchUsers", "helper", "add", "twice"]);

        let fetch = &found[0];
        assert!(fetch.is_async && fetch.is_exported);
        assert_eq!(fetch.params, vec!["page", "size"]);
        assert_eq!(fetch.return_type.as_deref(), Some("Promise<User[]>"));

        assert_eq!(found[1].params, vec!["args"]);
        assert!(!found[1].is_exported);
        assert_eq!(found[2].return_type.as_deref(), Some("number"));
        assert_eq!(found[3].params, vec!["x"]);
    }

    #[test]
    fn test_pattern_checklist() {
        assert_eq!(
            detect_patterns("static getInstance() { return instance; }"),
            vec![DesignPattern::Singleton]
        );
        assert_eq!(
            detect_patterns("class WidgetFactory { create() {} }"),
            vec![DesignPattern::Factory]
        );
        assert_eq!(
            detect_patterns("bus.subscribe(fn); bus.emit('x');"),
            vec![DesignPattern::Observer]
        );
        assert_eq!(
            detect_patterns("interface SortStrategy { execute(): void }"),
            vec![DesignPattern::Strategy]
        );
        assert_eq!(
            detect_patterns("@Component\nclass A {}"),
            vec![DesignPattern::Decorator]
        );
        assert!(detect_patterns("const x = 1;").is_empty());
    }

    #[test]
    fn test_singleton_requires_lowercase_instance() {
        // "getInstance" itself contains "Instance", not "instance"
        assert!(detect_patterns("getInstance()").is_empty());
    }

    #[test]
    fn test_empty_content() {
        let analysis = analyze("");
        assert!(analysis.is_empty());
        assert_eq!(analysis.module_name, None);
    }
}
