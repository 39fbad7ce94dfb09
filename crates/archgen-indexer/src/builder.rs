//! Turns analyzed files into nodes and typed edges

use crate::analyzer::{ClassDecl, ContentAnalysis, DesignPattern};
use crate::source::{RepositorySource, SourceFile};
use archgen_core::{
    Diagram, DiagramBuilder, DiagramKind, Edge, EdgeType, Node, NodeId, NodeType, SymbolTable,
    symbol_node_id,
};
use serde_json::{Value, json};
use tracing::debug;

/// Extensions tried, in order, when a relative import names no existing file.
pub const IMPORT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// Filename vocabulary for functional diagrams, checked in order.
const FUNCTIONAL_VOCABULARY: &[(&str, NodeType)] = &[
    ("service", NodeType::Service),
    ("controller", NodeType::Controller),
    ("repository", NodeType::Repository),
    ("model", NodeType::Model),
    ("util", NodeType::Util),
    ("config", NodeType::Config),
    ("domain", NodeType::Domain),
    ("external", NodeType::External),
    ("database", NodeType::Database),
    ("component", NodeType::Component),
    ("module", NodeType::Module),
    ("interface", NodeType::Interface),
    ("class", NodeType::Class),
];

/// Type of a whole-file node.
pub fn module_node_type(path: &str, kind: DiagramKind) -> NodeType {
    let path = path.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| path.contains(n));

    match kind {
        DiagramKind::Functional => FUNCTIONAL_VOCABULARY
            .iter()
            .find(|(needle, _)| path.contains(needle))
            .map_or(NodeType::Service, |(_, node_type)| *node_type),
        DiagramKind::Deployment => {
            if has(&["docker", "container"]) {
                NodeType::Service
            } else if has(&["database", "db"]) {
                NodeType::Database
            } else if has(&["api", "service"]) {
                NodeType::Service
            } else if has(&["client", "frontend"]) {
                NodeType::Component
            } else if has(&["external", "third-party"]) {
                NodeType::External
            } else {
                NodeType::Service
            }
        }
    }
}

/// Type of a class node, inferred from its design patterns and name.
pub fn class_node_type(class: &ClassDecl) -> NodeType {
    let name = class.name.to_lowercase();
    if class
        .patterns
        .iter()
        .any(|p| matches!(p, DesignPattern::Singleton | DesignPattern::Factory))
    {
        NodeType::Service
    } else if class.patterns.contains(&DesignPattern::Observer) {
        NodeType::Component
    } else if name.contains("database") || name.contains("db") {
        NodeType::Database
    } else {
        NodeType::Class
    }
}

/// Language guess from a file extension.
pub fn language_for(path: &str) -> Option<&'static str> {
    let ext = path.rsplit_once('.')?.1.to_lowercase();
    let language = match ext.as_str() {
        "ts" | "tsx" => "typescript",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "rs" => "rust",
        "py" => "python",
        "go" => "go",
        "java" => "java",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "md" => "markdown",
        "css" | "scss" | "less" => "css",
        "html" => "html",
        "sql" => "sql",
        "sh" | "bash" => "shell",
        _ => return None,
    };
    Some(language)
}

/// Join `spec` onto the directory of `from` and collapse `.` and `..` segments.
pub fn join_relative(from: &str, spec: &str) -> String {
    let mut segments: Vec<&str> = from.split('/').collect();
    segments.pop();

    for part in spec.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// How an import specifier was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// A repository-relative path (possibly dangling)
    Path(String),
    /// A package or bare specifier
    Unresolved,
}

/// Resolve one import from `from`. Only specifiers starting with `.` resolve to a path.
pub async fn resolve_import(from: &str, spec: &str, source: &dyn RepositorySource) -> ImportTarget {
    if !spec.starts_with('.') {
        return ImportTarget::Unresolved;
    }

    let joined = join_relative(from, spec);
    if source.exists(&joined).await {
        return ImportTarget::Path(joined);
    }
    for ext in IMPORT_EXTENSIONS {
        let candidate = format!("{}.{}", joined, ext);
        if source.exists(&candidate).await {
            return ImportTarget::Path(candidate);
        }
    }
    ImportTarget::Path(joined)
}

/// An extends/implements relation waiting for every file to be seen.
#[derive(Debug)]
struct PendingRelation {
    file: String,
    source: NodeId,
    target_name: String,
    edge_type: EdgeType,
}

/// Accumulates one generation run: the diagram arena, declared symbols and deferred relations.
#[derive(Debug)]
pub struct GraphBuilder {
    diagram: DiagramBuilder,
    symbols: SymbolTable,
    pending: Vec<PendingRelation>,
}

impl GraphBuilder {
    pub fn new(kind: DiagramKind, repository: impl Into<String>) -> Self {
        Self {
            diagram: DiagramBuilder::new(kind, repository),
            symbols: SymbolTable::new(),
            pending: Vec::new(),
        }
    }

    /// Emit the nodes and edges of one file. Returns false if the path was already processed.
    pub async fn add_file(
        &mut self,
        file: &SourceFile,
        analysis: &ContentAnalysis,
        source: &dyn RepositorySource,
    ) -> bool {
        if !self.diagram.mark_processed(&file.path) {
            debug!("Skipping already processed {}", file.path);
            return false;
        }

        let module_id: NodeId = file.path.clone();
        let mut resolved = Vec::new();
        let mut unresolved = Vec::new();
        for spec in &analysis.dependencies {
            match resolve_import(&file.path, spec, source).await {
                ImportTarget::Path(target) if target == module_id => {}
                ImportTarget::Path(target) => resolved.push((spec.clone(), target)),
                ImportTarget::Unresolved => unresolved.push(spec.clone()),
            }
        }

        let module = self.module_node(file, analysis, &unresolved);
        self.diagram.add_node(module);

        for interface in &analysis.interfaces {
            let id = symbol_node_id(&file.path, &interface.name);
            let node = Node::new(id.clone(), interface.name.clone(), NodeType::Interface)
                .with_meta("path", file.path.clone())
                .with_meta("extends", interface.extends.clone())
                .with_meta("methods", interface.methods.clone())
                .with_meta("properties", interface.properties.clone());
            if !self.add_member(&file.path, &module_id, node) {
                continue;
            }
            self.symbols.insert(&interface.name, id.clone(), &file.path);

            for parent in &interface.extends {
                self.defer(&file.path, &id, parent, EdgeType::Extends);
            }
        }

        for class in &analysis.classes {
            let id = symbol_node_id(&file.path, &class.name);
            let patterns: Vec<&str> = class.patterns.iter().map(|p| p.as_str()).collect();
            let node = Node::new(id.clone(), class.name.clone(), class_node_type(class))
                .with_meta("path", file.path.clone())
                .with_meta("extends", class.extends.clone())
                .with_meta("implements", class.implements.clone())
                .with_meta("methods", class.methods.clone())
                .with_meta("properties", class.properties.clone())
                .with_meta("patterns", patterns);
            if !self.add_member(&file.path, &module_id, node) {
                continue;
            }
            self.symbols.insert(&class.name, id.clone(), &file.path);

            if let Some(parent) = &class.extends {
                self.defer(&file.path, &id, parent, EdgeType::Extends);
            }
            for interface in &class.implements {
                self.defer(&file.path, &id, interface, EdgeType::Implements);
            }
        }

        for function in &analysis.functions {
            let id = symbol_node_id(&file.path, &function.name);
            let node = Node::new(id, function.name.clone(), NodeType::Function)
                .with_meta("path", file.path.clone())
                .with_meta("params", function.params.clone())
                .with_meta("returnType", function.return_type.clone())
                .with_meta("async", function.is_async)
                .with_meta("exported", function.is_exported);
            self.add_member(&file.path, &module_id, node);
        }

        for (spec, target) in resolved {
            let edge = Edge::new(module_id.clone(), target.clone(), EdgeType::Depends)
                .with_label("imports")
                .with_meta("sourcePath", file.path.clone())
                .with_meta("targetPath", target)
                .with_meta("specifier", spec);
            self.diagram.add_edge(edge);
        }

        true
    }

    fn module_node(&self, file: &SourceFile, analysis: &ContentAnalysis, unresolved: &[String]) -> Node {
        let patterns: Vec<&str> = analysis.patterns.iter().map(|p| p.as_str()).collect();
        let mut node = Node::new(
            file.path.clone(),
            file.name.clone(),
            module_node_type(&file.path, self.diagram.kind()),
        )
        .with_meta("path", file.path.clone())
        .with_meta("size", file.size);

        if let Some(modified) = file.modified {
            node = node.with_meta("lastModified", modified.to_rfc3339());
        }
        if let Some(sha) = &file.sha {
            node = node.with_meta("sha", sha.clone());
        }
        node.with_meta("language", language_for(&file.path))
            .with_meta("moduleName", analysis.module_name.clone())
            .with_meta("patterns", patterns)
            .with_meta("dependencies", analysis.dependencies.clone())
            .with_meta("unresolvedImports", unresolved.to_vec())
    }

    /// Add a declared element and its `contains` edge. Returns false for a repeated declaration.
    fn add_member(&mut self, file: &str, module_id: &str, node: Node) -> bool {
        let id = node.id.clone();
        if !self.diagram.add_node(node) {
            return false;
        }
        self.diagram.add_edge(
            Edge::new(module_id, id, EdgeType::Contains).with_meta("path", Value::from(file)),
        );
        true
    }

    fn defer(&mut self, file: &str, source: &str, target_name: &str, edge_type: EdgeType) {
        self.pending.push(PendingRelation {
            file: file.to_string(),
            source: source.to_string(),
            target_name: target_name.to_string(),
            edge_type,
        });
    }

    /// Resolve deferred relations and seal the diagram.
    ///
    /// Targets resolve to a same-file declaration, then a unique declaration
    /// elsewhere, otherwise stay as the bare symbol name.
    pub fn finish(mut self) -> Diagram {
        for relation in std::mem::take(&mut self.pending) {
            let target = self
                .symbols
                .resolve(&relation.file, &relation.target_name)
                .cloned()
                .unwrap_or_else(|| relation.target_name.clone());
            let resolved = target != relation.target_name;
            let edge = Edge::new(relation.source, target, relation.edge_type)
                .with_label(relation.edge_type.as_str())
                .with_meta("symbol", relation.target_name)
                .with_meta("resolved", json!(resolved));
            self.diagram.add_edge(edge);
        }
        self.diagram.finish()
    }
}
