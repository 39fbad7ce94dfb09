//! Core data structures for the architecture diagram

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ArchgenError;

/// Diagram schema version written into every generated diagram.
pub const DIAGRAM_VERSION: &str = "1.0.0";

/// Open metadata map attached to nodes and edges. Insertion order is preserved.
pub type Metadata = Map<String, Value>;

/// Identifier of a node: a relative file path, or `path#Symbol` for sub-elements.
pub type NodeId = String;

/// Build the ID of a node extracted from inside a file.
pub fn symbol_node_id(file_path: &str, symbol: &str) -> NodeId {
    format!("{}#{}", file_path, symbol)
}

/// Split a symbol node ID back into its file path and symbol name.
pub fn split_symbol_id(id: &str) -> Option<(&str, &str)> {
    id.rsplit_once('#')
}

/// Discriminates what architectural role a node plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    // ── Whole-file roles ────────────────────────────────────
    Module,
    Service,
    Component,
    Database,
    External,
    Controller,
    Repository,
    Model,
    Util,
    Config,
    Domain,

    // ── Extracted code elements ─────────────────────────────
    Interface,
    Class,
    Function,

    // ── Fallback for types suggested by a model provider ────
    #[serde(other)]
    Unknown,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Module => "module",
            NodeType::Service => "service",
            NodeType::Component => "component",
            NodeType::Database => "database",
            NodeType::External => "external",
            NodeType::Controller => "controller",
            NodeType::Repository => "repository",
            NodeType::Model => "model",
            NodeType::Util => "util",
            NodeType::Config => "config",
            NodeType::Domain => "domain",
            NodeType::Interface => "interface",
            NodeType::Class => "class",
            NodeType::Function => "function",
            NodeType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    // ── Emitted by the graph builder ────────────────────────
    Depends,
    Contains,
    Extends,
    Implements,

    // ── Vocabulary accepted from enhancement ────────────────
    Uses,
    Calls,
    Inheritance,
    Dependency,
    Implementation,
    Data,
    Event,

    #[serde(other)]
    Related,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Depends => "depends",
            EdgeType::Contains => "contains",
            EdgeType::Extends => "extends",
            EdgeType::Implements => "implements",
            EdgeType::Uses => "uses",
            EdgeType::Calls => "calls",
            EdgeType::Inheritance => "inheritance",
            EdgeType::Dependency => "dependency",
            EdgeType::Implementation => "implementation",
            EdgeType::Data => "data",
            EdgeType::Event => "event",
            EdgeType::Related => "related",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single vertex in the architecture graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type,
            description: None,
            metadata: Metadata::new(),
        }
    }

    /// Builder-style metadata insertion.
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// A directed, typed relationship between two node IDs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Edge {
    /// Create an edge whose ID is derived from its endpoints and type.
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, edge_type: EdgeType) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: Self::derive_id(&source, &target, edge_type),
            source,
            target,
            edge_type,
            label: None,
            metadata: Metadata::new(),
        }
    }

    /// Stable edge ID: `a->b` for dependencies, `a-type->b` otherwise.
    pub fn derive_id(source: &str, target: &str, edge_type: EdgeType) -> String {
        match edge_type {
            EdgeType::Depends => format!("{}->{}", source, target),
            other => format!("{}-{}->{}", source, other, target),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Which flavour of architecture diagram is being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    #[default]
    Functional,
    Deployment,
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramKind::Functional => f.write_str("functional"),
            DiagramKind::Deployment => f.write_str("deployment"),
        }
    }
}

impl FromStr for DiagramKind {
    type Err = ArchgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "functional" => Ok(DiagramKind::Functional),
            "deployment" => Ok(DiagramKind::Deployment),
            other => Err(ArchgenError::config(format!(
                "Unsupported diagram type: {} (expected functional or deployment)",
                other
            ))),
        }
    }
}

/// Run metadata stamped on every diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramMetadata {
    #[serde(rename = "type")]
    pub kind: DiagramKind,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub repository: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
}

impl DiagramMetadata {
    pub fn new(kind: DiagramKind, repository: impl Into<String>) -> Self {
        Self {
            kind,
            version: DIAGRAM_VERSION.to_string(),
            generated_at: Utc::now(),
            repository: repository.into(),
            enhanced: None,
            enhanced_at: None,
            ai_model: None,
        }
    }
}

/// The complete graph produced by one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub metadata: DiagramMetadata,
}

impl Diagram {
    pub fn new(metadata: DiagramMetadata) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            metadata,
        }
    }

    /// Find a node by ID.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Find an edge by ID.
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// All edges of one type.
    pub fn edges_of_type(&self, edge_type: EdgeType) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.edge_type == edge_type)
    }

    /// All nodes of one type.
    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.node_type == node_type)
    }
}

/// Repository facts fed into the enhancement prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoInfo {
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub last_updated: Option<DateTime<Utc>>,
    pub license: Option<String>,
}

impl RepoInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
