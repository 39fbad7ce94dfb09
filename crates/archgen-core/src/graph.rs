//! Diagram builder: an insertion-ordered node/edge arena scoped to one generation call

use crate::model::*;
use std::collections::{HashMap, HashSet};

/// Accumulates nodes and edges for a single diagram.
///
/// Nodes and edges are keyed by their string IDs and kept in discovery order.
/// Edges are not checked against the node set: dependency edges may point at
/// targets outside the scanned tree.
pub struct DiagramBuilder {
    kind: DiagramKind,
    repository: String,
    nodes: Vec<Node>,
    node_index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    edge_ids: HashSet<String>,
    processed: HashSet<String>,
}

impl std::fmt::Debug for DiagramBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramBuilder")
            .field("repository", &self.repository)
            .field("node_count", &self.nodes.len())
            .field("edge_count", &self.edges.len())
            .finish()
    }
}

impl DiagramBuilder {
    pub fn new(kind: DiagramKind, repository: impl Into<String>) -> Self {
        DiagramBuilder {
            kind,
            repository: repository.into(),
            nodes: Vec::new(),
            node_index: HashMap::new(),
            edges: Vec::new(),
            edge_ids: HashSet::new(),
            processed: HashSet::new(),
        }
    }

    pub fn kind(&self) -> DiagramKind {
        self.kind
    }

    /// Record a source path as processed. Returns false if it was already seen this run.
    pub fn mark_processed(&mut self, path: &str) -> bool {
        self.processed.insert(path.to_string())
    }

    pub fn is_processed(&self, path: &str) -> bool {
        self.processed.contains(path)
    }

    /// Add a node. Returns false (and keeps the existing node) on an ID collision.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.node_index.contains_key(&node.id) {
            tracing::debug!("Skipping duplicate node {}", node.id);
            return false;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Add an edge. Returns false if an edge with the same ID already exists.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if !self.edge_ids.insert(edge.id.clone()) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Get a node by ID.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Get a mutable node by ID.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let idx = *self.node_index.get(id)?;
        self.nodes.get_mut(idx)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Seal the builder into a diagram stamped with the current time.
    pub fn finish(self) -> Diagram {
        let metadata = DiagramMetadata::new(self.kind, self.repository);
        tracing::debug!(
            "Diagram for {} sealed with {} nodes and {} edges",
            metadata.repository,
            self.nodes.len(),
            self.edges.len()
        );
        Diagram {
            nodes: self.nodes,
            edges: self.edges,
            metadata,
        }
    }
}
