//! Diagram data model, builder arena, symbol table and error taxonomy for archgen

pub mod error;
pub mod graph;
pub mod model;
pub mod symbols;


pub use error::{ArchgenError, ErrorCategory, Result};
pub use graph::DiagramBuilder;
pub use model::{
    DIAGRAM_VERSION, Diagram, DiagramKind, DiagramMetadata, Edge, EdgeType, Metadata, Node,
    NodeId, NodeType, RepoInfo, split_symbol_id, symbol_node_id,
};
pub use symbols::SymbolTable;
