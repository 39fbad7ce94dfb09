//! Colors shared by the drawn renderers

use archgen_core::{EdgeType, NodeType};

pub const STROKE_COLOR: &str = "#666666";
pub const BACKGROUND_COLOR: &str = "#ffffff";

pub fn node_color(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Service | NodeType::Domain => "#e6f3ff",
        NodeType::Controller | NodeType::Interface => "#fff0e6",
        NodeType::Repository | NodeType::Class => "#f0ffe6",
        NodeType::Model | NodeType::Database => "#ffe6e6",
        NodeType::Util | NodeType::Component => "#f0e6ff",
        NodeType::Config | NodeType::Module => "#e6fff0",
        NodeType::External => "#f5f5f5",
        NodeType::Function | NodeType::Unknown => BACKGROUND_COLOR,
    }
}

pub fn edge_color(edge_type: EdgeType) -> &'static str {
    match edge_type {
        EdgeType::Data => "#4a90e2",
        EdgeType::Event => "#50e3c2",
        EdgeType::Depends
        | EdgeType::Dependency
        | EdgeType::Implements
        | EdgeType::Implementation
        | EdgeType::Contains => "#999999",
        EdgeType::Uses
        | EdgeType::Calls
        | EdgeType::Extends
        | EdgeType::Inheritance
        | EdgeType::Related => STROKE_COLOR,
    }
}
