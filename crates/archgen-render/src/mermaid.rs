//! Mermaid flowchart text

use archgen_core::{Diagram, EdgeType, NodeType};

use crate::palette::{STROKE_COLOR, node_color};

/// Node types that carry a Mermaid class, in `classDef` order.
const NODE_CLASSES: [NodeType; 6] = [
    NodeType::Service,
    NodeType::Database,
    NodeType::Component,
    NodeType::External,
    NodeType::Interface,
    NodeType::Class,
];

/// `class` is a Mermaid keyword, so class nodes use `cls`.
fn class_name(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Class => "cls",
        other => other.as_str(),
    }
}

fn node_class(node_type: NodeType) -> Option<&'static str> {
    NODE_CLASSES
        .contains(&node_type)
        .then(|| class_name(node_type))
}

fn edge_class(edge_type: EdgeType) -> Option<&'static str> {
    match edge_type {
        EdgeType::Depends | EdgeType::Uses | EdgeType::Implements | EdgeType::Extends => {
            Some(edge_type.as_str())
        }
        _ => None,
    }
}

fn class_suffix(class: Option<&str>) -> String {
    class.map(|c| format!(":::{}", c)).unwrap_or_default()
}

/// Mermaid IDs only allow `[A-Za-z0-9_]`; everything else becomes `_`.
pub fn sanitize_id(id: &str) -> String {
    let sanitized: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        "_".to_string()
    } else {
        sanitized
    }
}

fn escape_label(label: &str) -> String {
    label.replace('"', "#quot;").replace('\n', " ")
}

/// Render the diagram as a top-down Mermaid flowchart.
pub fn render_mermaid(diagram: &Diagram) -> String {
    let mut lines = vec!["graph TD".to_string()];

    for node in &diagram.nodes {
        lines.push(format!(
            "    {}[\"{}\"]{}",
            sanitize_id(&node.id),
            escape_label(&node.label),
            class_suffix(node_class(node.node_type))
        ));
    }

    for edge in &diagram.edges {
        let arrow = match edge.label.as_deref().filter(|l| !l.is_empty()) {
            Some(label) => format!("-->|{}|", escape_label(label).replace('|', "#124;")),
            None => "-->".to_string(),
        };
        lines.push(format!(
            "    {} {} {}{}",
            sanitize_id(&edge.source),
            arrow,
            sanitize_id(&edge.target),
            class_suffix(edge_class(edge.edge_type))
        ));
    }

    for node_type in NODE_CLASSES {
        lines.push(format!(
            "    classDef {} fill:{},stroke:{}",
            class_name(node_type),
            node_color(node_type),
            STROKE_COLOR
        ));
    }

    lines.join("\n")
}
