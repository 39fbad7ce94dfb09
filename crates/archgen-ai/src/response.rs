//! Pulling a JSON graph out of free-text model replies and checking its shape

use archgen_core::{
    ArchgenError, Diagram, DiagramMetadata, Edge, EdgeType, Metadata, Node, NodeType, Result,
};
use serde_json::Value;

/// Locate the JSON object in a model reply.
///
/// Prefers the first fenced code block whose body starts with `{`, then
/// falls back to the first balanced top-level `{...}` span.
pub fn extract_json(reply: &str) -> Option<&str> {
    fenced_block(reply).or_else(|| brace_span(reply))
}

fn fenced_block(reply: &str) -> Option<&str> {
    let mut rest = reply;
    while let Some(open) = rest.find("```") {
        let after_fence = &rest[open + 3..];
        // Skip the info string (`json`, etc.) up to the end of the line
        let body_start = after_fence.find('\n').map_or(after_fence.len(), |i| i + 1);
        let body = &after_fence[body_start..];
        let close = body.find("```")?;
        let candidate = body[..close].trim();
        if candidate.starts_with('{') {
            return Some(candidate);
        }
        rest = &body[close + 3..];
    }
    None
}

fn brace_span(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in reply[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&reply[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn invalid(msg: impl Into<String>) -> ArchgenError {
    ArchgenError::enhancement(format!("Invalid model response: {}", msg.into()))
}

fn object_metadata(value: Option<&Value>) -> Metadata {
    match value {
        Some(Value::Object(map)) => map.clone(),
        _ => Metadata::new(),
    }
}

fn string_field<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str)
}

fn node_type(item: &Value) -> NodeType {
    item.get("type")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or(NodeType::Unknown)
}

fn edge_type(item: &Value) -> EdgeType {
    item.get("type")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or(EdgeType::Related)
}

fn validate_node(index: usize, item: &Value) -> Result<Node> {
    let id = string_field(item, "id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| invalid(format!("node {} has no string id", index)))?;
    let label = string_field(item, "label").unwrap_or(id);

    let mut node = Node::new(id, label, node_type(item));
    node.description = string_field(item, "description").map(str::to_string);
    node.metadata = object_metadata(item.get("metadata"));
    Ok(node)
}

fn validate_edge(index: usize, item: &Value) -> Result<Edge> {
    let source = string_field(item, "source")
        .ok_or_else(|| invalid(format!("edge {} has no string source", index)))?;
    let target = string_field(item, "target")
        .ok_or_else(|| invalid(format!("edge {} has no string target", index)))?;

    let mut edge = Edge::new(source, target, edge_type(item));
    if let Some(id) = string_field(item, "id").filter(|id| !id.is_empty()) {
        edge.id = id.to_string();
    }
    edge.label = string_field(item, "label").map(str::to_string);
    edge.metadata = object_metadata(item.get("metadata"));
    Ok(edge)
}

/// Check the reply's shape and convert it into a diagram carrying `metadata`.
pub fn validate_response(value: &Value, metadata: &DiagramMetadata) -> Result<Diagram> {
    let nodes = value
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("missing nodes array"))?;
    let edges = value
        .get("edges")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("missing edges array"))?;

    Ok(Diagram {
        nodes: nodes
            .iter()
            .enumerate()
            .map(|(i, item)| validate_node(i, item))
            .collect::<Result<_>>()?,
        edges: edges
            .iter()
            .enumerate()
            .map(|(i, item)| validate_edge(i, item))
            .collect::<Result<_>>()?,
        metadata: metadata.clone(),
    })
}

/// Extract, parse and validate in one step.
pub fn parse_reply(reply: &str, metadata: &DiagramMetadata) -> Result<Diagram> {
    let json = extract_json(reply).ok_or_else(|| invalid("no JSON object found in reply"))?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| invalid(format!("reply is not valid JSON: {}", e)))?;
    validate_response(&value, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgen_core::DiagramKind;
    use serde_json::json;

    fn metadata() -> DiagramMetadata {
        DiagramMetadata::new(DiagramKind::Functional, "repo")
    }

    #[test]
    fn test_extract_from_json_fence() {
        let reply = "Here you go:\n```json\n{\"nodes\": []}\n```\nDone.";
        assert_eq!(extract_json(reply), Some("{\"nodes\": []}"));
    }

    #[test]
    fn test_skips_non_json_fences() {
        let reply = "```mermaid\ngraph TD\n```\n```\n{\"a\": 1}\n```";
        assert_eq!(extract_json(reply), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_falls_back_to_brace_span() {
        let reply = r#"Sure. {"nodes": [{"id": "a", "label": "has } brace"}], "edges": []} trailing {junk}"#;
        assert_eq!(
            extract_json(reply),
            Some(r#"{"nodes": [{"id": "a", "label": "has } brace"}], "edges": []}"#)
        );
    }

    #[test]
    fn test_no_json() {
        assert_eq!(extract_json("I could not analyze this repository."), None);
        assert_eq!(extract_json("{\"truncated\": [1, 2"), None);
    }

    #[test]
    fn test_validate_defaults() {
        let value = json!({
            "nodes": [
                {"id": "cache", "type": "queue"},
                {"id": "api", "label": "API", "type": "service", "metadata": {"layer": "interface"}}
            ],
            "edges": [
                {"source": "api", "target": "cache", "type": "uses"},
                {"id": "e1", "source": "api", "target": "db", "type": "writes", "label": "persists"}
            ]
        });
        let diagram = validate_response(&value, &metadata()).unwrap();

        assert_eq!(diagram.nodes[0].label, "cache");
        assert_eq!(diagram.nodes[0].node_type, NodeType::Unknown);
        assert_eq!(diagram.nodes[1].metadata["layer"], "interface");

        assert_eq!(diagram.edges[0].id, "api-uses->cache");
        assert_eq!(diagram.edges[1].id, "e1");
        assert_eq!(diagram.edges[1].edge_type, EdgeType::Related);
        assert_eq!(diagram.edges[1].label.as_deref(), Some("persists"));
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        let md = metadata();
        assert!(validate_response(&json!({"nodes": []}), &md).is_err());
        assert!(validate_response(&json!({"nodes": {}, "edges": []}), &md).is_err());
        assert!(validate_response(&json!({"nodes": [{"label": "x"}], "edges": []}), &md).is_err());
        assert!(validate_response(&json!({"nodes": [], "edges": [{"source": "a"}]}), &md).is_err());

        let err = validate_response(&json!({"nodes": [{"id": 3}], "edges": []}), &md).unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_parse_reply_errors_are_enhancement_errors() {
        let err = parse_reply("```json\n{\"nodes\": [\n```", &metadata()).unwrap_err();
        assert_eq!(err.category(), archgen_core::ErrorCategory::Enhancement);
    }
}
