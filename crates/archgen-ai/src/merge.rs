//! Additive merge of a model-suggested diagram into the generated one

use archgen_core::Diagram;
use chrono::Utc;
use std::collections::HashMap;

/// Merge `enhanced` into `original`.
///
/// Nothing the generator produced is overwritten: new node and edge IDs are
/// appended in the model's order, existing nodes only gain metadata keys they
/// did not have, existing edges are left alone.
pub fn merge_diagrams(mut original: Diagram, enhanced: Diagram, model: &str) -> Diagram {
    let node_index: HashMap<String, usize> = original
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.clone(), i))
        .collect();

    let mut added_nodes = 0;
    for node in enhanced.nodes {
        match node_index.get(&node.id) {
            Some(&i) => {
                let existing = &mut original.nodes[i];
                for (key, value) in node.metadata {
                    existing.metadata.entry(key).or_insert(value);
                }
            }
            None if original.nodes.iter().any(|n| n.id == node.id) => {}
            None => {
                original.nodes.push(node);
                added_nodes += 1;
            }
        }
    }

    let mut added_edges = 0;
    for edge in enhanced.edges {
        if original.edges.iter().all(|e| e.id != edge.id) {
            original.edges.push(edge);
            added_edges += 1;
        }
    }

    tracing::info!(
        "Enhancement added {} nodes and {} edges",
        added_nodes,
        added_edges
    );

    original.metadata.enhanced = Some(true);
    original.metadata.enhanced_at = Some(Utc::now());
    original.metadata.ai_model = Some(model.to_string());
    original
}
