use archgen_core::{Diagram, Result};

/// Pretty-printed JSON in field declaration order.
pub fn render_json(diagram: &Diagram) -> Result<String> {
    Ok(serde_json::to_string_pretty(diagram)?)
}
