//! Native SVG drawing of the layered layout
//!
//! The Mermaid source of the same diagram is embedded in `<desc>` so the file can be
//! re-rendered by Mermaid tooling.

use std::fmt::Write;

use archgen_core::Diagram;

use crate::layout::{Bounds, NODE_HEIGHT, NODE_WIDTH, wrapped_layout};
use crate::mermaid::render_mermaid;
use crate::palette::{BACKGROUND_COLOR, STROKE_COLOR, edge_color, node_color};

const MARGIN: f64 = 40.0;
const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";
const MAX_LABEL_CHARS: usize = 24;
/// Layers wider than this wrap onto extra rows.
pub const MAX_ROW_NODES: usize = 12;

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Shorten labels that would overflow a node box.
fn fit_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        return label.to_string();
    }
    let mut fitted: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
    fitted.push('…');
    fitted
}

/// Render the diagram as a standalone SVG document.
pub fn render_svg(diagram: &Diagram) -> String {
    let layout = wrapped_layout(&diagram.nodes, MAX_ROW_NODES);
    let bounds = layout.bounds().unwrap_or(Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: NODE_WIDTH,
        max_y: NODE_HEIGHT,
    });
    let (x, y) = (bounds.min_x - MARGIN, bounds.min_y - MARGIN);
    let (width, height) = (bounds.width() + 2.0 * MARGIN, bounds.height() + 2.0 * MARGIN);

    // Writing into a String cannot fail
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="{x} {y} {width} {height}">"#
    );
    let _ = writeln!(out, "  <title>{}</title>", xml_escape(&diagram.metadata.repository));
    let _ = writeln!(out, "  <desc>{}</desc>", xml_escape(&render_mermaid(diagram)));
    let _ = writeln!(
        out,
        r#"  <defs><marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="8" markerHeight="8" orient="auto"><path d="M 0 0 L 10 5 L 0 10 z" fill="{STROKE_COLOR}"/></marker></defs>"#
    );
    let _ = writeln!(
        out,
        r#"  <rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{BACKGROUND_COLOR}"/>"#
    );

    out.push_str("  <g class=\"edges\">\n");
    for edge in &diagram.edges {
        let (Some(source), Some(target)) =
            (layout.position(&edge.source), layout.position(&edge.target))
        else {
            continue;
        };
        let (x1, y1) = source.bottom_center();
        let (x2, y2) = target.top_center();
        let color = edge_color(edge.edge_type);
        let _ = writeln!(
            out,
            r#"    <line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{color}" stroke-width="1.5" marker-end="url(#arrow)"/>"#
        );
        if let Some(label) = edge.label.as_deref().filter(|l| !l.is_empty()) {
            let _ = writeln!(
                out,
                r#"    <text x="{}" y="{}" text-anchor="middle" font-family="{FONT_FAMILY}" font-size="12" fill="{color}">{}</text>"#,
                (x1 + x2) / 2.0,
                (y1 + y2) / 2.0,
                xml_escape(label)
            );
        }
    }
    out.push_str("  </g>\n");

    out.push_str("  <g class=\"nodes\">\n");
    for node in &diagram.nodes {
        let Some(position) = layout.position(&node.id) else {
            continue;
        };
        let (cx, cy) = position.center();
        let _ = writeln!(
            out,
            r#"    <g class="node {}"><rect x="{}" y="{}" width="{NODE_WIDTH}" height="{NODE_HEIGHT}" rx="8" fill="{}" stroke="{STROKE_COLOR}"/><text x="{cx}" y="{cy}" text-anchor="middle" dominant-baseline="central" font-family="{FONT_FAMILY}" font-size="16">{}</text></g>"#,
            node.node_type,
            position.x,
            position.y,
            node_color(node.node_type),
            xml_escape(&fit_label(&node.label))
        );
    }
    out.push_str("  </g>\n");
    out.push_str("</svg>\n");
    out
}
