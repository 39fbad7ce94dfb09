//! Excalidraw scene export
//!
//! Nodes become filled rectangles with a bound, centered text element. Edges become
//! straight arrows from the bottom-center of the source to the top-center of the
//! target, with an optional label at the midpoint. Element seeds are hashed from
//! element IDs so the same diagram always produces the same scene.

use archgen_core::{Diagram, Edge, Node, Result};
use serde_json::{Value, json};

use crate::layout::{NODE_HEIGHT, NODE_WIDTH, Position, layered_layout};
use crate::palette::{BACKGROUND_COLOR, STROKE_COLOR, edge_color, node_color};

const SCENE_SOURCE: &str = "archgen";
const NODE_FONT_SIZE: u32 = 16;
const LABEL_FONT_SIZE: u32 = 12;
const LABEL_HEIGHT: f64 = 20.0;

/// 32-bit FNV-1a, folded into the positive `i32` range Excalidraw expects.
fn seed(id: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in id.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash & 0x7fff_ffff
}

struct Frame {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

fn element(id: &str, kind: &str, frame: &Frame, updated: i64, extra: Value) -> Value {
    let mut value = json!({
        "id": id,
        "type": kind,
        "x": frame.x,
        "y": frame.y,
        "width": frame.width,
        "height": frame.height,
        "angle": 0,
        "strokeColor": STROKE_COLOR,
        "backgroundColor": "transparent",
        "fillStyle": "solid",
        "strokeWidth": 1,
        "strokeStyle": "solid",
        "roughness": 1,
        "opacity": 100,
        "groupIds": [],
        "frameId": null,
        "roundness": null,
        "seed": seed(id),
        "version": 1,
        "versionNonce": 0,
        "isDeleted": false,
        "boundElements": null,
        "updated": updated,
        "link": null,
        "locked": false,
    });
    if let (Value::Object(map), Value::Object(extra)) = (&mut value, extra) {
        map.extend(extra);
    }
    value
}

fn text_fields(text: &str, font_size: u32, container_id: Option<&str>) -> Value {
    json!({
        "text": text,
        "originalText": text,
        "fontSize": font_size,
        "fontFamily": 1,
        "textAlign": "center",
        "verticalAlign": "middle",
        "baseline": font_size,
        "containerId": container_id,
        "lineHeight": 1.25,
        "autoResize": true,
    })
}

fn node_elements(node: &Node, position: Position, updated: i64) -> [Value; 2] {
    let rect_id = format!("node-{}-bg", node.id);
    let text_id = format!("node-{}-text", node.id);
    let frame = Frame {
        x: position.x,
        y: position.y,
        width: NODE_WIDTH,
        height: NODE_HEIGHT,
    };

    let rect = element(
        &rect_id,
        "rectangle",
        &frame,
        updated,
        json!({
            "backgroundColor": node_color(node.node_type),
            "boundElements": [{"type": "text", "id": text_id}],
        }),
    );
    let text = element(
        &text_id,
        "text",
        &frame,
        updated,
        text_fields(&node.label, NODE_FONT_SIZE, Some(rect_id.as_str())),
    );
    [rect, text]
}

fn edge_elements(edge: &Edge, source: Position, target: Position, updated: i64) -> Vec<Value> {
    let color = edge_color(edge.edge_type);
    let (start_x, start_y) = source.bottom_center();
    let (end_x, end_y) = target.top_center();
    let (dx, dy) = (end_x - start_x, end_y - start_y);

    let arrow_id = format!("edge-{}-line", edge.id);
    let mut elements = vec![element(
        &arrow_id,
        "arrow",
        &Frame {
            x: start_x,
            y: start_y,
            width: dx.abs(),
            height: dy.abs(),
        },
        updated,
        json!({
            "strokeColor": color,
            "points": [[0.0, 0.0], [dx, dy]],
            "lastCommittedPoint": null,
            "startBinding": null,
            "endBinding": null,
            "startArrowhead": null,
            "endArrowhead": "arrow",
        }),
    )];

    if let Some(label) = edge.label.as_deref().filter(|l| !l.is_empty()) {
        let width = (label.chars().count() as f64 * 7.0).max(40.0);
        let (mid_x, mid_y) = ((start_x + end_x) / 2.0, (start_y + end_y) / 2.0);
        elements.push(element(
            &format!("edge-{}-label", edge.id),
            "text",
            &Frame {
                x: mid_x - width / 2.0,
                y: mid_y - LABEL_HEIGHT / 2.0,
                width,
                height: LABEL_HEIGHT,
            },
            updated,
            {
                let mut fields = text_fields(label, LABEL_FONT_SIZE, None);
                fields["strokeColor"] = json!(color);
                fields
            },
        ));
    }
    elements
}

/// Build the Excalidraw scene as a JSON value.
pub fn excalidraw_scene(diagram: &Diagram) -> Value {
    let layout = layered_layout(&diagram.nodes);
    let updated = diagram.metadata.generated_at.timestamp_millis();

    let mut elements = Vec::new();
    for node in &diagram.nodes {
        if let Some(position) = layout.position(&node.id) {
            elements.extend(node_elements(node, position, updated));
        }
    }

    let mut skipped = 0;
    for edge in &diagram.edges {
        match (layout.position(&edge.source), layout.position(&edge.target)) {
            (Some(source), Some(target)) => {
                elements.extend(edge_elements(edge, source, target, updated))
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!("Skipped {} edges with endpoints outside the diagram", skipped);
    }

    json!({
        "type": "excalidraw",
        "version": 2,
        "source": SCENE_SOURCE,
        "elements": elements,
        "appState": {
            "viewBackgroundColor": BACKGROUND_COLOR,
            "gridSize": null,
        },
        "files": {},
    })
}

pub fn render_excalidraw(diagram: &Diagram) -> Result<String> {
    Ok(serde_json::to_string_pretty(&excalidraw_scene(diagram))?)
}
