//! Layered placement of nodes by architectural layer
//!
//! Layers stack top to bottom in [`Layer::ALL`] order. Each non-empty layer is one
//! or more rows centered on `x = 0`; empty layers take no vertical space.

use std::collections::HashMap;

use archgen_core::{Node, NodeType};
use serde_json::Value;

pub const NODE_WIDTH: f64 = 200.0;
pub const NODE_HEIGHT: f64 = 100.0;
pub const LAYER_PADDING: f64 = 150.0;
pub const HORIZONTAL_PADDING: f64 = 100.0;
/// Vertical gap between wrapped rows of the same layer.
pub const ROW_PADDING: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Core,
    Application,
    Interface,
    Infrastructure,
    External,
}

impl Layer {
    pub const ALL: [Layer; 5] = [
        Layer::Core,
        Layer::Application,
        Layer::Interface,
        Layer::Infrastructure,
        Layer::External,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Core => "core",
            Layer::Application => "application",
            Layer::Interface => "interface",
            Layer::Infrastructure => "infrastructure",
            Layer::External => "external",
        }
    }

    fn for_type(node_type: NodeType) -> Option<Layer> {
        match node_type {
            NodeType::Domain => Some(Layer::Core),
            NodeType::Service => Some(Layer::Application),
            NodeType::Controller => Some(Layer::Interface),
            NodeType::Repository | NodeType::Util | NodeType::Config => Some(Layer::Infrastructure),
            NodeType::External => Some(Layer::External),
            _ => None,
        }
    }

    fn from_hint(hint: &str) -> Option<Layer> {
        Layer::ALL
            .into_iter()
            .find(|layer| layer.as_str().eq_ignore_ascii_case(hint.trim()))
    }
}

fn has_external_dependency(node: &Node) -> bool {
    let Some(Value::Array(deps)) = node.metadata.get("dependencies") else {
        return false;
    };
    deps.iter().any(|dep| {
        ["type", "source"]
            .iter()
            .any(|key| dep.get(key).and_then(Value::as_str) == Some("external"))
    })
}

/// Pick a node's layer: type table, then the `layer` metadata hint, then
/// external dependencies, then the application layer.
///
/// A hint that names no known layer is ignored.
pub fn layer_of(node: &Node) -> Layer {
    if let Some(layer) = Layer::for_type(node.node_type) {
        return layer;
    }
    if let Some(layer) = node
        .metadata
        .get("layer")
        .and_then(Value::as_str)
        .and_then(Layer::from_hint)
    {
        return layer;
    }
    if has_external_dependency(node) {
        return Layer::External;
    }
    Layer::Application
}

/// Top-left corner of a laid-out node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn center(&self) -> (f64, f64) {
        (self.x + NODE_WIDTH / 2.0, self.y + NODE_HEIGHT / 2.0)
    }

    pub fn top_center(&self) -> (f64, f64) {
        (self.x + NODE_WIDTH / 2.0, self.y)
    }

    pub fn bottom_center(&self) -> (f64, f64) {
        (self.x + NODE_WIDTH / 2.0, self.y + NODE_HEIGHT)
    }
}

/// Axis-aligned box enclosing every laid-out node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Default)]
pub struct Layout {
    positions: HashMap<String, Position>,
    layers: HashMap<String, Layer>,
}

impl Layout {
    pub fn position(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn layer(&self, id: &str) -> Option<Layer> {
        self.layers.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut positions = self.positions.values();
        let first = positions.next()?;
        let mut bounds = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x + NODE_WIDTH,
            max_y: first.y + NODE_HEIGHT,
        };
        for p in positions {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x + NODE_WIDTH);
            bounds.max_y = bounds.max_y.max(p.y + NODE_HEIGHT);
        }
        Some(bounds)
    }
}

/// Assign every node a position, one row per layer. Within a layer nodes keep their
/// input order.
pub fn layered_layout(nodes: &[Node]) -> Layout {
    wrapped_layout(nodes, usize::MAX)
}

/// Like [`layered_layout`], but a layer with more than `max_per_row` nodes is split
/// into several centered rows.
pub fn wrapped_layout(nodes: &[Node], max_per_row: usize) -> Layout {
    let max_per_row = max_per_row.max(1);
    let mut grouped: HashMap<Layer, Vec<&Node>> = HashMap::new();
    for node in nodes {
        grouped.entry(layer_of(node)).or_default().push(node);
    }

    let mut layout = Layout::default();
    let mut y = 0.0;
    for layer in Layer::ALL {
        let Some(members) = grouped.get(&layer) else {
            continue;
        };

        for (i, row) in members.chunks(max_per_row).enumerate() {
            if i > 0 {
                y += NODE_HEIGHT + ROW_PADDING;
            }
            let total_width =
                row.len() as f64 * (NODE_WIDTH + HORIZONTAL_PADDING) - HORIZONTAL_PADDING;
            let mut x = -total_width / 2.0;
            for node in row {
                layout
                    .positions
                    .entry(node.id.clone())
                    .or_insert(Position { x, y });
                layout.layers.entry(node.id.clone()).or_insert(layer);
                x += NODE_WIDTH + HORIZONTAL_PADDING;
            }
        }

        y += NODE_HEIGHT + LAYER_PADDING;
    }
    layout
}
