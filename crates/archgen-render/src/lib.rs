//! Output renderers for architecture diagrams
//!
//! Every renderer is a pure function of the [`Diagram`]; [`render`] dispatches on [`OutputFormat`].

pub mod excalidraw;
pub mod json;
pub mod layout;
pub mod mermaid;
pub mod palette;
pub mod png;
pub mod svg;


use std::fmt;
use std::str::FromStr;

use archgen_core::{ArchgenError, Diagram, Result};
use tracing::debug;

pub use excalidraw::{excalidraw_scene, render_excalidraw};
pub use json::render_json;
pub use layout::{Layer, Layout, Position, layer_of, layered_layout, wrapped_layout};
pub use mermaid::render_mermaid;
pub use png::{render_png, svg_to_png};
pub use svg::render_svg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Mermaid,
    Svg,
    Png,
    Excalidraw,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Mermaid => "mermaid",
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Excalidraw => "excalidraw",
        }
    }

    /// Binary formats cannot be meaningfully printed to a terminal.
    pub fn is_binary(&self) -> bool {
        matches!(self, OutputFormat::Png)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ArchgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "mermaid" | "mmd" => Ok(OutputFormat::Mermaid),
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            "excalidraw" => Ok(OutputFormat::Excalidraw),
            other => Err(ArchgenError::config(format!(
                "Unsupported output format: {} (expected json, mermaid, svg, png or excalidraw)",
                other
            ))),
        }
    }
}

/// Renderer output.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Text(String),
    Binary(Vec<u8>),
}

impl Rendered {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Rendered::Text(text) => text.as_bytes(),
            Rendered::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render a diagram in the requested format.
pub fn render(diagram: &Diagram, format: OutputFormat) -> Result<Rendered> {
    debug!(
        "Rendering {} nodes and {} edges as {}",
        diagram.nodes.len(),
        diagram.edges.len(),
        format
    );

    let rendered = match format {
        OutputFormat::Json => Rendered::Text(render_json(diagram)?),
        OutputFormat::Mermaid => Rendered::Text(render_mermaid(diagram)),
        OutputFormat::Svg => Rendered::Text(render_svg(diagram)),
        OutputFormat::Png => Rendered::Binary(render_png(diagram)?),
        OutputFormat::Excalidraw => Rendered::Text(render_excalidraw(diagram)?),
    };
    Ok(rendered)
}
