//! PNG rasterization of the SVG drawing

use std::io::Cursor;

use archgen_core::{ArchgenError, Diagram, Result};
use image::{ImageFormat, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::svg::render_svg;

/// Longest side of a rasterized diagram, in pixels. Larger drawings are scaled down.
pub const MAX_PNG_SIDE: u32 = 8192;

pub fn render_png(diagram: &Diagram) -> Result<Vec<u8>> {
    svg_to_png(&render_svg(diagram))
}

/// Rasterize an SVG document and encode it as PNG.
///
/// The intrinsic size is used unless a side exceeds [`MAX_PNG_SIDE`], in which case
/// the whole drawing is scaled uniformly to fit.
pub fn svg_to_png(svg: &str) -> Result<Vec<u8>> {
    let mut options = Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = Tree::from_str(svg, &options)
        .map_err(|e| ArchgenError::render(format!("Failed to parse SVG: {}", e)))?;

    let size = tree.size();
    let scale = (MAX_PNG_SIDE as f32 / size.width().max(size.height())).min(1.0);
    let width = ((size.width() * scale).ceil() as u32).clamp(1, MAX_PNG_SIDE);
    let height = ((size.height() * scale).ceil() as u32).clamp(1, MAX_PNG_SIDE);
    if scale < 1.0 {
        tracing::warn!(
            "Diagram is {}x{}; scaling PNG down to {}x{}",
            size.width(),
            size.height(),
            width,
            height
        );
    }

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        ArchgenError::render(format!("Failed to create a {}x{} pixmap", width, height))
    })?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha
    let pixels: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    let img = RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| ArchgenError::render("Failed to create image from pixmap"))?;

    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| ArchgenError::render(format!("Failed to encode PNG: {}", e)))?;

    tracing::debug!(
        "Rasterized {}x{} diagram into {} bytes",
        width,
        height,
        buffer.len()
    );
    Ok(buffer)
}
