//! Rendering pipeline for the headless surface: layout, paint, raster.

pub mod layout;
pub mod paint;
pub mod raster;

use crate::{Bitmap, Viewport};
use scraper::Html;

/// Horizontal and vertical advance of one glyph cell at scale 1
pub const GLYPH_ADVANCE: u32 = 8;

/// Render an HTML document into a viewport-sized bitmap.
pub fn render_document(html: &str, viewport: Viewport) -> Bitmap {
    let document = Html::parse_document(html);
    let nodes = layout::layout_document(&document, viewport);
    let commands = paint::build_display_list(&nodes);
    raster::rasterize(viewport.width, viewport.height, &commands)
}

/// A blank page of the viewport's size
pub fn render_blank(viewport: Viewport) -> Bitmap {
    raster::rasterize(viewport.width, viewport.height, &[])
}
