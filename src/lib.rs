//! # Kansha
//!
//! Renders a tree of boxes to a static SVG image.
//!
//! A document is a tree of views, text and images styled with a subset of
//! CSS flexbox. Kansha builds a layout node for every element, runs a
//! flexbox layout pass that resolves each node to `(x, y, width, height)`,
//! and writes the result out as SVG.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    Document tree: elements, styles, content
//!       ↓
//!   [style]    Inheritance, defaults, layout style
//!       ↓
//!   [layout]   Flexbox engine over a node arena
//!       ↓
//!   [svg]      Serialize to SVG markup
//! ```
//!
//! [`text`] and [`image_loader`] size leaf content for the layout engine.
//! The engine itself knows nothing about either; it calls back into them
//! through measure functions.

pub mod error;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod style;
pub mod svg;
pub mod text;

use log::debug;

pub use error::{KanshaError, LayoutError};
use layout::LayoutContext;
use model::{Document, RenderTree};

/// Render a document to SVG markup.
///
/// This is the primary entry point.
pub fn render(document: &Document) -> Result<String, KanshaError> {
    let tree = render_to_layout(document)?;
    let svg = svg::write_svg(&tree)?;
    debug!("wrote {} bytes of SVG", svg.len());
    Ok(svg)
}

/// Render a document described as JSON to SVG markup.
pub fn render_json(json: &str) -> Result<String, KanshaError> {
    let document: Document = serde_json::from_str(json)?;
    render(&document)
}

/// Build and lay out a document without serializing it. Useful for
/// inspecting the resolved geometry.
pub fn render_to_layout(document: &Document) -> Result<RenderTree, KanshaError> {
    let mut tree = model::build(document)?;
    let mut ctx = LayoutContext::new();
    tree.calculate_layout(&mut ctx)?;
    Ok(tree)
}
