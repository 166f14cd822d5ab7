//! Turns a [`Document`] into a layout tree.
//!
//! Every element becomes one layout node. The element tree is mirrored by a
//! [`RenderNode`] tree that remembers which node belongs to which element,
//! along with the resolved visual style, so the SVG writer can walk both
//! after layout without touching the engine again.

use log::{debug, warn};

use super::{Document, Element, ElementKind};
use crate::error::KanshaError;
use crate::image_loader::{load_image, LoadedImage};
use crate::layout::value::{from_option, is_defined};
use crate::layout::{
    Align, FlexDirection, Justify, LayoutContext, LayoutStyle, LayoutTree, MeasureOutput, Node,
    NodeId, Wrap,
};
use crate::style::ResolvedStyle;
use crate::text::{TextLayout, TextMetrics};

/// A document built into a layout tree.
#[derive(Debug)]
pub struct RenderTree {
    pub layout: LayoutTree,
    /// The canvas node wrapping the document's root element.
    pub canvas: NodeId,
    pub root: RenderNode,
    pub debug: bool,
}

#[derive(Debug)]
pub struct RenderNode {
    pub node: NodeId,
    pub kind: RenderNodeKind,
    pub style: ResolvedStyle,
    pub children: Vec<RenderNode>,
}

#[derive(Debug)]
pub enum RenderNodeKind {
    View,
    Text { content: String },
    /// `None` when the source could not be loaded.
    Image { image: Option<LoadedImage> },
}

impl RenderTree {
    pub fn calculate_layout(&mut self, ctx: &mut LayoutContext) -> Result<(), KanshaError> {
        self.layout.calculate_layout(self.canvas, ctx)?;
        Ok(())
    }

    /// Resolved canvas width.
    pub fn width(&self) -> f64 {
        self.layout.layout_width(self.canvas)
    }

    /// Resolved canvas height.
    pub fn height(&self) -> f64 {
        self.layout.layout_height(self.canvas)
    }
}

/// Build the layout tree for `document`. Nothing is laid out yet.
pub fn build(document: &Document) -> Result<RenderTree, KanshaError> {
    let mut layout = LayoutTree::new();
    let canvas = layout.new_node_with_style(canvas_style(document));
    let root = build_element(&mut layout, &document.root, None)?;
    layout.add_child(canvas, root.node)?;

    debug!("built layout tree with {} nodes", layout.len());
    Ok(RenderTree {
        layout,
        canvas,
        root,
        debug: document.debug,
    })
}

/// The canvas lays the root element out like a line of inline content.
fn canvas_style(document: &Document) -> LayoutStyle {
    let mut style = LayoutStyle::default();
    style.flex_direction = FlexDirection::Row;
    style.flex_wrap = Wrap::Wrap;
    style.align_items = Align::FlexStart;
    style.justify_content = Justify::FlexStart;
    style.dimensions = [from_option(document.width), from_option(document.height)];
    style
}

fn build_element(
    layout: &mut LayoutTree,
    element: &Element,
    parent: Option<&ResolvedStyle>,
) -> Result<RenderNode, KanshaError> {
    if !element.children.is_empty() && !element.kind.accepts_children() {
        return Err(KanshaError::RenderError(format!(
            "{} elements cannot have children",
            element.kind.name()
        )));
    }

    let style = element.style.resolve(parent);
    let node = layout.new_node_with_style(element.style.to_layout_style());

    let kind = match &element.kind {
        ElementKind::View => RenderNodeKind::View,
        ElementKind::Text { content } => {
            let metrics = TextMetrics::new(style.font_size, style.line_height);
            let text = content.clone();
            layout.set_measure_function(node, move |_, width| {
                let (w, h) = TextLayout::new(metrics).measure(&text, width);
                Ok(MeasureOutput::new(w, h))
            })?;
            RenderNodeKind::Text {
                content: content.clone(),
            }
        }
        ElementKind::Image { src } => {
            let image = match load_image(src) {
                Ok(image) => Some(image),
                Err(e) => {
                    warn!(
                        "image '{}' rendered as an empty box: {}",
                        abbreviate(src),
                        e
                    );
                    None
                }
            };
            if let Some(image) = &image {
                let (width, height) = (image.width, image.height);
                layout.set_measure_function(node, move |node, available| {
                    Ok(image_size(node, available, width, height))
                })?;
            }
            RenderNodeKind::Image { image }
        }
    };

    let mut children = Vec::with_capacity(element.children.len());
    for child in &element.children {
        let built = build_element(layout, child, Some(&style))?;
        layout.add_child(node, built.node)?;
        children.push(built);
    }

    Ok(RenderNode {
        node,
        kind,
        style,
        children,
    })
}

/// Content size of an image. An explicit width or height fixes one side and
/// the intrinsic aspect ratio gives the other.
fn image_size(node: &Node, available: f64, width: f64, height: f64) -> MeasureOutput {
    if width <= 0.0 || height <= 0.0 {
        return MeasureOutput::new(width.max(0.0), height.max(0.0));
    }
    let style = node.style();
    if style.dimension(FlexDirection::Row).is_some() && is_defined(available) {
        let w = available.max(0.0);
        return MeasureOutput::new(w, w * height / width);
    }
    if let Some(explicit) = style.dimension(FlexDirection::Column) {
        let h = (explicit - style.padding_and_border_axis(FlexDirection::Column)).max(0.0);
        return MeasureOutput::new(h * width / height, h);
    }
    MeasureOutput::new(width, height)
}

/// Data URIs make for very long log lines.
fn abbreviate(src: &str) -> String {
    const MAX: usize = 48;
    if src.chars().count() <= MAX {
        src.to_string()
    } else {
        let head: String = src.chars().take(MAX).collect();
        format!("{}...", head)
    }
}
