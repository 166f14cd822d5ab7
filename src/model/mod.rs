//! # Document Model
//!
//! The input representation for the renderer. A document is a canvas
//! description plus a tree of elements, each with a kind, style properties
//! and children. It is meant to be produced directly as JSON:
//!
//! ```json
//! {
//!   "width": 200,
//!   "root": {
//!     "kind": { "type": "View" },
//!     "style": { "flexDirection": "Row" },
//!     "children": [ { "kind": { "type": "Text", "content": "Hi" } } ]
//!   }
//! }
//! ```
//!
//! [`build`] turns a document into a layout tree.

pub mod build;

use crate::style::Style;
use serde::{Deserialize, Serialize};

pub use build::{build, RenderNode, RenderNodeKind, RenderTree};

/// A complete document ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Canvas width. When absent the canvas shrinks to the content.
    #[serde(default)]
    pub width: Option<f64>,
    /// Canvas height. When absent the canvas shrinks to the content.
    #[serde(default)]
    pub height: Option<f64>,
    /// Outline every box in the output.
    #[serde(default)]
    pub debug: bool,
    pub root: Element,
}

/// An element in the document tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub kind: ElementKind,

    #[serde(default)]
    pub style: Style,

    /// Child elements. Only views may have any.
    #[serde(default)]
    pub children: Vec<Element>,
}

/// The different kinds of elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementKind {
    /// A generic container, analogous to a `<div>`.
    View,

    /// A text leaf, sized by the text measurer.
    Text { content: String },

    /// An image leaf. `src` is a data URI or a file path.
    Image { src: String },
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::View => "View",
            ElementKind::Text { .. } => "Text",
            ElementKind::Image { .. } => "Image",
        }
    }

    pub fn accepts_children(&self) -> bool {
        matches!(self, ElementKind::View)
    }
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            width: None,
            height: None,
            debug: false,
            root,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

impl Element {
    /// Create a View element with children.
    pub fn view(style: Style, children: Vec<Element>) -> Self {
        Self {
            kind: ElementKind::View,
            style,
            children,
        }
    }

    /// Create a Text element.
    pub fn text(content: &str, style: Style) -> Self {
        Self {
            kind: ElementKind::Text {
                content: content.to_string(),
            },
            style,
            children: vec![],
        }
    }

    /// Create an Image element.
    pub fn image(src: &str, style: Style) -> Self {
        Self {
            kind: ElementKind::Image {
                src: src.to_string(),
            },
            style,
            children: vec![],
        }
    }

    /// Number of elements in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Element::count).sum::<usize>()
    }
}
