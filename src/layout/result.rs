//! Resolved geometry written by the layout engine.

use std::fmt;

use super::spacing::Edge;
use super::style::{Dimension, Direction};
use super::value::UNDEFINED;

/// The resolved box of a node, relative to its parent's border box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutResult {
    /// Left/top/right/bottom offsets, indexed by [`Edge::index`]. Left and
    /// top are authoritative; right and bottom are filled in for reversed
    /// axes.
    pub position: [f64; 4],
    pub dimensions: [f64; 2],
    pub direction: Direction,
}

impl Default for LayoutResult {
    fn default() -> Self {
        Self {
            position: [0.0; 4],
            dimensions: [UNDEFINED; 2],
            direction: Direction::Ltr,
        }
    }
}

impl LayoutResult {
    /// Must run before a node is laid out by its parent.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn left(&self) -> f64 {
        self.position[Edge::Left.index()]
    }

    pub fn top(&self) -> f64 {
        self.position[Edge::Top.index()]
    }

    pub fn right(&self) -> f64 {
        self.position[Edge::Right.index()]
    }

    pub fn bottom(&self) -> f64 {
        self.position[Edge::Bottom.index()]
    }

    pub fn width(&self) -> f64 {
        self.dimensions[Dimension::Width.index()]
    }

    pub fn height(&self) -> f64 {
        self.dimensions[Dimension::Height.index()]
    }
}

impl fmt::Display for LayoutResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "layout: {{left: {}, top: {}, width: {}, height: {}, direction: {:?}}}",
            self.left(),
            self.top(),
            self.width(),
            self.height(),
            self.direction
        )
    }
}

/// A previous [`LayoutResult`] plus the inputs that produced it.
#[derive(Debug, Clone, Copy)]
pub struct CachedLayoutResult {
    pub layout: LayoutResult,
    /// The width the parent had already resolved for the node when it was
    /// laid out (undefined if none).
    pub requested_width: f64,
    pub requested_height: f64,
    pub parent_max_width: f64,
}

impl Default for CachedLayoutResult {
    fn default() -> Self {
        Self {
            layout: LayoutResult::default(),
            requested_width: UNDEFINED,
            requested_height: UNDEFINED,
            parent_max_width: UNDEFINED,
        }
    }
}
