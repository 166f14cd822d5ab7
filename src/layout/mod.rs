//! # Flexbox Layout Engine
//!
//! Turns a tree of style declarations into resolved pixel geometry.
//!
//! Nodes live in a [`LayoutTree`] arena and are addressed by [`NodeId`].
//! Parents hold an ordered list of child ids and every child keeps an
//! optional parent id, so walking up to mark ancestors dirty and walking
//! down to lay out children are both plain index lookups.
//!
//! ## Freshness
//!
//! Each node carries a [`LayoutState`]:
//!
//! - `Dirty`: some style or child changed, the current layout is stale.
//! - `HasNewLayout`: the last pass produced a result nobody acknowledged yet.
//! - `UpToDate`: the result was acknowledged with
//!   [`LayoutTree::mark_layout_seen`].
//!
//! Any mutation moves the node and all of its ancestors back to `Dirty`.
//! Mutating a node that still holds an unacknowledged layout is a usage
//! error and fails with [`LayoutError::LayoutNotSeen`] before anything is
//! changed.
//!
//! The algorithm itself lives in [`engine`]; flexible-space distribution
//! is split out into [`flex`] so it can be tested on its own.

pub mod engine;
pub mod flex;
pub mod result;
pub mod spacing;
pub mod style;
pub mod value;

use std::fmt;

use crate::error::{LayoutError, MeasureError};

pub use engine::{LayoutContext, LayoutStats};
pub use result::{CachedLayoutResult, LayoutResult};
pub use spacing::{Edge, Spacing};
pub use style::{
    Align, Dimension, Direction, FlexDirection, Justify, LayoutStyle, PositionType, Wrap,
};
pub use value::{floats_equal, UNDEFINED};

/// Stable handle to a node inside a [`LayoutTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Intrinsic size reported by a [`MeasureFunction`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureOutput {
    pub width: f64,
    pub height: f64,
}

impl MeasureOutput {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for MeasureOutput {
    fn default() -> Self {
        Self {
            width: UNDEFINED,
            height: UNDEFINED,
        }
    }
}

/// Sizes leaf content the engine knows nothing about (text, images).
///
/// `width` is the content-box width available to the node. It is
/// [`UNDEFINED`] when nothing in the ancestor chain bounds it, and the
/// callback must cope with that. The callback only gets a shared borrow of
/// the node, so it cannot mutate the tree or start another pass.
pub trait MeasureFunction: Send {
    fn measure(&self, node: &Node, width: f64) -> Result<MeasureOutput, MeasureError>;
}

impl<F> MeasureFunction for F
where
    F: Fn(&Node, f64) -> Result<MeasureOutput, MeasureError> + Send,
{
    fn measure(&self, node: &Node, width: f64) -> Result<MeasureOutput, MeasureError> {
        self(node, width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    Dirty,
    HasNewLayout,
    UpToDate,
}

impl LayoutState {
    /// The single place where state changes are validated.
    fn transition(self, next: LayoutState) -> Result<LayoutState, LayoutError> {
        match (self, next) {
            (LayoutState::HasNewLayout, LayoutState::Dirty) => Err(LayoutError::LayoutNotSeen),
            (LayoutState::HasNewLayout, LayoutState::UpToDate) => Ok(next),
            (_, LayoutState::UpToDate) => Err(LayoutError::NoNewLayout),
            _ => Ok(next),
        }
    }
}

pub struct Node {
    style: LayoutStyle,
    layout: LayoutResult,
    last_layout: CachedLayoutResult,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    measure: Option<Box<dyn MeasureFunction>>,
    line_index: usize,
    state: LayoutState,
}

impl Node {
    fn with_style(style: LayoutStyle) -> Self {
        Self {
            style,
            layout: LayoutResult::default(),
            last_layout: CachedLayoutResult::default(),
            children: Vec::new(),
            parent: None,
            measure: None,
            line_index: 0,
            state: LayoutState::Dirty,
        }
    }

    pub fn style(&self) -> &LayoutStyle {
        &self.style
    }

    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn is_measure_defined(&self) -> bool {
        self.measure.is_some()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("style", &self.style)
            .field("layout", &self.layout)
            .field("children", &self.children)
            .field("parent", &self.parent)
            .field("measure", &self.measure.is_some())
            .field("line_index", &self.line_index)
            .field("state", &self.state)
            .finish()
    }
}

/// Arena owning every node of one or more trees.
///
/// A tree is laid out with [`LayoutTree::calculate_layout`]. Separate
/// arenas are independent, so disjoint trees can be laid out on different
/// threads, each with its own [`LayoutContext`].
#[derive(Debug, Default)]
pub struct LayoutTree {
    nodes: Vec<Node>,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node with the default style.
    pub fn new_node(&mut self) -> NodeId {
        self.new_node_with_style(LayoutStyle::default())
    }

    pub fn new_node_with_style(&mut self, style: LayoutStyle) -> NodeId {
        self.nodes.push(Node::with_style(style));
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// # Panics
    ///
    /// If `id` was not created by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    // ── Children ────────────────────────────────────────────────────

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), LayoutError> {
        let count = self.child_count(parent);
        self.insert_child(parent, child, count)
    }

    /// Attach `child` at `index`. Both nodes become dirty.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), LayoutError> {
        if self.nodes[child.0].parent.is_some() {
            return Err(LayoutError::AlreadyHasParent);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(LayoutError::WouldCreateCycle);
        }
        let count = self.child_count(parent);
        if index > count {
            return Err(LayoutError::ChildIndexOutOfBounds { index, count });
        }
        self.check_dirty(child)?;
        self.check_dirty(parent)?;

        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.mark_dirty(child);
        self.mark_dirty(parent);
        Ok(())
    }

    /// Detach and return the child at `index`.
    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> Result<NodeId, LayoutError> {
        let count = self.child_count(parent);
        if index >= count {
            return Err(LayoutError::ChildIndexOutOfBounds { index, count });
        }
        self.check_dirty(parent)?;

        let removed = self.nodes[parent.0].children.remove(index);
        self.nodes[removed.0].parent = None;
        self.mark_dirty(parent);
        Ok(removed)
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[parent.0].children.get(index).copied()
    }

    pub fn child_count(&self, parent: NodeId) -> usize {
        self.nodes[parent.0].children.len()
    }

    pub fn children(&self, parent: NodeId) -> &[NodeId] {
        &self.nodes[parent.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.nodes[parent.0].children.iter().position(|&c| c == child)
    }

    /// Line the child was placed on during the last pass of its parent.
    pub fn line_index(&self, id: NodeId) -> usize {
        self.nodes[id.0].line_index
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    /// Restore a detached node to its freshly created state so it can be
    /// reused. The measure function is kept.
    pub fn reset(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let node = &mut self.nodes[id.0];
        if node.parent.is_some() || !node.children.is_empty() {
            return Err(LayoutError::NodeAttached);
        }
        node.style = LayoutStyle::default();
        node.layout.reset();
        node.last_layout = CachedLayoutResult::default();
        node.line_index = 0;
        node.state = LayoutState::Dirty;
        Ok(())
    }

    // ── Freshness ───────────────────────────────────────────────────

    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.nodes[id.0].state == LayoutState::Dirty
    }

    pub fn has_new_layout(&self, id: NodeId) -> bool {
        self.nodes[id.0].state == LayoutState::HasNewLayout
    }

    /// Acknowledge the layout produced by the last pass.
    pub fn mark_layout_seen(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let node = &mut self.nodes[id.0];
        node.state = node.state.transition(LayoutState::UpToDate)?;
        Ok(())
    }

    /// Acknowledge every fresh layout below and including `root`. Nodes the
    /// last pass served from cache without visiting are left alone.
    pub fn mark_tree_layout_seen(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id.0];
            if node.state == LayoutState::HasNewLayout {
                node.state = LayoutState::UpToDate;
            }
            stack.extend(node.children.iter().copied());
        }
    }

    /// Mark `id` and its ancestors dirty.
    pub fn dirty(&mut self, id: NodeId) -> Result<(), LayoutError> {
        self.check_dirty(id)?;
        self.mark_dirty(id);
        Ok(())
    }

    fn check_dirty(&self, id: NodeId) -> Result<(), LayoutError> {
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = &self.nodes[cur.0];
            if node.state == LayoutState::Dirty {
                break;
            }
            node.state.transition(LayoutState::Dirty)?;
            current = node.parent;
        }
        Ok(())
    }

    fn mark_dirty(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = &mut self.nodes[cur.0];
            if node.state == LayoutState::Dirty {
                break;
            }
            node.state = LayoutState::Dirty;
            current = node.parent;
        }
    }

    // ── Measurement ─────────────────────────────────────────────────

    pub fn set_measure_function<F>(&mut self, id: NodeId, measure: F) -> Result<(), LayoutError>
    where
        F: Fn(&Node, f64) -> Result<MeasureOutput, MeasureError> + Send + 'static,
    {
        self.set_measure(id, Box::new(measure))
    }

    /// Attach an already boxed [`MeasureFunction`].
    pub fn set_measure(
        &mut self,
        id: NodeId,
        measure: Box<dyn MeasureFunction>,
    ) -> Result<(), LayoutError> {
        self.dirty(id)?;
        self.nodes[id.0].measure = Some(measure);
        Ok(())
    }

    pub fn clear_measure_function(&mut self, id: NodeId) -> Result<(), LayoutError> {
        if self.nodes[id.0].measure.is_none() {
            return Ok(());
        }
        self.dirty(id)?;
        self.nodes[id.0].measure = None;
        Ok(())
    }

    // ── Style setters ───────────────────────────────────────────────
    //
    // Every setter is a no-op when the value does not change, so setting the
    // same style twice never dirties the tree.

    pub fn style(&self, id: NodeId) -> &LayoutStyle {
        &self.nodes[id.0].style
    }

    /// Replace the whole style record.
    pub fn set_style(&mut self, id: NodeId, style: LayoutStyle) -> Result<(), LayoutError> {
        self.dirty(id)?;
        self.nodes[id.0].style = style;
        Ok(())
    }

    fn update_field<T, F>(&mut self, id: NodeId, value: T, field: F) -> Result<(), LayoutError>
    where
        T: PartialEq + Copy,
        F: Fn(&mut LayoutStyle) -> &mut T,
    {
        if *field(&mut self.nodes[id.0].style) == value {
            return Ok(());
        }
        self.dirty(id)?;
        *field(&mut self.nodes[id.0].style) = value;
        Ok(())
    }

    fn update_scalar<F>(&mut self, id: NodeId, value: f64, field: F) -> Result<(), LayoutError>
    where
        F: Fn(&mut LayoutStyle) -> &mut f64,
    {
        if floats_equal(*field(&mut self.nodes[id.0].style), value) {
            return Ok(());
        }
        self.dirty(id)?;
        *field(&mut self.nodes[id.0].style) = value;
        Ok(())
    }

    /// Apply `update` to a copy of the style and keep it only if `update`
    /// reports a change.
    fn update_spacing<F>(&mut self, id: NodeId, update: F) -> Result<(), LayoutError>
    where
        F: FnOnce(&mut LayoutStyle) -> bool,
    {
        let mut style = self.nodes[id.0].style.clone();
        if !update(&mut style) {
            return Ok(());
        }
        self.dirty(id)?;
        self.nodes[id.0].style = style;
        Ok(())
    }

    pub fn set_direction(&mut self, id: NodeId, direction: Direction) -> Result<(), LayoutError> {
        self.update_field(id, direction, |s| &mut s.direction)
    }

    pub fn set_flex_direction(
        &mut self,
        id: NodeId,
        flex_direction: FlexDirection,
    ) -> Result<(), LayoutError> {
        self.update_field(id, flex_direction, |s| &mut s.flex_direction)
    }

    pub fn set_justify_content(&mut self, id: NodeId, justify: Justify) -> Result<(), LayoutError> {
        self.update_field(id, justify, |s| &mut s.justify_content)
    }

    pub fn set_align_content(&mut self, id: NodeId, align: Align) -> Result<(), LayoutError> {
        self.update_field(id, align, |s| &mut s.align_content)
    }

    pub fn set_align_items(&mut self, id: NodeId, align: Align) -> Result<(), LayoutError> {
        self.update_field(id, align, |s| &mut s.align_items)
    }

    pub fn set_align_self(&mut self, id: NodeId, align: Align) -> Result<(), LayoutError> {
        self.update_field(id, align, |s| &mut s.align_self)
    }

    pub fn set_position_type(
        &mut self,
        id: NodeId,
        position_type: PositionType,
    ) -> Result<(), LayoutError> {
        self.update_field(id, position_type, |s| &mut s.position_type)
    }

    pub fn set_flex_wrap(&mut self, id: NodeId, wrap: Wrap) -> Result<(), LayoutError> {
        self.update_field(id, wrap, |s| &mut s.flex_wrap)
    }

    pub fn set_flex(&mut self, id: NodeId, flex: f64) -> Result<(), LayoutError> {
        self.update_scalar(id, flex, |s| &mut s.flex)
    }

    pub fn set_width(&mut self, id: NodeId, width: f64) -> Result<(), LayoutError> {
        self.update_scalar(id, width, |s| &mut s.dimensions[Dimension::Width.index()])
    }

    pub fn set_height(&mut self, id: NodeId, height: f64) -> Result<(), LayoutError> {
        self.update_scalar(id, height, |s| &mut s.dimensions[Dimension::Height.index()])
    }

    pub fn set_min_width(&mut self, id: NodeId, value: f64) -> Result<(), LayoutError> {
        self.update_scalar(id, value, |s| &mut s.min_width)
    }

    pub fn set_min_height(&mut self, id: NodeId, value: f64) -> Result<(), LayoutError> {
        self.update_scalar(id, value, |s| &mut s.min_height)
    }

    pub fn set_max_width(&mut self, id: NodeId, value: f64) -> Result<(), LayoutError> {
        self.update_scalar(id, value, |s| &mut s.max_width)
    }

    pub fn set_max_height(&mut self, id: NodeId, value: f64) -> Result<(), LayoutError> {
        self.update_scalar(id, value, |s| &mut s.max_height)
    }

    /// Set a left/top/right/bottom offset.
    pub fn set_position(&mut self, id: NodeId, edge: Edge, value: f64) -> Result<(), LayoutError> {
        if !Edge::PHYSICAL.contains(&edge) {
            return Err(LayoutError::NotPhysicalEdge(edge));
        }
        self.update_scalar(id, value, |s| &mut s.position[edge.index()])
    }

    pub fn set_margin(&mut self, id: NodeId, edge: Edge, value: f64) -> Result<(), LayoutError> {
        self.update_spacing(id, |s| s.margin.set(edge, value))
    }

    pub fn set_padding(&mut self, id: NodeId, edge: Edge, value: f64) -> Result<(), LayoutError> {
        self.update_spacing(id, |s| s.padding.set(edge, value))
    }

    pub fn set_border(&mut self, id: NodeId, edge: Edge, value: f64) -> Result<(), LayoutError> {
        self.update_spacing(id, |s| s.border.set(edge, value))
    }

    /// Padding used when neither the edge nor any of its aliases is set.
    pub fn set_default_padding(
        &mut self,
        id: NodeId,
        edge: Edge,
        value: f64,
    ) -> Result<(), LayoutError> {
        self.update_spacing(id, |s| s.padding.set_default(edge, value))
    }

    // ── Results ─────────────────────────────────────────────────────

    pub fn layout(&self, id: NodeId) -> &LayoutResult {
        &self.nodes[id.0].layout
    }

    pub fn layout_x(&self, id: NodeId) -> f64 {
        self.nodes[id.0].layout.left()
    }

    pub fn layout_y(&self, id: NodeId) -> f64 {
        self.nodes[id.0].layout.top()
    }

    pub fn layout_width(&self, id: NodeId) -> f64 {
        self.nodes[id.0].layout.width()
    }

    pub fn layout_height(&self, id: NodeId) -> f64 {
        self.nodes[id.0].layout.height()
    }

    pub fn layout_direction(&self, id: NodeId) -> Direction {
        self.nodes[id.0].layout.direction
    }

    /// Render the resolved layout of a subtree. Nesting is shown with `__`
    /// so it survives log viewers that strip leading whitespace.
    pub fn dump(&self, root: NodeId) -> String {
        let mut out = String::new();
        self.dump_into(root, 0, &mut out);
        out
    }

    fn dump_into(&self, id: NodeId, level: usize, out: &mut String) {
        let indentation = "__".repeat(level);
        let node = &self.nodes[id.0];
        out.push_str(&indentation);
        out.push_str(&node.layout.to_string());
        if node.children.is_empty() {
            return;
        }
        out.push_str(", children: [\n");
        for &child in &node.children {
            self.dump_into(child, level + 1, out);
            out.push('\n');
        }
        out.push_str(&indentation);
        out.push(']');
    }
}
