//! # Layout Algorithm
//!
//! A single recursive routine lays out a node given the width its parent
//! can offer and the parent's resolved direction. Per node it:
//!
//! 1. resolves direction and the main/cross axes,
//! 2. sizes the node from its explicit style dimensions,
//! 3. measures childless leaves through their measure function,
//! 4. lays children out line by line: non-flexible children first, then
//!    flexible children share whatever space is left, then every child is
//!    placed along the main and cross axes,
//! 5. distributes wrapped lines with `align_content`,
//! 6. sizes the node from its content where no dimension was given,
//! 7. sizes and places absolutely positioned children.
//!
//! Every node keeps the inputs of its previous pass. When a clean node is
//! offered the same requested width, requested height and parent max width
//! again, the cached result is copied back and its subtree is skipped.

use log::{debug, trace};

use super::flex::{align_content_offsets, justify_offsets, resolve_flexible_sizes, FlexItem};
use super::result::CachedLayoutResult;
use super::style::{Align, Direction, FlexDirection, Justify, LayoutStyle, PositionType, Wrap};
use super::value::{floats_equal, is_defined, is_undefined, UNDEFINED};
use super::{LayoutState, LayoutTree, MeasureOutput, NodeId};
use crate::error::LayoutError;

/// Counters collected while a [`LayoutContext`] is in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    /// Measure function invocations.
    pub measure_calls: usize,
    /// Nodes whose cached result was reused.
    pub cache_hits: usize,
    /// Nodes that ran the full algorithm.
    pub nodes_laid_out: usize,
}

/// Pass-local state for [`LayoutTree::calculate_layout`].
///
/// The algorithm touches no global state. Trees in different arenas can be
/// laid out concurrently as long as each thread brings its own context.
#[derive(Debug, Default)]
pub struct LayoutContext {
    stats: LayoutStats,
}

impl LayoutContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> LayoutStats {
        self.stats
    }
}

fn resolve_direction(direction: Direction, parent_direction: Direction) -> Direction {
    if direction == Direction::Inherit {
        parent_direction
    } else {
        direction
    }
}

/// `align_self` unless it is `Auto`, else the parent's `align_items`. An
/// `Auto` that survives both behaves as `FlexStart`.
fn align_item(parent: &LayoutStyle, child: &LayoutStyle) -> Align {
    let align = if child.align_self != Align::Auto {
        child.align_self
    } else {
        parent.align_items
    };
    if align == Align::Auto {
        Align::FlexStart
    } else {
        align
    }
}

/// Cross size for a stretched child, never below its own padding + border.
fn stretched_size(child: &LayoutStyle, axis: FlexDirection, available: f64) -> f64 {
    child
        .bound_axis(axis, available - child.margin_axis(axis))
        .max(child.padding_and_border_axis(axis))
}

impl LayoutTree {
    /// Lay out the tree rooted at `root`. The root is offered an undefined
    /// width and a left-to-right parent direction.
    pub fn calculate_layout(
        &mut self,
        root: NodeId,
        ctx: &mut LayoutContext,
    ) -> Result<(), LayoutError> {
        debug!("calculating layout from node {}", root.index());
        self.nodes[root.0].layout.reset();
        self.layout_node(ctx, root, UNDEFINED, Direction::Ltr)?;
        debug!(
            "layout done: {} laid out, {} cached, {} measured",
            ctx.stats.nodes_laid_out, ctx.stats.cache_hits, ctx.stats.measure_calls
        );
        Ok(())
    }

    /// A clean node is reused when it is offered the same size constraints
    /// and would resolve to the same direction as last time.
    fn needs_relayout(
        &self,
        id: NodeId,
        parent_max_width: f64,
        parent_direction: Direction,
    ) -> bool {
        let node = &self.nodes[id.0];
        let direction = resolve_direction(node.style.direction, parent_direction);
        node.state == LayoutState::Dirty
            || direction != node.last_layout.layout.direction
            || !floats_equal(node.last_layout.requested_height, node.layout.height())
            || !floats_equal(node.last_layout.requested_width, node.layout.width())
            || !floats_equal(node.last_layout.parent_max_width, parent_max_width)
    }

    fn layout_node(
        &mut self,
        ctx: &mut LayoutContext,
        id: NodeId,
        parent_max_width: f64,
        parent_direction: Direction,
    ) -> Result<(), LayoutError> {
        if self.needs_relayout(id, parent_max_width, parent_direction) {
            let requested_width = self.nodes[id.0].layout.width();
            let requested_height = self.nodes[id.0].layout.height();

            if let Err(e) = self.layout_node_impl(ctx, id, parent_max_width, parent_direction) {
                // a half-finished result must not be served from cache
                self.nodes[id.0].state = LayoutState::Dirty;
                return Err(e);
            }
            ctx.stats.nodes_laid_out += 1;

            let node = &mut self.nodes[id.0];
            node.last_layout = CachedLayoutResult {
                layout: node.layout,
                requested_width,
                requested_height,
                parent_max_width,
            };
        } else {
            trace!("reusing cached layout for node {}", id.index());
            ctx.stats.cache_hits += 1;
            let node = &mut self.nodes[id.0];
            node.layout = node.last_layout.layout;
        }

        let node = &mut self.nodes[id.0];
        node.state = node.state.transition(LayoutState::HasNewLayout)?;
        Ok(())
    }

    // ── Small accessors ─────────────────────────────────────────────

    fn dim(&self, id: NodeId, axis: FlexDirection) -> f64 {
        self.nodes[id.0].layout.dimensions[axis.dimension().index()]
    }

    fn set_dim(&mut self, id: NodeId, axis: FlexDirection, value: f64) {
        self.nodes[id.0].layout.dimensions[axis.dimension().index()] = value;
    }

    /// Back-fill the trailing offset of `child` against a known parent size.
    fn fill_trailing(&mut self, child: NodeId, axis: FlexDirection, parent_size: f64) {
        let layout = &mut self.nodes[child.0].layout;
        layout.position[axis.trailing().index()] = parent_size
            - layout.dimensions[axis.dimension().index()]
            - layout.position[axis.leading().index()];
    }

    fn set_dimension_from_style(&mut self, id: NodeId, axis: FlexDirection) {
        let node = &mut self.nodes[id.0];
        let slot = axis.dimension().index();
        // the parent already resolved this one
        if is_defined(node.layout.dimensions[slot]) {
            return;
        }
        if let Some(value) = node.style.dimension(axis) {
            node.layout.dimensions[slot] = node
                .style
                .bound_axis(axis, value)
                .max(node.style.padding_and_border_axis(axis));
        }
    }

    fn call_measure(
        &self,
        ctx: &mut LayoutContext,
        id: NodeId,
        width: f64,
    ) -> Result<MeasureOutput, LayoutError> {
        let node = &self.nodes[id.0];
        match &node.measure {
            Some(measure) => {
                ctx.stats.measure_calls += 1;
                trace!("measuring node {} at width {}", id.index(), width);
                measure.measure(node, width).map_err(LayoutError::Measure)
            }
            None => Ok(MeasureOutput::default()),
        }
    }

    // ── The algorithm ───────────────────────────────────────────────

    fn layout_node_impl(
        &mut self,
        ctx: &mut LayoutContext,
        id: NodeId,
        parent_max_width: f64,
        parent_direction: Direction,
    ) -> Result<(), LayoutError> {
        let children = self.nodes[id.0].children.clone();
        for &child in &children {
            self.nodes[child.0].layout.reset();
        }

        let style = self.nodes[id.0].style.clone();
        let direction = resolve_direction(style.direction, parent_direction);
        let main_axis = style.flex_direction.resolve(direction);
        let cross_axis = main_axis.cross(direction);
        let row_axis = FlexDirection::Row.resolve(direction);

        self.set_dimension_from_style(id, main_axis);
        self.set_dimension_from_style(id, cross_axis);

        {
            // The parent sets the position; complete it with our own margin
            // and relative offset.
            let layout = &mut self.nodes[id.0].layout;
            layout.direction = direction;
            for axis in [main_axis, cross_axis] {
                let relative = style.relative_position(axis);
                layout.position[axis.leading().index()] += style.leading_margin(axis) + relative;
                layout.position[axis.trailing().index()] += style.trailing_margin(axis) + relative;
            }
        }

        let padding_and_border_row = style.padding_and_border_axis(row_axis);

        if self.nodes[id.0].is_measure_defined() {
            let row_dim_resolved = is_defined(self.dim(id, row_axis));
            let style_width = style.dimension(row_axis);

            let available = match style_width {
                Some(width) => width,
                None if row_dim_resolved => self.dim(id, row_axis),
                None => parent_max_width - style.margin_axis(row_axis),
            } - padding_and_border_row;

            // Only ask for what is still unknown.
            let row_undefined = style_width.is_none() && !row_dim_resolved;
            let column_undefined = style.dimension(FlexDirection::Column).is_none()
                && is_undefined(self.dim(id, FlexDirection::Column));

            if row_undefined || column_undefined {
                let measured = self.call_measure(ctx, id, available)?;
                if row_undefined {
                    self.set_dim(id, row_axis, measured.width + padding_and_border_row);
                }
                if column_undefined {
                    let padding_and_border_column =
                        style.padding_and_border_axis(FlexDirection::Column);
                    self.set_dim(
                        id,
                        FlexDirection::Column,
                        measured.height + padding_and_border_column,
                    );
                }
            }
            if children.is_empty() {
                return Ok(());
            }
        }

        let is_wrap = style.flex_wrap == Wrap::Wrap;
        let justify = style.justify_content;

        let leading_padding_and_border_main = style.leading_padding_and_border(main_axis);
        let leading_padding_and_border_cross = style.leading_padding_and_border(cross_axis);
        let padding_and_border_main = style.padding_and_border_axis(main_axis);
        let padding_and_border_cross = style.padding_and_border_axis(cross_axis);

        let is_main_dim_defined = is_defined(self.dim(id, main_axis));
        let is_cross_dim_defined = is_defined(self.dim(id, cross_axis));
        let is_main_row = main_axis.is_row();

        let defined_main_dim = if is_main_dim_defined {
            self.dim(id, main_axis) - padding_and_border_main
        } else {
            UNDEFINED
        };

        // Width offered to children. A column container passes its own
        // content width down; a row container only does so to flexible
        // children and only when its width is explicit.
        let own_content_width = if style.dimension(row_axis).is_some() {
            Some(self.dim(id, row_axis) - padding_and_border_row)
        } else {
            None
        };
        let inherited_content_width =
            parent_max_width - style.margin_axis(row_axis) - padding_and_border_row;
        let fixed_child_max_width = if is_main_row {
            UNDEFINED
        } else {
            own_content_width.unwrap_or(inherited_content_width)
        };
        let flex_child_max_width = match own_content_width {
            Some(width) => width,
            None if !is_main_row => inherited_content_width,
            None => UNDEFINED,
        };

        let mut absolute_children: Vec<NodeId> = Vec::new();

        let mut start_line = 0;
        let mut end_line = 0;
        let mut already_computed_next_layout = false;
        let mut lines_cross_dim = 0.0;
        let mut lines_main_dim: f64 = 0.0;
        let mut lines_count = 0;

        while end_line < children.len() {
            // ── Line pass: lay out non-flexible children, collect the rest

            // Size + margin of everything whose main size is already known,
            // plus padding + border + margin of flexible children.
            let mut main_content_dim = 0.0;
            let mut flexible: Vec<NodeId> = Vec::new();
            let mut non_flexible_count = 0;

            let node_cross = self.dim(id, cross_axis);

            let mut i = start_line;
            while i < children.len() {
                let child = children[i];
                self.nodes[child.0].line_index = lines_count;

                let child_style = self.nodes[child.0].style.clone();
                let is_absolute = child_style.position_type == PositionType::Absolute;

                if align_item(&style, &child_style) == Align::Stretch
                    && !is_absolute
                    && is_cross_dim_defined
                    && !child_style.is_dimension_defined(cross_axis)
                {
                    // stretch now so the child is laid out once
                    let size = stretched_size(
                        &child_style,
                        cross_axis,
                        node_cross - padding_and_border_cross,
                    );
                    self.set_dim(child, cross_axis, size);
                } else if is_absolute {
                    // Both offsets on an axis pin the size.
                    for axis in [FlexDirection::Column, FlexDirection::Row] {
                        let parent_size = self.dim(id, axis);
                        if is_defined(parent_size)
                            && !child_style.is_dimension_defined(axis)
                            && child_style.is_offset_defined(axis.leading())
                            && child_style.is_offset_defined(axis.trailing())
                        {
                            let size = stretched_size(
                                &child_style,
                                axis,
                                parent_size
                                    - style.padding_and_border_axis(axis)
                                    - child_style.offset(axis.leading())
                                    - child_style.offset(axis.trailing()),
                            );
                            self.set_dim(child, axis, size);
                        }
                    }
                }

                // A child only counts as flexible once we know our own size.
                let is_flexible = is_main_dim_defined && child_style.is_flexible();

                let next_content_dim = if is_flexible {
                    child_style.padding_and_border_axis(main_axis)
                        + child_style.margin_axis(main_axis)
                } else {
                    if !already_computed_next_layout {
                        self.layout_node(ctx, child, fixed_child_max_width, direction)?;
                    }
                    if is_absolute {
                        0.0
                    } else {
                        self.dim(child, main_axis) + child_style.margin_axis(main_axis)
                    }
                };

                // The child would overflow: it opens the next line instead.
                // A line always keeps at least its first child.
                if is_wrap
                    && is_main_dim_defined
                    && !is_absolute
                    && i != start_line
                    && main_content_dim + next_content_dim > defined_main_dim
                {
                    already_computed_next_layout = !is_flexible;
                    break;
                }

                if is_absolute {
                    absolute_children.push(child);
                } else if is_flexible {
                    flexible.push(child);
                } else {
                    non_flexible_count += 1;
                }

                already_computed_next_layout = false;
                main_content_dim += next_content_dim;
                end_line = i + 1;
                i += 1;
            }

            // ── Distribute the remaining main-axis space

            let remaining_main_dim = if is_main_dim_defined {
                defined_main_dim - main_content_dim
            } else {
                f64::max(main_content_dim, 0.0) - main_content_dim
            };

            let mut leading_main_dim = 0.0;
            let mut between_main_dim = 0.0;

            if !flexible.is_empty() {
                let items: Vec<FlexItem> = flexible
                    .iter()
                    .map(|&child| {
                        let child_style = &self.nodes[child.0].style;
                        let (min, max) = child_style.bounds(main_axis);
                        FlexItem {
                            flex: child_style.flex,
                            padding_and_border: child_style.padding_and_border_axis(main_axis),
                            min,
                            max,
                        }
                    })
                    .collect();
                let sizes = resolve_flexible_sizes(&items, remaining_main_dim);

                for (&child, size) in flexible.iter().zip(sizes) {
                    self.set_dim(child, main_axis, size);
                    self.layout_node(ctx, child, flex_child_max_width, direction)?;
                }
            } else if justify != Justify::FlexStart {
                (leading_main_dim, between_main_dim) =
                    justify_offsets(justify, remaining_main_dim, non_flexible_count);
            }

            // ── Place children along the main axis

            let node_main = self.dim(id, main_axis);
            let mut main_dim = leading_padding_and_border_main + leading_main_dim;
            let mut cross_dim: f64 = 0.0;

            for &child in &children[start_line..end_line] {
                let node = &mut self.nodes[child.0];
                let child_style = &node.style;
                let layout = &mut node.layout;
                let leading = main_axis.leading().index();

                if child_style.position_type == PositionType::Absolute
                    && child_style.is_offset_defined(main_axis.leading())
                {
                    layout.position[leading] = child_style.offset(main_axis.leading())
                        + style.leading_border(main_axis)
                        + child_style.leading_margin(main_axis);
                    continue;
                }

                layout.position[leading] += main_dim;

                if child_style.position_type == PositionType::Relative {
                    main_dim += between_main_dim
                        + layout.dimensions[main_axis.dimension().index()]
                        + child_style.margin_axis(main_axis);
                    cross_dim = cross_dim.max(child_style.bound_axis(
                        cross_axis,
                        layout.dimensions[cross_axis.dimension().index()]
                            + child_style.margin_axis(cross_axis),
                    ));
                }

                if is_main_dim_defined {
                    self.fill_trailing(child, main_axis, node_main);
                }
            }

            let container_cross_axis = if is_cross_dim_defined {
                node_cross
            } else {
                style
                    .bound_axis(cross_axis, cross_dim + padding_and_border_cross)
                    .max(padding_and_border_cross)
            };

            // ── Place children along the cross axis

            for &child in &children[start_line..end_line] {
                let node = &mut self.nodes[child.0];
                let child_style = &node.style;
                let layout = &mut node.layout;
                let leading = cross_axis.leading().index();
                let slot = cross_axis.dimension().index();

                if child_style.position_type == PositionType::Absolute
                    && child_style.is_offset_defined(cross_axis.leading())
                {
                    layout.position[leading] = child_style.offset(cross_axis.leading())
                        + style.leading_border(cross_axis)
                        + child_style.leading_margin(cross_axis);
                    continue;
                }

                let mut leading_cross_dim = leading_padding_and_border_cross;

                if child_style.position_type == PositionType::Relative {
                    match align_item(&style, child_style) {
                        Align::Stretch => {
                            // only if nothing sized it yet
                            if is_undefined(layout.dimensions[slot]) {
                                layout.dimensions[slot] = stretched_size(
                                    child_style,
                                    cross_axis,
                                    container_cross_axis - padding_and_border_cross,
                                );
                            }
                        }
                        align @ (Align::Center | Align::FlexEnd) => {
                            let remaining_cross_dim = container_cross_axis
                                - padding_and_border_cross
                                - (layout.dimensions[slot] + child_style.margin_axis(cross_axis));
                            leading_cross_dim += if align == Align::Center {
                                remaining_cross_dim / 2.0
                            } else {
                                remaining_cross_dim
                            };
                        }
                        Align::FlexStart | Align::Auto => {}
                    }
                }

                layout.position[leading] += lines_cross_dim + leading_cross_dim;

                if is_cross_dim_defined {
                    self.fill_trailing(child, cross_axis, node_cross);
                }
            }

            lines_cross_dim += cross_dim;
            lines_main_dim = lines_main_dim.max(main_dim);
            lines_count += 1;
            start_line = end_line;
        }

        trace!("node {} laid out {} line(s)", id.index(), lines_count);

        // ── Distribute wrapped lines along the cross axis

        if lines_count > 1 && is_cross_dim_defined {
            let inner_cross = self.dim(id, cross_axis) - padding_and_border_cross;
            let (lead, cross_dim_lead) = align_content_offsets(
                style.align_content,
                inner_cross - lines_cross_dim,
                lines_count,
            );
            let mut current_lead = leading_padding_and_border_cross + lead;
            let leading = cross_axis.leading().index();
            let slot = cross_axis.dimension().index();

            let mut end_index = 0;
            for line in 0..lines_count {
                let start_index = end_index;

                let mut line_height: f64 = 0.0;
                let mut ii = start_index;
                while ii < children.len() {
                    let node = &self.nodes[children[ii].0];
                    if node.style.position_type != PositionType::Relative {
                        ii += 1;
                        continue;
                    }
                    if node.line_index != line {
                        break;
                    }
                    let size = node.layout.dimensions[slot];
                    if is_defined(size) {
                        line_height =
                            line_height.max(size + node.style.margin_axis(cross_axis));
                    }
                    ii += 1;
                }
                end_index = ii;
                line_height += cross_dim_lead;

                for &child in &children[start_index..end_index] {
                    let node = &mut self.nodes[child.0];
                    let child_style = &node.style;
                    if child_style.position_type != PositionType::Relative {
                        continue;
                    }
                    let layout = &mut node.layout;
                    let size = layout.dimensions[slot];
                    layout.position[leading] = match align_item(&style, child_style) {
                        Align::FlexStart | Align::Auto | Align::Stretch => {
                            current_lead + child_style.leading_margin(cross_axis)
                        }
                        Align::FlexEnd => {
                            current_lead + line_height
                                - child_style.trailing_margin(cross_axis)
                                - size
                        }
                        Align::Center => current_lead + (line_height - size) / 2.0,
                    };
                }

                current_lead += line_height;
            }
        }

        // ── Size the node from its content

        let mut needs_main_trailing = false;
        let mut needs_cross_trailing = false;

        if !is_main_dim_defined {
            // the leading side is already inside lines_main_dim
            let size = style
                .bound_axis(
                    main_axis,
                    lines_main_dim + style.trailing_padding_and_border(main_axis),
                )
                .max(padding_and_border_main);
            self.set_dim(id, main_axis, size);
            needs_main_trailing = main_axis.is_reverse();
        }

        if !is_cross_dim_defined {
            let size = style
                .bound_axis(cross_axis, lines_cross_dim + padding_and_border_cross)
                .max(padding_and_border_cross);
            self.set_dim(id, cross_axis, size);
            needs_cross_trailing = cross_axis.is_reverse();
        }

        // Reversed axes could not fill trailing offsets before the size
        // was known.
        if needs_main_trailing || needs_cross_trailing {
            let node_main = self.dim(id, main_axis);
            let node_cross = self.dim(id, cross_axis);
            for &child in &children {
                if needs_main_trailing {
                    self.fill_trailing(child, main_axis, node_main);
                }
                if needs_cross_trailing {
                    self.fill_trailing(child, cross_axis, node_cross);
                }
            }
        }

        // ── Absolutely positioned children

        for &child in &absolute_children {
            for axis in [FlexDirection::Column, FlexDirection::Row] {
                let parent_size = self.dim(id, axis);
                let node = &mut self.nodes[child.0];
                let child_style = &node.style;
                let leading_offset = child_style.offset(axis.leading());
                let trailing_offset = child_style.offset(axis.trailing());
                let slot = axis.dimension().index();

                if is_defined(parent_size)
                    && !child_style.is_dimension_defined(axis)
                    && is_defined(leading_offset)
                    && is_defined(trailing_offset)
                {
                    node.layout.dimensions[slot] = stretched_size(
                        child_style,
                        axis,
                        parent_size
                            - style.leading_border(axis)
                            - style.trailing_border(axis)
                            - leading_offset
                            - trailing_offset,
                    );
                }

                if is_defined(trailing_offset) && is_undefined(leading_offset) {
                    node.layout.position[axis.leading().index()] =
                        parent_size - node.layout.dimensions[slot] - trailing_offset;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Edge;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.001
    }

    fn row(tree: &mut LayoutTree, width: f64, height: f64) -> NodeId {
        let node = tree.new_node();
        tree.set_flex_direction(node, FlexDirection::Row).unwrap();
        tree.set_width(node, width).unwrap();
        tree.set_height(node, height).unwrap();
        node
    }

    fn sized(tree: &mut LayoutTree, width: f64, height: f64) -> NodeId {
        let node = tree.new_node();
        tree.set_width(node, width).unwrap();
        tree.set_height(node, height).unwrap();
        node
    }

    #[test]
    fn test_explicit_size_is_floored_at_padding() {
        let mut tree = LayoutTree::new();
        let node = sized(&mut tree, 10.0, 10.0);
        tree.set_padding(node, Edge::Horizontal, 8.0).unwrap();
        tree.calculate_layout(node, &mut LayoutContext::new()).unwrap();
        assert_eq!(tree.layout_width(node), 16.0);
        assert_eq!(tree.layout_height(node), 10.0);
    }

    #[test]
    fn test_explicit_zero_width_is_honoured() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let child = sized(&mut tree, 0.0, 5.0);
        tree.add_child(root, child).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();
        assert_eq!(tree.layout_width(child), 0.0);
    }

    #[test]
    fn test_min_max_clamp_explicit_size() {
        let mut tree = LayoutTree::new();
        let node = sized(&mut tree, 500.0, 5.0);
        tree.set_max_width(node, 120.0).unwrap();
        tree.set_min_height(node, 40.0).unwrap();
        tree.calculate_layout(node, &mut LayoutContext::new()).unwrap();
        assert_eq!(tree.layout_width(node), 120.0);
        assert_eq!(tree.layout_height(node), 40.0);
    }

    #[test]
    fn test_column_stacks_children_with_margins() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        tree.set_padding(root, Edge::All, 5.0).unwrap();
        let a = sized(&mut tree, 20.0, 10.0);
        let b = sized(&mut tree, 30.0, 10.0);
        tree.set_margin(b, Edge::Top, 4.0).unwrap();
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();

        assert_eq!(tree.layout_y(a), 5.0);
        assert_eq!(tree.layout_x(a), 5.0);
        assert_eq!(tree.layout_y(b), 19.0);
        assert_eq!(tree.layout_width(root), 40.0);
        assert_eq!(tree.layout_height(root), 34.0);
    }

    #[test]
    fn test_stretch_fills_cross_axis() {
        let mut tree = LayoutTree::new();
        let root = sized(&mut tree, 80.0, 50.0);
        tree.set_padding(root, Edge::Horizontal, 10.0).unwrap();
        let child = tree.new_node();
        tree.set_height(child, 10.0).unwrap();
        tree.set_margin(child, Edge::Left, 5.0).unwrap();
        tree.add_child(root, child).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();

        assert_eq!(tree.layout_width(child), 55.0);
        assert_eq!(tree.layout_x(child), 15.0);
    }

    #[test]
    fn test_align_items_center_and_end() {
        let mut tree = LayoutTree::new();
        let root = row(&mut tree, 100.0, 40.0);
        tree.set_align_items(root, Align::Center).unwrap();
        let centered = sized(&mut tree, 10.0, 10.0);
        let ended = sized(&mut tree, 10.0, 10.0);
        tree.set_align_self(ended, Align::FlexEnd).unwrap();
        tree.add_child(root, centered).unwrap();
        tree.add_child(root, ended).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();

        assert_eq!(tree.layout_y(centered), 15.0);
        assert_eq!(tree.layout_y(ended), 30.0);
    }

    #[test]
    fn test_justify_center_and_space_around() {
        let mut tree = LayoutTree::new();
        let root = row(&mut tree, 100.0, 10.0);
        tree.set_justify_content(root, Justify::Center).unwrap();
        let a = sized(&mut tree, 20.0, 10.0);
        tree.add_child(root, a).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();
        assert_eq!(tree.layout_x(a), 40.0);

        tree.mark_tree_layout_seen(root);
        tree.set_justify_content(root, Justify::SpaceAround).unwrap();
        let b = sized(&mut tree, 20.0, 10.0);
        tree.add_child(root, b).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();
        // 60 left over: 15 at each edge, 30 between
        assert_eq!(tree.layout_x(a), 15.0);
        assert_eq!(tree.layout_x(b), 65.0);
    }

    #[test]
    fn test_flex_with_fixed_sibling() {
        let mut tree = LayoutTree::new();
        let root = row(&mut tree, 100.0, 20.0);
        let fixed = sized(&mut tree, 30.0, 20.0);
        let grow = tree.new_node();
        tree.set_flex(grow, 1.0).unwrap();
        tree.set_margin(grow, Edge::Left, 10.0).unwrap();
        tree.add_child(root, fixed).unwrap();
        tree.add_child(root, grow).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();

        assert!(close(tree.layout_width(grow), 60.0));
        assert!(close(tree.layout_x(grow), 40.0));
        assert!(close(tree.layout_height(grow), 20.0));
    }

    #[test]
    fn test_flex_respects_max() {
        let mut tree = LayoutTree::new();
        let root = row(&mut tree, 90.0, 10.0);
        let capped = tree.new_node();
        tree.set_flex(capped, 1.0).unwrap();
        tree.set_max_width(capped, 10.0).unwrap();
        let free = tree.new_node();
        tree.set_flex(free, 1.0).unwrap();
        tree.add_child(root, capped).unwrap();
        tree.add_child(root, free).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();

        assert!(close(tree.layout_width(capped), 10.0));
        assert!(close(tree.layout_width(free), 80.0));
        assert!(close(tree.layout_x(free), 10.0));
    }

    #[test]
    fn test_flex_without_main_size_is_ignored() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        tree.set_flex_direction(root, FlexDirection::Row).unwrap();
        let child = sized(&mut tree, 25.0, 5.0);
        tree.set_flex(child, 1.0).unwrap();
        tree.add_child(root, child).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();
        assert_eq!(tree.layout_width(child), 25.0);
        assert_eq!(tree.layout_width(root), 25.0);
    }

    #[test]
    fn test_measure_receives_available_width() {
        let mut tree = LayoutTree::new();
        let root = sized(&mut tree, 200.0, 100.0);
        tree.set_padding(root, Edge::All, 10.0).unwrap();
        let leaf = tree.new_node();
        tree.set_padding(leaf, Edge::Horizontal, 5.0).unwrap();
        tree.set_align_self(leaf, Align::FlexStart).unwrap();
        tree.set_measure_function(leaf, |_, width| {
            // 180 offered by the root, 10 eaten by the leaf's padding
            assert_eq!(width, 170.0);
            Ok(MeasureOutput::new(50.0, 12.0))
        })
        .unwrap();
        tree.add_child(root, leaf).unwrap();
        let mut ctx = LayoutContext::new();
        tree.calculate_layout(root, &mut ctx).unwrap();

        assert_eq!(tree.layout_width(leaf), 60.0);
        assert_eq!(tree.layout_height(leaf), 12.0);
        assert_eq!(ctx.stats().measure_calls, 1);
    }

    #[test]
    fn test_unbounded_measure_gets_undefined_width() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        tree.set_flex_direction(root, FlexDirection::Row).unwrap();
        let leaf = tree.new_node();
        tree.set_measure_function(leaf, |_, width| {
            assert!(width.is_nan());
            Ok(MeasureOutput::new(33.0, 7.0))
        })
        .unwrap();
        tree.add_child(root, leaf).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();
        assert_eq!(tree.layout_width(root), 33.0);
        assert_eq!(tree.layout_height(root), 7.0);
    }

    #[test]
    fn test_measure_skipped_when_both_sizes_known() {
        let mut tree = LayoutTree::new();
        let leaf = sized(&mut tree, 10.0, 10.0);
        tree.set_measure_function(leaf, |_, _| Err("should not be called".into())).unwrap();
        let mut ctx = LayoutContext::new();
        tree.calculate_layout(leaf, &mut ctx).unwrap();
        assert_eq!(ctx.stats().measure_calls, 0);
    }

    #[test]
    fn test_measure_errors_propagate_and_leave_node_dirty() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let leaf = tree.new_node();
        tree.set_measure_function(leaf, |_, _| Err("font missing".into())).unwrap();
        tree.add_child(root, leaf).unwrap();
        let err = tree
            .calculate_layout(root, &mut LayoutContext::new())
            .unwrap_err();
        assert!(matches!(err, LayoutError::Measure(_)));
        assert!(err.to_string().contains("font missing"));
        assert!(tree.is_dirty(leaf));
        assert!(tree.is_dirty(root));
    }

    #[test]
    fn test_row_reverse_places_from_the_right() {
        let mut tree = LayoutTree::new();
        let root = row(&mut tree, 100.0, 10.0);
        tree.set_flex_direction(root, FlexDirection::RowReverse).unwrap();
        let a = sized(&mut tree, 10.0, 10.0);
        let b = sized(&mut tree, 20.0, 10.0);
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();

        let a_layout = tree.layout(a);
        assert_eq!(a_layout.right(), 0.0);
        assert_eq!(tree.layout(b).right(), 10.0);
    }

    #[test]
    fn test_column_reverse_without_height_fills_bottom() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        tree.set_flex_direction(root, FlexDirection::ColumnReverse).unwrap();
        let a = sized(&mut tree, 10.0, 10.0);
        let b = sized(&mut tree, 10.0, 15.0);
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();

        assert_eq!(tree.layout_height(root), 25.0);
        assert_eq!(tree.layout(a).bottom(), 0.0);
        assert_eq!(tree.layout(b).bottom(), 10.0);
    }

    #[test]
    fn test_relative_offset_shifts_without_affecting_siblings() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let a = sized(&mut tree, 10.0, 10.0);
        tree.set_position(a, Edge::Top, 3.0).unwrap();
        tree.set_position(a, Edge::Left, 2.0).unwrap();
        let b = sized(&mut tree, 10.0, 10.0);
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();

        assert_eq!(tree.layout_y(a), 3.0);
        assert_eq!(tree.layout_x(a), 2.0);
        assert_eq!(tree.layout_y(b), 10.0);
    }

    #[test]
    fn test_absolute_child_is_out_of_flow() {
        let mut tree = LayoutTree::new();
        let root = sized(&mut tree, 100.0, 100.0);
        tree.set_border(root, Edge::All, 2.0).unwrap();
        let overlay = tree.new_node();
        tree.set_position_type(overlay, PositionType::Absolute).unwrap();
        tree.set_position(overlay, Edge::Left, 10.0).unwrap();
        tree.set_position(overlay, Edge::Right, 10.0).unwrap();
        tree.set_position(overlay, Edge::Bottom, 5.0).unwrap();
        tree.set_height(overlay, 20.0).unwrap();
        let flow = sized(&mut tree, 10.0, 10.0);
        tree.add_child(root, overlay).unwrap();
        tree.add_child(root, flow).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();

        assert_eq!(tree.layout_y(flow), 2.0);
        assert_eq!(tree.layout_x(overlay), 12.0);
        assert_eq!(tree.layout_width(overlay), 76.0);
        assert_eq!(tree.layout_y(overlay), 75.0);
    }

    #[test]
    fn test_align_content_center_across_lines() {
        let mut tree = LayoutTree::new();
        let root = row(&mut tree, 50.0, 100.0);
        tree.set_flex_wrap(root, Wrap::Wrap).unwrap();
        tree.set_align_content(root, Align::Center).unwrap();
        tree.set_align_items(root, Align::FlexStart).unwrap();
        let a = sized(&mut tree, 30.0, 20.0);
        let b = sized(&mut tree, 30.0, 20.0);
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();

        assert_eq!(tree.line_index(a), 0);
        assert_eq!(tree.line_index(b), 1);
        assert_eq!(tree.layout_y(a), 30.0);
        assert_eq!(tree.layout_y(b), 50.0);
    }

    #[test]
    fn test_align_content_stretch_widens_lines() {
        let mut tree = LayoutTree::new();
        let root = row(&mut tree, 50.0, 100.0);
        tree.set_flex_wrap(root, Wrap::Wrap).unwrap();
        tree.set_align_content(root, Align::Stretch).unwrap();
        tree.set_align_items(root, Align::FlexEnd).unwrap();
        let a = sized(&mut tree, 30.0, 20.0);
        let b = sized(&mut tree, 30.0, 20.0);
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();

        // two bands of 50, children sit at the bottom of each
        assert_eq!(tree.layout_y(a), 30.0);
        assert_eq!(tree.layout_y(b), 80.0);
    }

    #[test]
    fn test_inherited_direction_flows_down() {
        let mut tree = LayoutTree::new();
        let root = row(&mut tree, 100.0, 10.0);
        tree.set_direction(root, Direction::Rtl).unwrap();
        let child = sized(&mut tree, 10.0, 10.0);
        tree.add_child(root, child).unwrap();
        tree.calculate_layout(root, &mut LayoutContext::new()).unwrap();
        assert_eq!(tree.layout_direction(root), Direction::Rtl);
        assert_eq!(tree.layout_direction(child), Direction::Rtl);
        assert_eq!(tree.layout_x(child), 90.0);
    }
}
