//! # Layout Style
//!
//! The per-node style record consumed by the layout engine, plus the small
//! enums it is built from. Every numeric field starts undefined.

use serde::{Deserialize, Serialize};

use super::spacing::{Edge, Spacing};
use super::value::{bound, is_defined, UNDEFINED};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Inherit,
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlexDirection {
    #[default]
    Column,
    ColumnReverse,
    Row,
    RowReverse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Justify {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    #[default]
    Auto,
    FlexStart,
    Center,
    FlexEnd,
    Stretch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionType {
    #[default]
    Relative,
    Absolute,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wrap {
    #[default]
    NoWrap,
    Wrap,
}

/// Index into a node's two dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Width = 0,
    Height = 1,
}

impl Dimension {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl FlexDirection {
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }

    pub fn is_column(self) -> bool {
        !self.is_row()
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }

    /// The physical edge children start from along this axis.
    pub fn leading(self) -> Edge {
        match self {
            FlexDirection::Column => Edge::Top,
            FlexDirection::ColumnReverse => Edge::Bottom,
            FlexDirection::Row => Edge::Left,
            FlexDirection::RowReverse => Edge::Right,
        }
    }

    pub fn trailing(self) -> Edge {
        match self {
            FlexDirection::Column => Edge::Bottom,
            FlexDirection::ColumnReverse => Edge::Top,
            FlexDirection::Row => Edge::Right,
            FlexDirection::RowReverse => Edge::Left,
        }
    }

    /// The spacing slot tried before [`leading`](Self::leading). Rows use the
    /// direction-aware `Start` slot.
    pub fn leading_spacing(self) -> Edge {
        match self {
            FlexDirection::Column => Edge::Top,
            FlexDirection::ColumnReverse => Edge::Bottom,
            FlexDirection::Row | FlexDirection::RowReverse => Edge::Start,
        }
    }

    pub fn trailing_spacing(self) -> Edge {
        match self {
            FlexDirection::Column => Edge::Bottom,
            FlexDirection::ColumnReverse => Edge::Top,
            FlexDirection::Row | FlexDirection::RowReverse => Edge::End,
        }
    }

    pub fn dimension(self) -> Dimension {
        if self.is_row() {
            Dimension::Width
        } else {
            Dimension::Height
        }
    }

    /// Flip row axes under RTL.
    pub fn resolve(self, direction: Direction) -> FlexDirection {
        if direction == Direction::Rtl {
            match self {
                FlexDirection::Row => return FlexDirection::RowReverse,
                FlexDirection::RowReverse => return FlexDirection::Row,
                _ => {}
            }
        }
        self
    }

    /// The perpendicular axis, itself resolved for `direction`.
    pub fn cross(self, direction: Direction) -> FlexDirection {
        if self.is_column() {
            FlexDirection::Row.resolve(direction)
        } else {
            FlexDirection::Column
        }
    }
}

/// The style record of a layout node.
#[derive(Debug, Clone)]
pub struct LayoutStyle {
    pub direction: Direction,
    pub flex_direction: FlexDirection,
    pub justify_content: Justify,
    pub align_content: Align,
    pub align_items: Align,
    pub align_self: Align,
    pub position_type: PositionType,
    pub flex_wrap: Wrap,
    pub flex: f64,

    pub margin: Spacing,
    pub padding: Spacing,
    pub border: Spacing,

    /// Left/top/right/bottom offsets, indexed by [`Edge::index`].
    pub position: [f64; 4],
    /// Width/height, indexed by [`Dimension::index`].
    pub dimensions: [f64; 2],

    pub min_width: f64,
    pub min_height: f64,
    pub max_width: f64,
    pub max_height: f64,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            direction: Direction::Inherit,
            flex_direction: FlexDirection::Column,
            justify_content: Justify::FlexStart,
            align_content: Align::FlexStart,
            align_items: Align::Stretch,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            flex_wrap: Wrap::NoWrap,
            flex: 0.0,
            margin: Spacing::new(),
            padding: Spacing::new(),
            border: Spacing::new(),
            position: [UNDEFINED; 4],
            dimensions: [UNDEFINED; 2],
            min_width: UNDEFINED,
            min_height: UNDEFINED,
            max_width: UNDEFINED,
            max_height: UNDEFINED,
        }
    }
}

impl LayoutStyle {
    pub fn leading_margin(&self, axis: FlexDirection) -> f64 {
        self.margin
            .get_with_fallback(axis.leading_spacing(), axis.leading())
    }

    pub fn trailing_margin(&self, axis: FlexDirection) -> f64 {
        self.margin
            .get_with_fallback(axis.trailing_spacing(), axis.trailing())
    }

    pub fn margin_axis(&self, axis: FlexDirection) -> f64 {
        self.leading_margin(axis) + self.trailing_margin(axis)
    }

    pub fn leading_border(&self, axis: FlexDirection) -> f64 {
        self.border
            .get_with_fallback(axis.leading_spacing(), axis.leading())
    }

    pub fn trailing_border(&self, axis: FlexDirection) -> f64 {
        self.border
            .get_with_fallback(axis.trailing_spacing(), axis.trailing())
    }

    pub fn leading_padding_and_border(&self, axis: FlexDirection) -> f64 {
        self.padding
            .get_with_fallback(axis.leading_spacing(), axis.leading())
            + self.leading_border(axis)
    }

    pub fn trailing_padding_and_border(&self, axis: FlexDirection) -> f64 {
        self.padding
            .get_with_fallback(axis.trailing_spacing(), axis.trailing())
            + self.trailing_border(axis)
    }

    pub fn padding_and_border_axis(&self, axis: FlexDirection) -> f64 {
        self.leading_padding_and_border(axis) + self.trailing_padding_and_border(axis)
    }

    /// The explicit width or height along `axis`, if it is set and non-negative.
    pub fn dimension(&self, axis: FlexDirection) -> Option<f64> {
        let value = self.dimensions[axis.dimension().index()];
        if is_defined(value) && value >= 0.0 {
            Some(value)
        } else {
            None
        }
    }

    pub fn is_dimension_defined(&self, axis: FlexDirection) -> bool {
        self.dimension(axis).is_some()
    }

    pub fn offset(&self, edge: Edge) -> f64 {
        self.position[edge.index()]
    }

    pub fn is_offset_defined(&self, edge: Edge) -> bool {
        is_defined(self.position[edge.index()])
    }

    /// Relative shift along `axis`: the leading offset, else the negated
    /// trailing offset, else 0.
    pub fn relative_position(&self, axis: FlexDirection) -> f64 {
        let lead = self.offset(axis.leading());
        if is_defined(lead) {
            return lead;
        }
        let trail = self.offset(axis.trailing());
        if is_defined(trail) {
            -trail
        } else {
            0.0
        }
    }

    /// Clamp `value` to the min/max constraints of `axis`. Negative or
    /// undefined bounds are ignored.
    pub fn bound_axis(&self, axis: FlexDirection, value: f64) -> f64 {
        let (min, max) = self.bounds(axis);
        bound(value, min, max)
    }

    /// The `(min, max)` pair for `axis`.
    pub fn bounds(&self, axis: FlexDirection) -> (f64, f64) {
        if axis.is_column() {
            (self.min_height, self.max_height)
        } else {
            (self.min_width, self.max_width)
        }
    }

    pub fn is_flexible(&self) -> bool {
        self.position_type == PositionType::Relative && self.flex > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rtl_flips_rows_only() {
        assert_eq!(
            FlexDirection::Row.resolve(Direction::Rtl),
            FlexDirection::RowReverse
        );
        assert_eq!(
            FlexDirection::RowReverse.resolve(Direction::Rtl),
            FlexDirection::Row
        );
        assert_eq!(
            FlexDirection::Column.resolve(Direction::Rtl),
            FlexDirection::Column
        );
        assert_eq!(FlexDirection::Row.resolve(Direction::Ltr), FlexDirection::Row);
    }

    #[test]
    fn cross_axis_is_perpendicular() {
        assert_eq!(
            FlexDirection::Column.cross(Direction::Ltr),
            FlexDirection::Row
        );
        assert_eq!(
            FlexDirection::Column.cross(Direction::Rtl),
            FlexDirection::RowReverse
        );
        assert_eq!(
            FlexDirection::RowReverse.cross(Direction::Rtl),
            FlexDirection::Column
        );
    }

    #[test]
    fn bound_axis_applies_min_then_max() {
        let mut style = LayoutStyle::default();
        style.max_width = 50.0;
        style.min_width = 10.0;
        assert_eq!(style.bound_axis(FlexDirection::Row, 80.0), 50.0);
        assert_eq!(style.bound_axis(FlexDirection::Row, 5.0), 10.0);
        assert_eq!(style.bound_axis(FlexDirection::Column, 80.0), 80.0);

        // min wins when the bounds conflict
        style.min_width = 60.0;
        assert_eq!(style.bound_axis(FlexDirection::Row, 80.0), 60.0);
    }

    #[test]
    fn row_margins_prefer_start_over_left() {
        let mut style = LayoutStyle::default();
        style.margin.set(Edge::Left, 3.0);
        assert_eq!(style.leading_margin(FlexDirection::Row), 3.0);
        style.margin.set(Edge::Start, 7.0);
        assert_eq!(style.leading_margin(FlexDirection::Row), 7.0);
        // In RTL the resolved row is reversed; start still leads.
        assert_eq!(style.leading_margin(FlexDirection::RowReverse), 7.0);
        assert_eq!(style.trailing_margin(FlexDirection::RowReverse), 3.0);
    }

    #[test]
    fn relative_position_prefers_leading() {
        let mut style = LayoutStyle::default();
        assert_eq!(style.relative_position(FlexDirection::Row), 0.0);
        style.position[Edge::Right.index()] = 4.0;
        assert_eq!(style.relative_position(FlexDirection::Row), -4.0);
        style.position[Edge::Left.index()] = 2.0;
        assert_eq!(style.relative_position(FlexDirection::Row), 2.0);
    }

    #[test]
    fn zero_dimension_is_explicit() {
        let mut style = LayoutStyle::default();
        assert!(!style.is_dimension_defined(FlexDirection::Row));
        style.dimensions[Dimension::Width.index()] = 0.0;
        assert_eq!(style.dimension(FlexDirection::Row), Some(0.0));
        style.dimensions[Dimension::Width.index()] = -1.0;
        assert!(!style.is_dimension_defined(FlexDirection::Row));
    }
}
