//! # Element Style
//!
//! The CSS-like style attached to document elements. Everything here is
//! optional: layout properties that are absent stay undefined in the layout
//! tree, and the typographic properties inherit from the parent element.
//!
//! The flexbox enums are shared with the layout engine so a document's
//! `"flexDirection": "Row"` lands in the tree without translation.

use serde::{Deserialize, Serialize};

use crate::layout::{
    Align, Direction, Edge, FlexDirection, Justify, LayoutStyle, PositionType, Spacing, Wrap,
};

/// Font family used when no element in the chain names one.
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
/// Line height as a multiple of the font size.
pub const DEFAULT_LINE_HEIGHT: f64 = 1.2;

/// The complete set of style properties for an element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    // ── Box Model ──────────────────────────────────────────────
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,

    /// Margin outside the border.
    pub margin: Option<SpacingValue>,
    /// Padding inside the border.
    pub padding: Option<SpacingValue>,
    pub border_width: Option<SpacingValue>,

    // ── Flexbox Layout ─────────────────────────────────────────
    pub flex: Option<f64>,
    pub flex_direction: Option<FlexDirection>,
    pub flex_wrap: Option<Wrap>,
    pub justify_content: Option<Justify>,
    pub align_items: Option<Align>,
    /// Override align-items for this specific child.
    pub align_self: Option<Align>,
    pub align_content: Option<Align>,
    pub direction: Option<Direction>,

    // ── Positioning ────────────────────────────────────────────
    pub position: Option<PositionType>,
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,

    // ── Color & Background ─────────────────────────────────────
    pub border_color: Option<Color>,
    pub background_color: Option<Color>,
    /// Text color.
    pub color: Option<Color>,
    /// Opacity (0.0 - 1.0).
    pub opacity: Option<f64>,

    // ── Typography ─────────────────────────────────────────────
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub line_height: Option<f64>,
}

/// A margin, padding or border block: either one number for every edge or
/// an object naming individual edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpacingValue {
    Uniform(f64),
    Edges(SpacingEdges),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingEdges {
    pub all: Option<f64>,
    pub horizontal: Option<f64>,
    pub vertical: Option<f64>,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl SpacingValue {
    pub fn uniform(value: f64) -> Self {
        SpacingValue::Uniform(value)
    }

    /// Write the set edges into a layout spacing block. The block keeps its
    /// own fallback chain, so `{"all": 4, "left": 9}` resolves the way it
    /// reads.
    pub fn apply_to(&self, spacing: &mut Spacing) {
        match self {
            SpacingValue::Uniform(value) => {
                spacing.set(Edge::All, *value);
            }
            SpacingValue::Edges(edges) => {
                let slots = [
                    (Edge::All, edges.all),
                    (Edge::Horizontal, edges.horizontal),
                    (Edge::Vertical, edges.vertical),
                    (Edge::Left, edges.left),
                    (Edge::Top, edges.top),
                    (Edge::Right, edges.right),
                    (Edge::Bottom, edges.bottom),
                    (Edge::Start, edges.start),
                    (Edge::End, edges.end),
                ];
                for (edge, value) in slots {
                    if let Some(value) = value {
                        spacing.set(edge, value);
                    }
                }
            }
        }
    }
}

/// An RGBA color with channels in `0.0..=1.0`.
///
/// Parsed from `#rgb`, `#rrggbb`, `#rrggbbaa` or `transparent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn hex(hex: &str) -> Result<Self, String> {
        if hex.eq_ignore_ascii_case("transparent") {
            return Ok(Color::TRANSPARENT);
        }
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| format!("Invalid color '{}': expected '#' prefix", hex))?;
        if !digits.is_ascii() {
            return Err(format!("Invalid color '{}'", hex));
        }
        let channel = |s: &str| {
            u8::from_str_radix(s, 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|_| format!("Invalid color '{}'", hex))
        };
        match digits.len() {
            3 => Ok(Self::rgb(
                channel(&digits[0..1].repeat(2))?,
                channel(&digits[1..2].repeat(2))?,
                channel(&digits[2..3].repeat(2))?,
            )),
            6 | 8 => Ok(Self {
                r: channel(&digits[0..2])?,
                g: channel(&digits[2..4])?,
                b: channel(&digits[4..6])?,
                a: if digits.len() == 8 {
                    channel(&digits[6..8])?
                } else {
                    1.0
                },
            }),
            _ => Err(format!(
                "Invalid color '{}': expected #rgb, #rrggbb or #rrggbbaa",
                hex
            )),
        }
    }

    /// `#rrggbb`, alpha dropped.
    pub fn to_hex(&self) -> String {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::hex(value.trim())
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        if color.is_transparent() {
            return "transparent".to_string();
        }
        let hex = color.to_hex();
        if color.a < 1.0 {
            format!("{}{:02x}", hex, (color.a * 255.0).round() as u8)
        } else {
            hex
        }
    }
}

/// The visual properties of an element after inheritance. Layout properties
/// are not here; they go straight into the layout tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub font_family: String,
    pub font_size: f64,
    pub line_height: f64,
    pub color: Color,
    pub background_color: Option<Color>,
    pub border_color: Color,
    pub opacity: f64,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Style::default().resolve(None)
    }
}

impl Style {
    /// Resolve visual properties against the parent's resolved style.
    /// Font family, size, line height and text color inherit; the rest
    /// does not.
    pub fn resolve(&self, parent: Option<&ResolvedStyle>) -> ResolvedStyle {
        ResolvedStyle {
            font_family: self
                .font_family
                .clone()
                .or_else(|| parent.map(|p| p.font_family.clone()))
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
            font_size: self
                .font_size
                .unwrap_or(parent.map(|p| p.font_size).unwrap_or(DEFAULT_FONT_SIZE)),
            line_height: self
                .line_height
                .unwrap_or(parent.map(|p| p.line_height).unwrap_or(DEFAULT_LINE_HEIGHT)),
            color: self
                .color
                .unwrap_or(parent.map(|p| p.color).unwrap_or(Color::BLACK)),
            background_color: self.background_color,
            border_color: self.border_color.unwrap_or(Color::BLACK),
            opacity: self.opacity.unwrap_or(1.0).clamp(0.0, 1.0),
        }
    }

    /// Build the layout-engine style for this element. Anything not set
    /// keeps the engine default.
    pub fn to_layout_style(&self) -> LayoutStyle {
        let mut layout = LayoutStyle::default();

        if let Some(direction) = self.direction {
            layout.direction = direction;
        }
        if let Some(flex_direction) = self.flex_direction {
            layout.flex_direction = flex_direction;
        }
        if let Some(justify) = self.justify_content {
            layout.justify_content = justify;
        }
        if let Some(align) = self.align_items {
            layout.align_items = align;
        }
        if let Some(align) = self.align_self {
            layout.align_self = align;
        }
        if let Some(align) = self.align_content {
            layout.align_content = align;
        }
        if let Some(position) = self.position {
            layout.position_type = position;
        }
        if let Some(wrap) = self.flex_wrap {
            layout.flex_wrap = wrap;
        }
        if let Some(flex) = self.flex {
            layout.flex = flex;
        }

        if let Some(margin) = &self.margin {
            margin.apply_to(&mut layout.margin);
        }
        if let Some(padding) = &self.padding {
            padding.apply_to(&mut layout.padding);
        }
        if let Some(border) = &self.border_width {
            border.apply_to(&mut layout.border);
        }

        let offsets = [
            (Edge::Left, self.left),
            (Edge::Top, self.top),
            (Edge::Right, self.right),
            (Edge::Bottom, self.bottom),
        ];
        for (edge, value) in offsets {
            if let Some(value) = value {
                layout.position[edge.index()] = value;
            }
        }

        if let Some(width) = self.width {
            layout.dimensions[0] = width;
        }
        if let Some(height) = self.height {
            layout.dimensions[1] = height;
        }
        layout.min_width = self.min_width.unwrap_or(layout.min_width);
        layout.min_height = self.min_height.unwrap_or(layout.min_height);
        layout.max_width = self.max_width.unwrap_or(layout.max_width);
        layout.max_height = self.max_height.unwrap_or(layout.max_height);

        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::value::is_undefined;

    #[test]
    fn test_color_hex_forms() {
        let c = Color::hex("#f00").unwrap();
        assert_eq!(c, Color::rgb(1.0, 0.0, 0.0));

        let c = Color::hex("#00ff00").unwrap();
        assert_eq!(c.to_hex(), "#00ff00");
        assert_eq!(c.a, 1.0);

        let c = Color::hex("#0000ff80").unwrap();
        assert!((c.a - 128.0 / 255.0).abs() < 1e-9);

        assert!(Color::hex("transparent").unwrap().is_transparent());
    }

    #[test]
    fn test_color_rejects_garbage() {
        assert!(Color::hex("red").is_err());
        assert!(Color::hex("#12").is_err());
        assert!(Color::hex("#gggggg").is_err());
        assert!(Color::hex("#ééé").is_err());
    }

    #[test]
    fn test_color_serde() {
        let c: Color = serde_json::from_str("\"#336699\"").unwrap();
        assert_eq!(c.to_hex(), "#336699");
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#336699\"");
        assert!(serde_json::from_str::<Color>("\"#xyz\"").is_err());
    }

    #[test]
    fn test_style_deserializes_camel_case() {
        let json = r##"{
            "flexDirection": "Row",
            "justifyContent": "SpaceBetween",
            "alignSelf": "Center",
            "minWidth": 10,
            "backgroundColor": "#fff",
            "margin": 4,
            "padding": {"horizontal": 2, "top": 8}
        }"##;
        let style: Style = serde_json::from_str(json).unwrap();
        assert_eq!(style.flex_direction, Some(FlexDirection::Row));
        assert_eq!(style.justify_content, Some(Justify::SpaceBetween));
        assert_eq!(style.align_self, Some(Align::Center));
        assert_eq!(style.min_width, Some(10.0));
        assert_eq!(style.background_color, Some(Color::WHITE));
        assert_eq!(style.margin, Some(SpacingValue::Uniform(4.0)));
        assert!(matches!(style.padding, Some(SpacingValue::Edges(_))));
    }

    #[test]
    fn test_unknown_enum_value_is_an_error() {
        let result = serde_json::from_str::<Style>(r#"{"flexDirection": "Diagonal"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_spacing_object_keeps_fallback_chain() {
        let style: Style =
            serde_json::from_str(r#"{"padding": {"all": 4, "left": 9, "vertical": 1}}"#).unwrap();
        let layout = style.to_layout_style();
        assert_eq!(layout.padding.get(Edge::Left), 9.0);
        assert_eq!(layout.padding.get(Edge::Right), 4.0);
        assert_eq!(layout.padding.get(Edge::Top), 1.0);
        assert_eq!(layout.padding.get(Edge::Bottom), 1.0);
    }

    #[test]
    fn test_to_layout_style_leaves_unset_fields_undefined() {
        let layout = Style::default().to_layout_style();
        assert!(is_undefined(layout.dimensions[0]));
        assert!(is_undefined(layout.position[Edge::Left.index()]));
        assert_eq!(layout.flex_direction, FlexDirection::Column);
        assert_eq!(layout.align_items, Align::Stretch);
    }

    #[test]
    fn test_to_layout_style_maps_everything() {
        let style = Style {
            width: Some(120.0),
            height: Some(0.0),
            max_height: Some(50.0),
            flex: Some(2.0),
            position: Some(PositionType::Absolute),
            right: Some(5.0),
            direction: Some(Direction::Rtl),
            flex_wrap: Some(Wrap::Wrap),
            border_width: Some(SpacingValue::uniform(1.0)),
            ..Style::default()
        };
        let layout = style.to_layout_style();
        assert_eq!(layout.dimensions, [120.0, 0.0]);
        assert_eq!(layout.max_height, 50.0);
        assert_eq!(layout.flex, 2.0);
        assert_eq!(layout.position_type, PositionType::Absolute);
        assert_eq!(layout.position[Edge::Right.index()], 5.0);
        assert_eq!(layout.direction, Direction::Rtl);
        assert_eq!(layout.flex_wrap, Wrap::Wrap);
        assert_eq!(layout.border.get(Edge::Bottom), 1.0);
    }

    #[test]
    fn test_resolve_inherits_typography() {
        let parent = Style {
            font_family: Some("serif".to_string()),
            font_size: Some(20.0),
            color: Some(Color::WHITE),
            background_color: Some(Color::BLACK),
            opacity: Some(0.5),
            ..Style::default()
        }
        .resolve(None);

        let child = Style {
            line_height: Some(2.0),
            ..Style::default()
        }
        .resolve(Some(&parent));

        assert_eq!(child.font_family, "serif");
        assert_eq!(child.font_size, 20.0);
        assert_eq!(child.color, Color::WHITE);
        assert_eq!(child.line_height, 2.0);
        // not inherited
        assert_eq!(child.background_color, None);
        assert_eq!(child.opacity, 1.0);
    }

    #[test]
    fn test_resolve_defaults() {
        let resolved = ResolvedStyle::default();
        assert_eq!(resolved.font_family, DEFAULT_FONT_FAMILY);
        assert_eq!(resolved.font_size, DEFAULT_FONT_SIZE);
        assert_eq!(resolved.line_height, DEFAULT_LINE_HEIGHT);
        assert_eq!(resolved.opacity, 1.0);
    }
}
