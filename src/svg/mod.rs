//! # SVG Writer
//!
//! Serializes a laid-out [`RenderTree`] into a standalone SVG document.
//! The writer reads resolved geometry only; it never asks the layout tree
//! to lay anything out again.
//!
//! Positions in the layout tree are relative to the parent, so the walk
//! carries the parent's absolute offset down. Element markup is written
//! through `quick-xml`, which escapes text and attribute values.
//!
//! Per element, in paint order:
//! - a background `<rect>` when a background colour is set
//! - the content: `<image>` or a `<text>` with one `<tspan>` per line
//! - the border, as a stroked `<rect>` or one filled strip per side
//! - the children
//! - a debug outline when requested
//!
//! Opacity below 1 wraps all of the above in `<g opacity>`.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::KanshaError;
use crate::layout::value::floats_equal;
use crate::layout::{Direction, FlexDirection, LayoutStyle, NodeId};
use crate::model::{RenderNode, RenderNodeKind, RenderTree};
use crate::style::{Color, ResolvedStyle};
use crate::text::{TextLayout, TextMetrics};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const DEBUG_BOX_COLOR: &str = "#ff5757";
const DEBUG_TEXT_COLOR: &str = "#575eff";

/// Write `tree` as an SVG document. `tree` must already be laid out.
pub fn write_svg(tree: &RenderTree) -> Result<String, KanshaError> {
    let mut svg = SvgWriter::new(tree);
    svg.write_document()?;
    svg.finish()
}

/// An absolute box on the canvas.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

struct SvgWriter<'a> {
    tree: &'a RenderTree,
    writer: Writer<Vec<u8>>,
}

impl<'a> SvgWriter<'a> {
    fn new(tree: &'a RenderTree) -> Self {
        Self {
            tree,
            writer: Writer::new(Vec::new()),
        }
    }

    fn finish(self) -> Result<String, KanshaError> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| KanshaError::SvgError(format!("output is not UTF-8: {}", e)))
    }

    fn write_document(&mut self) -> Result<(), KanshaError> {
        let width = num(self.tree.width().round());
        let height = num(self.tree.height().round());
        let view_box = format!("0 0 {} {}", width, height);

        let mut root = BytesStart::new("svg");
        root.push_attribute(("xmlns", SVG_NS));
        root.push_attribute(("width", width.as_str()));
        root.push_attribute(("height", height.as_str()));
        root.push_attribute(("viewBox", view_box.as_str()));
        self.emit(Event::Start(root))?;

        let tree = self.tree;
        let origin = (tree.layout.layout_x(tree.canvas), tree.layout.layout_y(tree.canvas));
        self.write_element(&tree.root, origin)?;

        self.emit(Event::End(BytesEnd::new("svg")))
    }

    fn write_element(
        &mut self,
        element: &RenderNode,
        parent: (f64, f64),
    ) -> Result<(), KanshaError> {
        let layout = &self.tree.layout;
        let debug = self.tree.debug;
        let frame = Frame {
            x: parent.0 + layout.layout_x(element.node),
            y: parent.1 + layout.layout_y(element.node),
            width: layout.layout_width(element.node),
            height: layout.layout_height(element.node),
        };
        let style = &element.style;

        let grouped = style.opacity < 1.0;
        if grouped {
            let mut group = BytesStart::new("g");
            group.push_attribute(("opacity", num(style.opacity).as_str()));
            self.emit(Event::Start(group))?;
        }

        if let Some(background) = style.background_color.filter(|c| !c.is_transparent()) {
            let mut rect = rect(frame.x, frame.y, frame.width, frame.height);
            push_fill(&mut rect, "fill", background);
            self.emit(Event::Empty(rect))?;
        }

        let content = self.content_box(element.node, frame);
        match &element.kind {
            RenderNodeKind::View => {}
            RenderNodeKind::Text { content: text } => self.write_text(text, style, content)?,
            RenderNodeKind::Image { image } => {
                if let Some(image) = image {
                    let mut tag = BytesStart::new("image");
                    push_geometry(&mut tag, content);
                    tag.push_attribute(("preserveAspectRatio", "none"));
                    tag.push_attribute(("href", image.to_data_uri().as_str()));
                    self.emit(Event::Empty(tag))?;
                }
            }
        }

        self.write_border(element.node, style, frame)?;

        for child in &element.children {
            self.write_element(child, (frame.x, frame.y))?;
        }

        if debug {
            let (color, fill) = match element.kind {
                RenderNodeKind::Text { .. } => (DEBUG_TEXT_COLOR, "none"),
                _ => (DEBUG_BOX_COLOR, "transparent"),
            };
            let mut outline = rect(frame.x, frame.y, frame.width, frame.height);
            outline.push_attribute(("fill", fill));
            outline.push_attribute(("stroke", color));
            outline.push_attribute(("stroke-width", "1"));
            self.emit(Event::Empty(outline))?;
        }

        if grouped {
            self.emit(Event::End(BytesEnd::new("g")))?;
        }
        Ok(())
    }

    fn write_text(
        &mut self,
        text: &str,
        style: &ResolvedStyle,
        content: Frame,
    ) -> Result<(), KanshaError> {
        let metrics = TextMetrics::new(style.font_size, style.line_height);
        let lines = TextLayout::new(metrics).break_into_lines(text, content.width);

        let mut tag = BytesStart::new("text");
        tag.push_attribute(("font-family", style.font_family.as_str()));
        tag.push_attribute(("font-size", num(style.font_size).as_str()));
        tag.push_attribute(("dominant-baseline", "hanging"));
        push_fill(&mut tag, "fill", style.color);
        self.emit(Event::Start(tag))?;

        for (i, line) in lines.iter().enumerate() {
            let mut span = BytesStart::new("tspan");
            span.push_attribute(("x", num(content.x).as_str()));
            span.push_attribute(("y", num(content.y + i as f64 * metrics.line_box()).as_str()));
            self.emit(Event::Start(span))?;
            self.emit(Event::Text(BytesText::new(&line.text)))?;
            self.emit(Event::End(BytesEnd::new("tspan")))?;
        }

        self.emit(Event::End(BytesEnd::new("text")))
    }

    /// A uniform border is one stroked rect inset by half the stroke so it
    /// stays inside the box; uneven borders are drawn side by side as
    /// filled strips.
    fn write_border(
        &mut self,
        node: NodeId,
        style: &ResolvedStyle,
        frame: Frame,
    ) -> Result<(), KanshaError> {
        let [left, top, right, bottom] = self.border_widths(node);
        if left <= 0.0 && top <= 0.0 && right <= 0.0 && bottom <= 0.0 {
            return Ok(());
        }
        if style.border_color.is_transparent() {
            return Ok(());
        }

        let uniform =
            floats_equal(left, top) && floats_equal(left, right) && floats_equal(left, bottom);
        if uniform {
            let half = left / 2.0;
            let mut tag = rect(
                frame.x + half,
                frame.y + half,
                (frame.width - left).max(0.0),
                (frame.height - left).max(0.0),
            );
            tag.push_attribute(("fill", "none"));
            push_fill(&mut tag, "stroke", style.border_color);
            tag.push_attribute(("stroke-width", num(left).as_str()));
            return self.emit(Event::Empty(tag));
        }

        let strips = [
            (frame.x, frame.y, left, frame.height),
            (frame.x, frame.y, frame.width, top),
            (frame.x + frame.width - right, frame.y, right, frame.height),
            (frame.x, frame.y + frame.height - bottom, frame.width, bottom),
        ];
        for (x, y, w, h) in strips {
            if w > 0.0 && h > 0.0 {
                let mut tag = rect(x, y, w, h);
                push_fill(&mut tag, "fill", style.border_color);
                self.emit(Event::Empty(tag))?;
            }
        }
        Ok(())
    }

    /// Physical left/top/right/bottom border widths, with start/end
    /// resolved for the node's direction.
    fn border_widths(&self, node: NodeId) -> [f64; 4] {
        let style = self.tree.layout.style(node);
        let row = FlexDirection::Row.resolve(self.tree.layout.layout_direction(node));
        let (left, right) = physical_pair(row, |axis, leading| {
            if leading {
                style.leading_border(axis)
            } else {
                style.trailing_border(axis)
            }
        });
        [
            left,
            style.leading_border(FlexDirection::Column),
            right,
            style.trailing_border(FlexDirection::Column),
        ]
    }

    /// The frame shrunk by padding and border.
    fn content_box(&self, node: NodeId, frame: Frame) -> Frame {
        let style: &LayoutStyle = self.tree.layout.style(node);
        let direction: Direction = self.tree.layout.layout_direction(node);
        let row = FlexDirection::Row.resolve(direction);
        let (left, right) = physical_pair(row, |axis, leading| {
            if leading {
                style.leading_padding_and_border(axis)
            } else {
                style.trailing_padding_and_border(axis)
            }
        });
        let top = style.leading_padding_and_border(FlexDirection::Column);
        let bottom = style.trailing_padding_and_border(FlexDirection::Column);
        Frame {
            x: frame.x + left,
            y: frame.y + top,
            width: (frame.width - left - right).max(0.0),
            height: (frame.height - top - bottom).max(0.0),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), KanshaError> {
        self.writer
            .write_event(event)
            .map_err(|e| KanshaError::SvgError(e.to_string()))
    }
}

/// Resolve a leading/trailing reader to physical (left, right) for a row
/// axis that may be reversed by RTL.
fn physical_pair(row: FlexDirection, read: impl Fn(FlexDirection, bool) -> f64) -> (f64, f64) {
    if row.is_reverse() {
        (read(row, false), read(row, true))
    } else {
        (read(row, true), read(row, false))
    }
}

fn rect(x: f64, y: f64, width: f64, height: f64) -> BytesStart<'static> {
    let mut tag = BytesStart::new("rect");
    push_geometry(
        &mut tag,
        Frame {
            x,
            y,
            width,
            height,
        },
    );
    tag
}

fn push_geometry(tag: &mut BytesStart<'_>, frame: Frame) {
    tag.push_attribute(("x", num(frame.x).as_str()));
    tag.push_attribute(("y", num(frame.y).as_str()));
    tag.push_attribute(("width", num(frame.width).as_str()));
    tag.push_attribute(("height", num(frame.height).as_str()));
}

/// `fill`/`stroke` plus the matching `-opacity` for translucent colours.
fn push_fill(tag: &mut BytesStart<'_>, attr: &str, color: Color) {
    tag.push_attribute((attr, color.to_hex().as_str()));
    if color.a < 1.0 {
        let opacity_attr = format!("{}-opacity", attr);
        tag.push_attribute((opacity_attr.as_str(), num(color.a).as_str()));
    }
}

/// Format a coordinate with at most two decimals and no trailing zeros.
fn num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let s = format!("{:.2}", rounded);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
