//! # Text Layout
//!
//! Line breaking and text measurement with approximate metrics. There is no
//! font loading here: every character advances a fixed fraction of the font
//! size, and full-width (CJK) characters advance a full em. That is enough
//! to size text boxes deterministically; the SVG viewer does the real
//! shaping.
//!
//! Breaking is greedy over the UAX#14 break opportunities: after spaces
//! and hyphens, around ideographs, never at a no-break space. Mandatory
//! breaks (`\n`) always start a new line. A word wider than the line
//! overflows on a line of its own.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::layout::value::is_undefined;

/// Advance of a regular character, as a fraction of the font size.
pub const NARROW_ADVANCE: f64 = 0.6;
/// Advance of a full-width character, as a fraction of the font size.
pub const WIDE_ADVANCE: f64 = 1.0;

const FIT_TOLERANCE: f64 = 0.0001;

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    pub text: String,
    /// Total advance of the line, trailing spaces excluded.
    pub width: f64,
}

/// Font size and line height of a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub font_size: f64,
    /// Multiplier applied to `font_size`.
    pub line_height: f64,
}

impl TextMetrics {
    pub fn new(font_size: f64, line_height: f64) -> Self {
        Self {
            font_size,
            line_height,
        }
    }

    pub fn char_width(&self, ch: char) -> f64 {
        if is_wide(ch) {
            self.font_size * WIDE_ADVANCE
        } else {
            self.font_size * NARROW_ADVANCE
        }
    }

    pub fn measure_width(&self, text: &str) -> f64 {
        text.chars().map(|ch| self.char_width(ch)).sum()
    }

    /// Height of a single line.
    pub fn line_box(&self) -> f64 {
        self.font_size * self.line_height
    }
}

/// Full-width characters: CJK ideographs, kana, hangul and full-width forms.
pub fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x2FFFD
        | 0x30000..=0x3FFFD)
}

/// Spaces that collapse between words. No-break spaces are part of the
/// word they glue together.
fn is_collapsible(ch: char) -> bool {
    ch.is_whitespace() && !matches!(ch, '\u{00A0}' | '\u{2007}' | '\u{202F}')
}

pub struct TextLayout {
    metrics: TextMetrics,
}

impl TextLayout {
    pub fn new(metrics: TextMetrics) -> Self {
        Self { metrics }
    }

    /// Break `text` into lines that fit within `max_width`. Break points
    /// come from UAX#14; an undefined width only breaks where a break is
    /// mandatory.
    pub fn break_into_lines(&self, text: &str, max_width: f64) -> Vec<BrokenLine> {
        let space = self.metrics.char_width(' ');
        let mut lines = Vec::new();
        let mut line = String::new();
        let mut line_width = 0.0;
        let mut pending_space = false;
        let mut start = 0;

        // linebreaks() yields the offset just past each break opportunity
        for (end, opportunity) in linebreaks(text) {
            let segment = &text[start..end];
            start = end;

            let word = segment.trim_matches(is_collapsible);
            if !word.is_empty() {
                let space_before = pending_space || segment.starts_with(is_collapsible);
                let gap = if space_before && !line.is_empty() {
                    space
                } else {
                    0.0
                };
                let word_width = self.metrics.measure_width(word);
                let fits = is_undefined(max_width)
                    || line_width + gap + word_width <= max_width + FIT_TOLERANCE;

                if !line.is_empty() && !fits {
                    lines.push(BrokenLine {
                        text: std::mem::take(&mut line),
                        width: line_width,
                    });
                    line_width = 0.0;
                } else if gap > 0.0 {
                    line.push(' ');
                    line_width += gap;
                }
                line.push_str(word);
                line_width += word_width;
                pending_space = false;
            }
            if segment.ends_with(is_collapsible) {
                pending_space = true;
            }

            if matches!(opportunity, BreakOpportunity::Mandatory) && end < text.len() {
                lines.push(BrokenLine {
                    text: std::mem::take(&mut line),
                    width: line_width,
                });
                line_width = 0.0;
                pending_space = false;
            }
        }

        lines.push(BrokenLine {
            text: line,
            width: line_width,
        });
        lines
    }

    /// Width and height of `text` laid out within `max_width`.
    pub fn measure(&self, text: &str, max_width: f64) -> (f64, f64) {
        let lines = self.break_into_lines(text, max_width);
        let width = lines.iter().map(|l| l.width).fold(0.0, f64::max);
        (width, lines.len() as f64 * self.metrics.line_box())
    }
}
