//! Structured error types for the Kansha renderer.
//!
//! [`LayoutError`] covers misuse of the layout tree and failures reported by
//! measurement callbacks. [`KanshaError`] is what the public render
//! functions return.

use thiserror::Error;

/// Boxed error returned by a measurement callback.
pub type MeasureError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum LayoutError {
    /// The child is already attached somewhere else.
    #[error("child already has a parent, it must be removed first")]
    AlreadyHasParent,
    /// Reset was requested for a node that is still part of a tree.
    #[error("cannot reset a node that has a parent or children")]
    NodeAttached,
    /// A node was mutated while holding a layout nobody acknowledged.
    #[error("previous layout was ignored: mark_layout_seen() never called")]
    LayoutNotSeen,
    /// `mark_layout_seen` without a fresh layout.
    #[error("expected node to have a new layout to be seen")]
    NoNewLayout,
    /// Offsets only exist for left/top/right/bottom.
    #[error("{0:?} is not a physical edge")]
    NotPhysicalEdge(crate::layout::Edge),
    /// The child is the parent itself or one of its ancestors.
    #[error("adding this child would create a cycle")]
    WouldCreateCycle,
    #[error("child index {index} out of bounds for node with {count} children")]
    ChildIndexOutOfBounds { index: usize, count: usize },
    /// The measurement callback failed. Passed through untouched.
    #[error("measure function failed: {0}")]
    Measure(#[source] MeasureError),
}

/// The unified error type returned by the public rendering API.
#[derive(Debug, Error)]
pub enum KanshaError {
    /// JSON input failed to parse as a valid document.
    #[error("Failed to parse document: {source}{}", format_hint(.hint))]
    ParseError {
        source: serde_json::Error,
        hint: String,
    },
    /// The document tree cannot be laid out as given.
    #[error("Render error: {0}")]
    RenderError(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// Writing SVG markup failed.
    #[error("SVG error: {0}")]
    SvgError(String),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for KanshaError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the document schema. Check element types and style names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        KanshaError::ParseError { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_carry_hints() {
        let err: KanshaError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let message = err.to_string();
        assert!(message.starts_with("Failed to parse document"));
        assert!(message.contains("Hint: Check for trailing commas"));
    }

    #[test]
    fn eof_hint() {
        let err: KanshaError = serde_json::from_str::<serde_json::Value>("{\"a\":")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn layout_errors_convert() {
        let err: KanshaError = LayoutError::AlreadyHasParent.into();
        assert!(matches!(err, KanshaError::Layout(LayoutError::AlreadyHasParent)));
        assert_eq!(
            err.to_string(),
            "child already has a parent, it must be removed first"
        );
    }
}
