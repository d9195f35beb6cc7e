//! Structured error types for the layout engine.
//!
//! Structural errors (an inline node where a block belongs, a list item
//! outside a list) abort the render. Degenerate geometry never does: a
//! negative-width box is drawn wrong, not reported.

use crate::image_loader::ImageError;
use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum RenderError {
    /// JSON input failed to parse as a valid document.
    #[error("Failed to parse document: {source}{}", format_hint(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// An inline node appeared among the children of a block that stacks
    /// blocks.
    #[error("Inline node {child} cannot appear among the block children of {parent}")]
    InlineInBlockContext {
        parent: &'static str,
        child: &'static str,
    },

    /// A block node appeared inside inline content.
    #[error("Block node {child} cannot appear inside inline content of {parent}")]
    BlockInInlineContext {
        parent: &'static str,
        child: &'static str,
    },

    /// A node whose layout depends on its parent appeared elsewhere.
    #[error("{node} must be a child of {expected}, found under {parent}")]
    MisplacedNode {
        node: &'static str,
        expected: &'static str,
        parent: &'static str,
    },

    /// An inline kind with no layout rule.
    #[error("Unsupported inline node: {tag}")]
    UnsupportedInline { tag: String },

    /// The image loader failed and its policy is to propagate.
    #[error("Failed to load image '{src}': {source}")]
    Image {
        src: String,
        #[source]
        source: ImageError,
    },

    /// A custom font could not be decoded or parsed.
    #[error("Font error: {0}")]
    Font(String),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the document schema. Check node types and field names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        RenderError::Parse { source: e, hint }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_hint() {
        let err: RenderError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse document"));
        assert!(msg.contains("trailing commas"));
    }

    #[test]
    fn test_eof_hint() {
        let err: RenderError = serde_json::from_str::<serde_json::Value>("{\"a\": ")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_misplaced_node_message() {
        let err = RenderError::MisplacedNode {
            node: "ListItem",
            expected: "List",
            parent: "Document",
        };
        assert_eq!(
            err.to_string(),
            "ListItem must be a child of List, found under Document"
        );
    }
}
