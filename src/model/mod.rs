//! # Document Model
//!
//! The input representation for the layout engine: a tree of block and
//! inline nodes. Producing this tree (from Markdown, HTML, whatever) is the
//! caller's business; the engine only walks it.
//!
//! Block nodes stack vertically, inline nodes flow horizontally inside the
//! content box of their block. `NodeKind` is closed so every layout function
//! matches it exhaustively.

use crate::style::{Spacing, TextAlign};
use serde::{Deserialize, Serialize};

/// A complete document ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The root block node, usually of kind `Document`.
    pub root: Node,

    /// Page geometry used for every page of the output.
    #[serde(default)]
    pub page: PageConfig,

    /// Custom fonts to register before layout.
    #[serde(default)]
    pub fonts: Vec<FontEntry>,
}

/// A custom font to register with the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Font family name (e.g. "Inter", "Roboto").
    pub family: String,
    /// Base64-encoded font data, or a data URI (e.g. "data:font/ttf;base64,...").
    pub src: String,
    /// Font weight (100-900). Defaults to 400.
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Whether this is an italic variant.
    #[serde(default)]
    pub italic: bool,
}

fn default_weight() -> u32 {
    400
}

/// Configuration for a page: size and margins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageConfig {
    /// Page size. Defaults to A4.
    #[serde(default = "PageSize::default")]
    pub size: PageSize,

    /// Page margins in points (1/72 inch).
    #[serde(default)]
    pub margin: Spacing,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: Spacing::uniform(54.0), // ~0.75 inch
        }
    }
}

impl PageConfig {
    /// Usable vertical range `(top, bottom)` of every page.
    pub fn vertical_bounds(&self) -> (f64, f64) {
        let (_, height) = self.size.dimensions();
        (self.margin.top, height - self.margin.bottom)
    }

    /// Usable horizontal range `(left, right)` of every page.
    pub fn horizontal_bounds(&self) -> (f64, f64) {
        let (width, _) = self.size.dimensions();
        (self.margin.left, width - self.margin.right)
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// What kind of node this is.
    pub kind: NodeKind,

    /// Child nodes, in document order.
    #[serde(default)]
    pub children: Vec<Node>,
}

/// The different kinds of nodes in the document tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum NodeKind {
    // ── Block kinds ────────────────────────────────────────────
    /// The document root.
    Document,
    Paragraph,
    Heading {
        level: u8,
    },
    /// A run of inline content without paragraph spacing (tight list items).
    TextBlock,
    Blockquote,
    /// Preformatted text; each entry is one source line.
    CodeBlock {
        #[serde(default)]
        lines: Vec<String>,
    },
    ThematicBreak,
    List {
        #[serde(default)]
        ordered: bool,
        /// Number of the first item of an ordered list.
        #[serde(default = "default_start")]
        start: u32,
    },
    ListItem,
    Table {
        /// One entry per column.
        #[serde(default)]
        alignments: Vec<Option<TextAlign>>,
    },
    TableHeader,
    TableRow,
    TableCell {
        #[serde(default)]
        align: Option<TextAlign>,
    },
    /// A block the producer could not classify. Renders nothing.
    Unknown {
        tag: String,
    },

    // ── Inline kinds ───────────────────────────────────────────
    Text {
        content: String,
        /// An explicit line break follows this text.
        #[serde(default)]
        hard_break: bool,
        /// A source line ending follows this text; it flows as a space.
        #[serde(default)]
        soft_break: bool,
    },
    Emphasis {
        /// 1 for emphasis, 2 for strong emphasis.
        level: u8,
    },
    Link {
        destination: String,
    },
    AutoLink {
        url: String,
    },
    CodeSpan,
    Strikethrough,
    /// Children hold the alt text, shown when the image is unavailable.
    Image {
        src: String,
        #[serde(default)]
        title: Option<String>,
    },
    /// An inline the producer passed through unclassified.
    RawInline {
        tag: String,
    },
}

fn default_start() -> u32 {
    1
}

impl NodeKind {
    /// Whether nodes of this kind flow inside a block's content box.
    pub fn is_inline(&self) -> bool {
        match self {
            NodeKind::Text { .. }
            | NodeKind::Emphasis { .. }
            | NodeKind::Link { .. }
            | NodeKind::AutoLink { .. }
            | NodeKind::CodeSpan
            | NodeKind::Strikethrough
            | NodeKind::Image { .. }
            | NodeKind::RawInline { .. } => true,
            NodeKind::Document
            | NodeKind::Paragraph
            | NodeKind::Heading { .. }
            | NodeKind::TextBlock
            | NodeKind::Blockquote
            | NodeKind::CodeBlock { .. }
            | NodeKind::ThematicBreak
            | NodeKind::List { .. }
            | NodeKind::ListItem
            | NodeKind::Table { .. }
            | NodeKind::TableHeader
            | NodeKind::TableRow
            | NodeKind::TableCell { .. }
            | NodeKind::Unknown { .. } => false,
        }
    }

    pub fn is_block(&self) -> bool {
        !self.is_inline()
    }

    /// A human-readable name for error messages and logs.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::Paragraph => "Paragraph",
            NodeKind::Heading { .. } => "Heading",
            NodeKind::TextBlock => "TextBlock",
            NodeKind::Blockquote => "Blockquote",
            NodeKind::CodeBlock { .. } => "CodeBlock",
            NodeKind::ThematicBreak => "ThematicBreak",
            NodeKind::List { .. } => "List",
            NodeKind::ListItem => "ListItem",
            NodeKind::Table { .. } => "Table",
            NodeKind::TableHeader => "TableHeader",
            NodeKind::TableRow => "TableRow",
            NodeKind::TableCell { .. } => "TableCell",
            NodeKind::Unknown { .. } => "Unknown",
            NodeKind::Text { .. } => "Text",
            NodeKind::Emphasis { .. } => "Emphasis",
            NodeKind::Link { .. } => "Link",
            NodeKind::AutoLink { .. } => "AutoLink",
            NodeKind::CodeSpan => "CodeSpan",
            NodeKind::Strikethrough => "Strikethrough",
            NodeKind::Image { .. } => "Image",
            NodeKind::RawInline { .. } => "RawInline",
        }
    }
}

impl Node {
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    /// A node without children.
    pub fn leaf(kind: NodeKind) -> Self {
        Self::new(kind, vec![])
    }

    /// A plain Text node.
    pub fn text(content: &str) -> Self {
        Self::leaf(NodeKind::Text {
            content: content.to_string(),
            hard_break: false,
            soft_break: false,
        })
    }

    /// A Paragraph holding a single Text node.
    pub fn paragraph(content: &str) -> Self {
        Self::new(NodeKind::Paragraph, vec![Self::text(content)])
    }

    /// Whether any child is a block node, which selects block stacking over
    /// inline flow.
    pub fn has_block_children(&self) -> bool {
        self.children.iter().any(|c| c.kind.is_block())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_and_block_kinds() {
        assert!(NodeKind::CodeSpan.is_inline());
        assert!(NodeKind::Paragraph.is_block());
        assert!(NodeKind::Unknown { tag: "html".into() }.is_block());
        assert!(NodeKind::RawInline { tag: "html".into() }.is_inline());
    }

    #[test]
    fn test_has_block_children() {
        let para = Node::paragraph("hello");
        assert!(!para.has_block_children());
        let doc = Node::new(NodeKind::Document, vec![para]);
        assert!(doc.has_block_children());
    }

    #[test]
    fn test_node_json_roundtrip_shape() {
        let json = r#"{
            "kind": { "type": "List", "ordered": true },
            "children": [
                { "kind": { "type": "ListItem" }, "children": [
                    { "kind": { "type": "Text", "content": "one", "hardBreak": true } }
                ] }
            ]
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        match node.kind {
            NodeKind::List { ordered, start } => {
                assert!(ordered);
                assert_eq!(start, 1);
            }
            other => panic!("expected List, got {}", other.name()),
        }
        match &node.children[0].children[0].kind {
            NodeKind::Text { hard_break, .. } => assert!(*hard_break),
            other => panic!("expected Text, got {}", other.name()),
        }
    }

    #[test]
    fn test_page_bounds() {
        let config = PageConfig {
            size: PageSize::Custom {
                width: 200.0,
                height: 300.0,
            },
            margin: Spacing::uniform(20.0),
        };
        assert_eq!(config.vertical_bounds(), (20.0, 280.0));
        assert_eq!(config.horizontal_bounds(), (20.0, 180.0));
    }
}
