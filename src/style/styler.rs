//! Node-kind to style mapping.

use super::{
    BlockStyle, Border, BorderEdge, Color, IndividualBorder, ResolvedStyle, Spacing, TableLayout,
    TextFormat,
};
use crate::model::{Node, NodeKind};

/// Resolves the style of one node. `inherited` is the parent's resolved
/// text format; block properties are never inherited.
pub trait Styler {
    fn style(&self, node: &Node, inherited: &TextFormat) -> ResolvedStyle;
}

/// The stock look: sans-serif body text, scaled headings, grey code,
/// bordered table cells.
#[derive(Debug, Clone)]
pub struct DefaultStyler {
    pub font_family: String,
    pub font_size: f64,
    pub color: Color,
}

impl Default for DefaultStyler {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_size: 12.0,
            color: Color::BLACK,
        }
    }
}

const HEADING_SCALE: f64 = 1.15;
const MONOSPACE: &str = "Courier";

impl DefaultStyler {
    fn base_format(&self, inherited: &TextFormat) -> TextFormat {
        let mut format = inherited.clone();
        if format.font_family.is_empty() {
            format.font_family = self.font_family.clone();
        }
        if format.font_size == 0.0 {
            format.font_size = self.font_size;
        }
        format
    }

    fn code_border() -> Border {
        Border::uniform(0.5, Color::gray(0x99), 3.0)
    }
}

impl Styler for DefaultStyler {
    fn style(&self, node: &Node, inherited: &TextFormat) -> ResolvedStyle {
        let mut block = BlockStyle::default();
        let mut format = self.base_format(inherited);
        // An unset inherited format carries the default color too.
        if inherited.font_size == 0.0 {
            format.color = self.color;
        }

        match &node.kind {
            NodeKind::Heading { level } => {
                let level = (*level).clamp(1, 6) as i32;
                format.font_size = self.font_size * HEADING_SCALE.powi(7 - level);
                format.bold = true;
                block.margin = Spacing::symmetric(format.font_size / 2.0, 0.0);
            }
            NodeKind::Paragraph | NodeKind::List { .. } => {
                block.margin = Spacing::symmetric(format.font_size / 2.0, 0.0);
            }
            NodeKind::Table { .. } => {
                block.margin = Spacing::symmetric(format.font_size / 2.0, 0.0);
                block.table_layout = TableLayout::AutoCompact;
            }
            NodeKind::Blockquote => {
                block.margin = Spacing::symmetric(format.font_size / 2.0, 0.0);
                block.padding = Spacing {
                    left: 10.0,
                    ..Default::default()
                };
                block.border = Border::Individual(IndividualBorder {
                    left: BorderEdge {
                        width: 4.0,
                        color: Color::gray(0xCC),
                    },
                    ..Default::default()
                });
            }
            NodeKind::Link { .. } | NodeKind::AutoLink { .. } => {
                format.color = Color::BLUE;
                format.underline = true;
            }
            NodeKind::Emphasis { level } => {
                if *level == 2 {
                    format.bold = true;
                } else {
                    format.italic = true;
                }
            }
            NodeKind::CodeSpan => {
                format.color = Color::BLACK;
                format.background_color = Some(Color::gray(0xF2));
                format.border = Self::code_border();
                format.font_family = MONOSPACE.to_string();
            }
            NodeKind::CodeBlock { .. } => {
                format.color = Color::BLACK;
                format.font_family = MONOSPACE.to_string();
                block.margin = Spacing::symmetric(format.font_size / 2.0, 0.0);
                block.background_color = Some(Color::gray(0xF2));
                block.border = Self::code_border();
                block.padding = Spacing::uniform(6.0);
            }
            NodeKind::Strikethrough => {
                format.strike = true;
            }
            NodeKind::TableHeader => {
                format.bold = true;
                block.background_color = Some(Color::gray(0xE0));
            }
            NodeKind::TableCell { align } => {
                block.border = Border::uniform(1.0, self.color, 0.0);
                block.padding = Spacing::uniform(4.0);
                block.text_align = align.unwrap_or_default();
            }
            NodeKind::ThematicBreak => {
                block.margin = Spacing::symmetric(format.font_size, 0.0);
                block.border = Border::Individual(IndividualBorder {
                    top: BorderEdge {
                        width: 1.0,
                        color: Color::gray(0x80),
                    },
                    ..Default::default()
                });
            }
            NodeKind::Document
            | NodeKind::TextBlock
            | NodeKind::ListItem
            | NodeKind::TableRow
            | NodeKind::Unknown { .. }
            | NodeKind::Text { .. }
            | NodeKind::Image { .. }
            | NodeKind::RawInline { .. } => {}
        }

        ResolvedStyle {
            block,
            text: format,
        }
    }
}
