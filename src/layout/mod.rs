//! # Page-Aware Layout Engine
//!
//! Lays a block tree out onto pages without ever building an infinitely
//! tall canvas. Vertical positions are [`VerticalCoord`]s, so a box knows
//! which page it starts and ends on, and every line asks the page breaker
//! whether it still fits before it is placed.
//!
//! ## Measure, then draw
//!
//! A block's background and border must be drawn before its children, but
//! its height is only known after the children are laid out. So every node
//! is laid out by one function that runs in one of two [`Phase`]s:
//!
//! 1. In the drawing phase a node first runs itself in the measuring phase
//!    to learn its [`Rect`] (a table cell may instead be handed a forced
//!    bottom so all cells of a row match).
//! 2. It draws its box at that rect.
//! 3. It lays its children out again, now drawing.
//!
//! Measuring never draws and never measures again from inside itself, so a
//! subtree is preflighted once per drawn ancestor level, not recursively.
//!
//! Sibling margins are not collapsed.

pub mod inline;
pub mod list;
pub mod page_break;
pub mod table;

use crate::backend::RenderContext;
use crate::error::{RenderError, Result};
use crate::geometry::{HalfBounds, Rect, VerticalCoord};
use crate::image_loader::ImageLoader;
use crate::model::{Node, NodeKind};
use crate::style::{BlockStyle, ResolvedStyle, Spacer, Styler, TextFormat};

/// Whether a layout pass may reach the backend's drawing primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Measuring,
    Drawing,
}

/// The backend as seen by one layout pass.
pub struct Canvas<'a> {
    backend: &'a mut dyn RenderContext,
    phase: Phase,
}

impl<'a> Canvas<'a> {
    pub fn new(backend: &'a mut dyn RenderContext, phase: Phase) -> Self {
        Self { backend, phase }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Size queries; available in both phases.
    pub fn measure(&self) -> &(dyn RenderContext + 'a) {
        &*self.backend
    }

    /// Drawing primitives; `None` while measuring.
    pub fn render_context(&mut self) -> Option<&mut (dyn RenderContext + 'a)> {
        match self.phase {
            Phase::Drawing => Some(&mut *self.backend),
            Phase::Measuring => None,
        }
    }

    /// A measuring view of the same backend.
    pub fn measuring(&mut self) -> Canvas<'_> {
        Canvas {
            backend: &mut *self.backend,
            phase: Phase::Measuring,
        }
    }
}

/// Recursive block layout over a node tree.
pub struct LayoutEngine<'a> {
    styler: &'a dyn Styler,
    images: &'a dyn ImageLoader,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(styler: &'a dyn Styler, images: &'a dyn ImageLoader) -> Self {
        Self { styler, images }
    }

    /// Lay out a root node between `left` and `right`, starting at the top
    /// of the first page. Returns the root's margin box.
    pub fn layout_root(&self, canvas: &mut Canvas<'_>, root: &Node, left: f64, right: f64) -> Result<Rect> {
        let style = self.styler.style(root, &TextFormat::default());
        let (top, _) = canvas.measure().page_vertical_bounds(0);
        let margin = style.block.margin;
        let bounds = HalfBounds::new(left, right, VerticalCoord::new(0, top)).shrink(&[&margin]);
        let rect = self.layout_node(canvas, root, None, 0, &style, bounds)?;
        Ok(rect.expand(&[&margin]))
    }

    /// Dispatch one block node. `bounds` is its border box without a
    /// bottom; `index` is its position among its siblings.
    pub(crate) fn layout_node(
        &self,
        canvas: &mut Canvas<'_>,
        node: &Node,
        parent: Option<&Node>,
        index: usize,
        style: &ResolvedStyle,
        bounds: HalfBounds,
    ) -> Result<Rect> {
        let parent_name = parent.map_or("(root)", |p| p.kind.name());
        match &node.kind {
            NodeKind::Table { .. } => self.layout_table(canvas, node, style, bounds),
            NodeKind::ListItem => match parent {
                Some(list) if matches!(list.kind, NodeKind::List { .. }) => {
                    self.layout_list_item(canvas, list, node, index, style, bounds)
                }
                _ => Err(RenderError::MisplacedNode {
                    node: node.kind.name(),
                    expected: "List",
                    parent: parent_name,
                }),
            },
            NodeKind::TableHeader | NodeKind::TableRow => Err(RenderError::MisplacedNode {
                node: node.kind.name(),
                expected: "Table",
                parent: parent_name,
            }),
            NodeKind::TableCell { .. } => Err(RenderError::MisplacedNode {
                node: node.kind.name(),
                expected: "TableRow",
                parent: parent_name,
            }),
            NodeKind::Unknown { tag } => {
                log::warn!("Skipping unknown block node '{}' under {}", tag, parent_name);
                Ok(bounds.to_rect(bounds.top))
            }
            NodeKind::Text { .. }
            | NodeKind::Emphasis { .. }
            | NodeKind::Link { .. }
            | NodeKind::AutoLink { .. }
            | NodeKind::CodeSpan
            | NodeKind::Strikethrough
            | NodeKind::Image { .. }
            | NodeKind::RawInline { .. } => Err(RenderError::InlineInBlockContext {
                parent: parent_name,
                child: node.kind.name(),
            }),
            NodeKind::Document
            | NodeKind::Paragraph
            | NodeKind::Heading { .. }
            | NodeKind::TextBlock
            | NodeKind::Blockquote
            | NodeKind::CodeBlock { .. }
            | NodeKind::ThematicBreak
            | NodeKind::List { .. } => self.layout_generic(canvas, node, style, bounds, None),
        }
    }

    /// Run `body` under the measure-then-draw discipline: in the drawing
    /// phase, learn the rect first (or take `forced_bottom`), draw the box,
    /// then run `body` for real.
    pub(crate) fn decorate<F>(
        &self,
        canvas: &mut Canvas<'_>,
        style: &BlockStyle,
        bounds: HalfBounds,
        forced_bottom: Option<VerticalCoord>,
        body: F,
    ) -> Result<Rect>
    where
        F: Fn(&mut Canvas<'_>) -> Result<Rect>,
    {
        if canvas.phase() == Phase::Drawing {
            let rect = match forced_bottom {
                Some(bottom) => bounds.to_rect(bottom),
                None => body(&mut canvas.measuring())?,
            };
            if let Some(rc) = canvas.render_context() {
                rc.draw_box(&rect, style.background_color, &style.border);
            }
        }

        let rect = body(canvas)?;
        Ok(match forced_bottom {
            Some(bottom) => Rect { bottom, ..rect },
            None => rect,
        })
    }

    /// Any block without a dedicated algorithm: inline flow when it has no
    /// block children, vertical stacking otherwise.
    pub(crate) fn layout_generic(
        &self,
        canvas: &mut Canvas<'_>,
        node: &Node,
        style: &ResolvedStyle,
        bounds: HalfBounds,
        forced_bottom: Option<VerticalCoord>,
    ) -> Result<Rect> {
        self.decorate(canvas, &style.block, bounds, forced_bottom, |canvas: &mut Canvas<'_>| {
            self.generic_body(canvas, node, style, bounds)
        })
    }

    fn generic_body(
        &self,
        canvas: &mut Canvas<'_>,
        node: &Node,
        style: &ResolvedStyle,
        bounds: HalfBounds,
    ) -> Result<Rect> {
        let block = &style.block;
        let spacers: [&dyn Spacer; 2] = [&block.border, &block.padding];
        let content = bounds.shrink(&spacers);

        let bottom = if node.has_block_children() {
            self.stack_children(canvas, node, &style.text, content)?
        } else {
            let elements = self.block_inlines(node, &style.text)?;
            inline::place_lines(canvas, content, block.text_align, &elements)
        };

        Ok(content.to_rect(bottom).expand(&spacers))
    }

    /// Stack block children top to bottom inside `content`. Returns the
    /// cursor after the last child's bottom margin.
    fn stack_children(
        &self,
        canvas: &mut Canvas<'_>,
        node: &Node,
        format: &TextFormat,
        content: HalfBounds,
    ) -> Result<VerticalCoord> {
        let mut cursor = content.top;
        for (index, child) in node.children.iter().enumerate() {
            if child.kind.is_inline() {
                return Err(RenderError::InlineInBlockContext {
                    parent: node.kind.name(),
                    child: child.kind.name(),
                });
            }
            let child_style = self.styler.style(child, format);
            let margin = child_style.block.margin;
            let child_bounds = HalfBounds::new(content.left, content.right, cursor).shrink(&[&margin]);
            let rect = self.layout_node(canvas, child, Some(node), index, &child_style, child_bounds)?;
            cursor = rect.bottom.offset(margin.bottom);
        }
        Ok(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DisplayList, DrawCommand, Page};
    use crate::image_loader::DefaultImageLoader;
    use crate::model::{PageConfig, PageSize};
    use crate::style::{Border, Color, DefaultStyler, Spacing};

    fn config() -> PageConfig {
        PageConfig {
            size: PageSize::Custom {
                width: 300.0,
                height: 200.0,
            },
            margin: Spacing::uniform(20.0),
        }
    }

    fn run(root: &Node, phase: Phase) -> Result<(Rect, Vec<Page>)> {
        let styler = DefaultStyler {
            font_family: "Courier".into(),
            font_size: 10.0,
            color: Color::BLACK,
        };
        let images = DefaultImageLoader::default();
        let engine = LayoutEngine::new(&styler, &images);
        let mut backend = DisplayList::new(config());
        let rect = {
            let mut canvas = Canvas::new(&mut backend, phase);
            engine.layout_root(&mut canvas, root, 20.0, 280.0)?
        };
        Ok((rect, backend.into_pages()))
    }

    fn doc(children: Vec<Node>) -> Node {
        Node::new(NodeKind::Document, children)
    }

    fn text_commands(pages: &[Page]) -> Vec<(usize, f64, String)> {
        pages
            .iter()
            .flat_map(|p| {
                p.commands.iter().filter_map(move |c| match c {
                    DrawCommand::Text { y, text, .. } => Some((p.index, *y, text.clone())),
                    _ => None,
                })
            })
            .collect()
    }

    #[test]
    fn test_measuring_phase_draws_nothing() {
        let root = doc(vec![Node::paragraph("hello world")]);
        let (_, pages) = run(&root, Phase::Measuring).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].commands.is_empty());
    }

    #[test]
    fn test_measure_and_draw_agree() {
        let root = doc(vec![
            Node::paragraph("one two three four five six seven eight nine ten"),
            Node::paragraph("eleven twelve"),
        ]);
        let (measured, _) = run(&root, Phase::Measuring).unwrap();
        let (drawn, _) = run(&root, Phase::Drawing).unwrap();
        assert_eq!(measured, drawn);
    }

    #[test]
    fn test_paragraph_margins_stack_without_collapsing() {
        // Paragraph margins are 5pt top and bottom at 10pt.
        let root = doc(vec![Node::paragraph("a"), Node::paragraph("b")]);
        let (rect, pages) = run(&root, Phase::Drawing).unwrap();
        let texts = text_commands(&pages);
        assert_eq!(texts[0], (0, 25.0, "a".to_string()));
        assert_eq!(texts[1], (0, 45.0, "b".to_string()));
        assert_eq!(rect.bottom, VerticalCoord::new(0, 60.0));
    }

    #[test]
    fn test_code_block_lines() {
        let code = Node::leaf(NodeKind::CodeBlock {
            lines: vec!["fn main() {".into(), "".into(), "}".into()],
        });
        let root = doc(vec![code]);
        let (rect, pages) = run(&root, Phase::Drawing).unwrap();
        let texts = text_commands(&pages);
        // The empty middle line takes space but draws nothing.
        assert_eq!(texts.len(), 2);
        // margin 5 + border 0.5 + padding 6
        assert_eq!(texts[0].1, 31.5);
        assert_eq!(texts[1], (0, 51.5, "}".to_string()));
        // three lines, padding and border on both sides, bottom margin
        assert!((rect.bottom.position - (20.0 + 5.0 + 0.5 + 6.0 + 30.0 + 6.0 + 0.5 + 5.0)).abs() < 1e-9);
        assert!(matches!(
            pages[0].commands[0],
            DrawCommand::Box { border: Border::Uniform(_), .. }
        ));
    }

    #[test]
    fn test_box_drawn_before_children() {
        let quote = Node::new(NodeKind::Blockquote, vec![Node::paragraph("quoted")]);
        let (_, pages) = run(&doc(vec![quote]), Phase::Drawing).unwrap();
        let commands = &pages[0].commands;
        match (&commands[0], &commands[1]) {
            (DrawCommand::Box { x, height, .. }, DrawCommand::Text { x: text_x, .. }) => {
                assert_eq!(*x, 20.0);
                // paragraph margins 5 + 5 around a 10pt line
                assert_eq!(*height, 20.0);
                // 4pt left border + 10pt padding
                assert_eq!(*text_x, 34.0);
            }
            other => panic!("unexpected commands {:?}", other),
        }
    }

    #[test]
    fn test_inline_among_blocks_is_an_error() {
        let root = doc(vec![Node::paragraph("a"), Node::text("loose")]);
        let err = run(&root, Phase::Drawing).unwrap_err();
        assert!(matches!(
            err,
            RenderError::InlineInBlockContext {
                parent: "Document",
                child: "Text"
            }
        ));
    }

    #[test]
    fn test_block_inside_inline_content_is_an_error() {
        let emphasis = Node::new(NodeKind::Emphasis { level: 1 }, vec![Node::paragraph("x")]);
        let root = doc(vec![Node::new(NodeKind::Paragraph, vec![emphasis])]);
        let err = run(&root, Phase::Drawing).unwrap_err();
        assert!(matches!(err, RenderError::BlockInInlineContext { .. }));
    }

    #[test]
    fn test_misplaced_list_item() {
        let root = doc(vec![Node::new(NodeKind::ListItem, vec![Node::paragraph("x")])]);
        let err = run(&root, Phase::Drawing).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MisplacedNode {
                node: "ListItem",
                expected: "List",
                parent: "Document"
            }
        ));
    }

    #[test]
    fn test_misplaced_table_row() {
        let root = doc(vec![Node::new(NodeKind::TableRow, vec![])]);
        let err = run(&root, Phase::Drawing).unwrap_err();
        assert!(matches!(err, RenderError::MisplacedNode { expected: "Table", .. }));
    }

    #[test]
    fn test_raw_inline_is_unsupported() {
        let raw = Node::leaf(NodeKind::RawInline { tag: "html".into() });
        let root = doc(vec![Node::new(NodeKind::Paragraph, vec![raw])]);
        let err = run(&root, Phase::Drawing).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedInline { tag } if tag == "html"));
    }

    #[test]
    fn test_unknown_block_renders_nothing() {
        let root = doc(vec![
            Node::leaf(NodeKind::Unknown { tag: "html".into() }),
            Node::paragraph("after"),
        ]);
        let (_, pages) = run(&root, Phase::Drawing).unwrap();
        let texts = text_commands(&pages);
        assert_eq!(texts, vec![(0, 25.0, "after".to_string())]);
    }

    #[test]
    fn test_overflow_moves_lines_to_next_page() {
        // Usable height is 160pt; 8 words per line, 25 lines.
        let words: Vec<String> = (0..200).map(|i| format!("w{:03}", i)).collect();
        let root = doc(vec![Node::paragraph(&words.join(" "))]);
        let (rect, pages) = run(&root, Phase::Drawing).unwrap();
        assert!(pages.len() >= 2);
        assert!(rect.spans_pages());
        let first_on_next = text_commands(&pages)
            .into_iter()
            .find(|(page, _, _)| *page == 1)
            .unwrap();
        assert_eq!(first_on_next.1, 20.0);
    }
}
