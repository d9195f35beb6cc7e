//! # Inline Flow
//!
//! Inline content is flattened into a sequence of [`InlineElement`]s, broken
//! greedily into lines no wider than the content box, and placed line by
//! line. Elements of a line share its bottom edge: each one is offset down by
//! `line_height - element_height`.
//!
//! ```text
//!   ┌──────────────────────────────┐
//!   │ Lorem ipsum ┌────┐           │  line 1 (height = image)
//!   │             │img │ dolor     │
//!   │ sit amet    └────┘           │  line 2 (height = font size)
//!   └──────────────────────────────┘
//! ```

use std::mem;
use std::sync::Arc;

use serde::Serialize;

use super::{page_break, Canvas, LayoutEngine};
use crate::backend::MeasureContext;
use crate::error::{RenderError, Result};
use crate::geometry::{HalfBounds, VerticalCoord, EPSILON};
use crate::model::{Node, NodeKind};
use crate::style::{TextAlign, TextFormat};

/// A run of text in one format. Never contains a line break.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub format: TextFormat,
    pub text: String,
}

impl TextElement {
    pub fn new(format: TextFormat, text: impl Into<String>) -> Self {
        Self {
            format,
            text: text.into(),
        }
    }
}

/// An explicit line break. Zero width; as tall as its font size.
#[derive(Debug, Clone, PartialEq)]
pub struct LineBreakElement {
    pub format: TextFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageType {
    Png,
    Jpeg,
    Gif,
}

/// An image placed as one atomic box.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageElement {
    /// Stable name the backend can register the bytes under.
    pub name: String,
    pub image_type: ImageType,
    pub width: f64,
    pub height: f64,
    pub bytes: Arc<[u8]>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InlineElement {
    Text(TextElement),
    LineBreak(LineBreakElement),
    Image(ImageElement),
}

impl InlineElement {
    pub fn width<M: MeasureContext + ?Sized>(&self, measure: &M) -> f64 {
        match self {
            InlineElement::Text(t) => measure.text_width(t),
            InlineElement::LineBreak(_) => 0.0,
            InlineElement::Image(img) => img.width,
        }
    }

    pub fn height(&self) -> f64 {
        match self {
            InlineElement::Text(t) => t.format.font_size,
            InlineElement::LineBreak(lb) => lb.format.font_size,
            InlineElement::Image(img) => img.height,
        }
    }
}

// ── Collection ──────────────────────────────────────────────────

impl LayoutEngine<'_> {
    /// The inline content of a block without block children. Code blocks
    /// synthesize one text run and one line break per source line.
    pub(crate) fn block_inlines(&self, node: &Node, format: &TextFormat) -> Result<Vec<InlineElement>> {
        if let NodeKind::CodeBlock { lines } = &node.kind {
            let mut out = Vec::with_capacity(lines.len() * 2);
            for line in lines {
                out.push(InlineElement::Text(TextElement::new(format.clone(), line.as_str())));
                out.push(InlineElement::LineBreak(LineBreakElement {
                    format: format.clone(),
                }));
            }
            return Ok(out);
        }

        let mut out = Vec::new();
        self.collect_children(node, format, &mut out)?;
        Ok(out)
    }

    /// All inline content below `node`, with a line break between sibling
    /// blocks. Used to measure natural widths.
    pub(crate) fn deep_inlines(&self, node: &Node, format: &TextFormat) -> Result<Vec<InlineElement>> {
        if !node.has_block_children() {
            return self.block_inlines(node, format);
        }

        let mut out = Vec::new();
        for (i, child) in node.children.iter().enumerate() {
            if child.kind.is_inline() {
                return Err(RenderError::InlineInBlockContext {
                    parent: node.kind.name(),
                    child: child.kind.name(),
                });
            }
            if i > 0 {
                out.push(InlineElement::LineBreak(LineBreakElement {
                    format: format.clone(),
                }));
            }
            let style = self.styler.style(child, format);
            out.extend(self.deep_inlines(child, &style.text)?);
        }
        Ok(out)
    }

    /// Flatten one inline node, already styled with `format`.
    pub fn collect_inlines(&self, node: &Node, format: &TextFormat) -> Result<Vec<InlineElement>> {
        let mut out = Vec::new();
        self.collect_inline(node, format, &mut out)?;
        Ok(out)
    }

    fn collect_children(&self, parent: &Node, format: &TextFormat, out: &mut Vec<InlineElement>) -> Result<()> {
        for child in &parent.children {
            if child.kind.is_block() {
                return Err(RenderError::BlockInInlineContext {
                    parent: parent.kind.name(),
                    child: child.kind.name(),
                });
            }
            let style = self.styler.style(child, format);
            self.collect_inline(child, &style.text, out)?;
        }
        Ok(())
    }

    fn collect_inline(&self, node: &Node, format: &TextFormat, out: &mut Vec<InlineElement>) -> Result<()> {
        match &node.kind {
            NodeKind::Text {
                content,
                hard_break,
                soft_break,
            } => {
                let mut text = content.clone();
                if *soft_break {
                    text.push(' ');
                }
                out.push(InlineElement::Text(TextElement::new(format.clone(), text)));
                if *hard_break {
                    out.push(InlineElement::LineBreak(LineBreakElement {
                        format: format.clone(),
                    }));
                }
                Ok(())
            }
            NodeKind::AutoLink { url } => {
                out.push(InlineElement::Text(TextElement::new(format.clone(), url.as_str())));
                Ok(())
            }
            NodeKind::Emphasis { .. }
            | NodeKind::Link { .. }
            | NodeKind::CodeSpan
            | NodeKind::Strikethrough => self.collect_children(node, format, out),
            NodeKind::Image { src, .. } => match self.images.load_image(src) {
                Ok(Some(image)) => {
                    out.push(InlineElement::Image(image));
                    Ok(())
                }
                // Skipped: show the alt text.
                Ok(None) => self.collect_children(node, format, out),
                Err(source) => Err(RenderError::Image {
                    src: src.clone(),
                    source,
                }),
            },
            NodeKind::RawInline { tag } => Err(RenderError::UnsupportedInline { tag: tag.clone() }),
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
            | NodeKind::Unknown { .. } => Err(RenderError::BlockInInlineContext {
                parent: "inline content",
                child: node.kind.name(),
            }),
        }
    }
}

// ── Line breaking ───────────────────────────────────────────────

struct LineBreaker<'m, M: ?Sized> {
    measure: &'m M,
    limit: f64,
    lines: Vec<Vec<InlineElement>>,
    current: Vec<InlineElement>,
    line_width: f64,
    /// The current line holds something with extent (zero-width format
    /// carriers don't count).
    occupied: bool,
}

impl<'m, M: MeasureContext + ?Sized> LineBreaker<'m, M> {
    fn new(measure: &'m M, limit: f64) -> Self {
        Self {
            measure,
            limit,
            lines: Vec::new(),
            current: Vec::new(),
            line_width: 0.0,
            occupied: false,
        }
    }

    fn new_line(&mut self) {
        self.lines.push(mem::take(&mut self.current));
        self.line_width = 0.0;
        self.occupied = false;
    }

    fn place(&mut self, element: InlineElement, width: f64) {
        self.current.push(element);
        self.line_width += width;
        self.occupied = true;
    }

    fn push(&mut self, element: &InlineElement) {
        match element {
            InlineElement::Text(t) if t.text.is_empty() => self.current.push(element.clone()),
            InlineElement::Text(t) => self.push_text(t),
            InlineElement::Image(img) => {
                if self.occupied && self.line_width + img.width > self.limit + EPSILON {
                    self.new_line();
                }
                self.place(element.clone(), img.width);
            }
            InlineElement::LineBreak(_) => {
                self.current.push(element.clone());
                self.new_line();
            }
        }
    }

    fn push_text(&mut self, text: &TextElement) {
        let mut pending = text.text.clone();
        while !pending.is_empty() {
            let head = TextElement::new(text.format.clone(), mem::take(&mut pending));
            let available = self.limit - self.line_width;

            match self.measure.sub_text(&head, available) {
                Some(fit) if !fit.text.is_empty() => {
                    let width = self.measure.text_width(&fit);
                    pending = head.text.get(fit.text.len()..).unwrap_or_default().to_string();
                    self.place(InlineElement::Text(fit), width);
                }
                _ if self.occupied => {
                    log::trace!("wrap before {:?}", head.text);
                    self.new_line();
                    pending = match head.text.strip_prefix(' ') {
                        Some(rest) => rest.to_string(),
                        None => head.text,
                    };
                }
                _ => {
                    let (fit, rest) = self.force_split(&head, available);
                    log::trace!("forced split of {:?} after {:?}", head.text, fit.text);
                    let width = self.measure.text_width(&fit);
                    self.place(InlineElement::Text(fit), width);
                    pending = rest;
                }
            }
        }
    }

    /// Character-level split for a word wider than an empty line: the
    /// longest fitting prefix, but never less than one character.
    fn force_split(&self, head: &TextElement, available: f64) -> (TextElement, String) {
        let mut chars = head.text.char_indices().skip(1).map(|(i, _)| i);
        let mut cut = chars.next().unwrap_or(head.text.len());
        for end in chars.chain(std::iter::once(head.text.len())) {
            let candidate = TextElement::new(head.format.clone(), &head.text[..end]);
            if self.measure.text_width(&candidate) > available + EPSILON {
                break;
            }
            cut = end;
        }
        let fit = TextElement::new(head.format.clone(), &head.text[..cut]);
        (fit, head.text[cut..].to_string())
    }

    fn finish(mut self) -> Vec<Vec<InlineElement>> {
        if !self.current.is_empty() {
            self.lines.push(self.current);
        }
        self.lines
    }
}

/// Break `elements` into lines no wider than `limit_width`. A line is only
/// wider when it holds a single image or a single character that alone
/// exceeds the limit.
pub fn wrap_elements<M: MeasureContext + ?Sized>(
    measure: &M,
    limit_width: f64,
    elements: &[InlineElement],
) -> Vec<Vec<InlineElement>> {
    let mut breaker = LineBreaker::new(measure, limit_width);
    for element in elements {
        breaker.push(element);
    }
    breaker.finish()
}

/// `(width, height)` of one line: widths add up, the tallest element sets
/// the height.
pub fn line_size<M: MeasureContext + ?Sized>(measure: &M, line: &[InlineElement]) -> (f64, f64) {
    line.iter().fold((0.0, 0.0), |(w, h), el| {
        (w + el.width(measure), f64::max(h, el.height()))
    })
}

/// Width of the content laid out without wrapping: the widest segment
/// between explicit line breaks.
pub fn natural_width<M: MeasureContext + ?Sized>(measure: &M, elements: &[InlineElement]) -> f64 {
    let mut widest = 0.0_f64;
    let mut segment = 0.0;
    for el in elements {
        if let InlineElement::LineBreak(_) = el {
            widest = widest.max(segment);
            segment = 0.0;
        } else {
            segment += el.width(measure);
        }
    }
    widest.max(segment)
}

// ── Placement ───────────────────────────────────────────────────

/// Wrap `elements` to the content box and place them line by line from its
/// top. Returns the bottom of the last line (the top itself when there are
/// no lines). Draws only in the drawing phase.
pub fn place_lines(
    canvas: &mut Canvas<'_>,
    content: HalfBounds,
    align: TextAlign,
    elements: &[InlineElement],
) -> VerticalCoord {
    let lines = wrap_elements(canvas.measure(), content.width(), elements);
    let mut cursor = content.top;

    for line in &lines {
        let (line_width, line_height) = line_size(canvas.measure(), line);
        let top = page_break::fit(canvas.measure(), cursor, line_height);
        let mut x = content.left
            + match align {
                TextAlign::Left => 0.0,
                TextAlign::Right => content.width() - line_width,
                TextAlign::Center => (content.width() - line_width) / 2.0,
            };

        if let Some(rc) = canvas.render_context() {
            for el in line {
                let y = top.position + line_height - el.height();
                match el {
                    InlineElement::Text(t) if t.text.is_empty() => {}
                    InlineElement::Text(t) => rc.draw_text(top.page, x, y, t),
                    InlineElement::Image(img) => rc.draw_image(top.page, x, y, img),
                    InlineElement::LineBreak(_) => {}
                }
                x += el.width(&*rc);
            }
        }

        cursor = top.offset(line_height);
    }

    cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DisplayList;
    use crate::model::{PageConfig, PageSize};
    use crate::style::Spacing;

    fn measure() -> DisplayList {
        DisplayList::new(PageConfig {
            size: PageSize::Custom {
                width: 400.0,
                height: 400.0,
            },
            margin: Spacing::uniform(20.0),
        })
    }

    /// Courier 10pt: every character is 6pt wide.
    fn mono() -> TextFormat {
        TextFormat {
            font_family: "Courier".into(),
            font_size: 10.0,
            ..Default::default()
        }
    }

    fn text(s: &str) -> InlineElement {
        InlineElement::Text(TextElement::new(mono(), s))
    }

    fn line_break() -> InlineElement {
        InlineElement::LineBreak(LineBreakElement { format: mono() })
    }

    fn image(width: f64, height: f64) -> InlineElement {
        InlineElement::Image(ImageElement {
            name: "0".into(),
            image_type: ImageType::Png,
            width,
            height,
            bytes: Arc::from(Vec::new()),
        })
    }

    fn line_text(line: &[InlineElement]) -> String {
        line.iter()
            .filter_map(|el| match el {
                InlineElement::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_wraps_at_word_boundary() {
        let m = measure();
        // "Lorem ipsum" is 66pt wide, "Lorem ipsum dolor" 102pt.
        let lines = wrap_elements(&m, 90.0, &[text("Lorem ipsum dolor sit amet")]);
        let texts: Vec<String> = lines.iter().map(|l| line_text(l)).collect();
        assert_eq!(texts, vec!["Lorem ipsum", "dolor sit amet"]);
    }

    #[test]
    fn test_no_line_exceeds_limit() {
        let m = measure();
        let words = "the quick brown fox jumps over the lazy dog and keeps running far away";
        for limit in [40.0, 55.0, 90.0, 130.0] {
            let lines = wrap_elements(&m, limit, &[text(words)]);
            for line in &lines {
                let (w, _) = line_size(&m, line);
                assert!(w <= limit + 1e-9, "line {:?} is {}pt at limit {}", line_text(line), w, limit);
            }
        }
    }

    #[test]
    fn test_text_round_trip_drops_only_wrap_spaces() {
        let m = measure();
        let words = "alpha beta gamma delta epsilon zeta eta theta";
        let lines = wrap_elements(&m, 60.0, &[text(words)]);
        let joined: Vec<String> = lines.iter().map(|l| line_text(l)).collect();
        assert_eq!(joined.join(" "), words);
    }

    #[test]
    fn test_mixed_runs_continue_on_same_line() {
        let m = measure();
        let lines = wrap_elements(&m, 100.0, &[text("ab "), text("cd")]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 2);
        assert_eq!(line_size(&m, &lines[0]).0, 30.0);
    }

    #[test]
    fn test_oversized_word_is_force_split() {
        let m = measure();
        // 10 characters = 60pt into a 25pt line: 4 characters per line.
        let lines = wrap_elements(&m, 25.0, &[text("abcdefghij")]);
        let texts: Vec<String> = lines.iter().map(|l| line_text(l)).collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_forced_split_places_at_least_one_char() {
        let m = measure();
        let lines = wrap_elements(&m, 1.0, &[text("abc")]);
        assert_eq!(lines.len(), 3);
        assert_eq!(line_text(&lines[0]), "a");
    }

    #[test]
    fn test_line_break_ends_line() {
        let m = measure();
        let lines = wrap_elements(&m, 300.0, &[text("one"), line_break(), text("two")]);
        assert_eq!(lines.len(), 2);
        assert!(matches!(lines[0].last(), Some(InlineElement::LineBreak(_))));
        assert_eq!(line_text(&lines[1]), "two");
    }

    #[test]
    fn test_trailing_empty_line_dropped() {
        let m = measure();
        let lines = wrap_elements(&m, 300.0, &[text("one"), line_break()]);
        assert_eq!(lines.len(), 1);
        assert!(wrap_elements(&m, 300.0, &[]).is_empty());
    }

    #[test]
    fn test_image_on_empty_line_even_if_too_wide() {
        let m = measure();
        let lines = wrap_elements(&m, 50.0, &[image(80.0, 20.0), text("ab")]);
        assert_eq!(lines.len(), 2);
        assert!(matches!(lines[0][0], InlineElement::Image(_)));
    }

    #[test]
    fn test_image_fits_after_text() {
        let m = measure();
        let lines = wrap_elements(&m, 50.0, &[text("ab"), image(30.0, 20.0)]);
        assert_eq!(lines.len(), 1);
        assert_eq!(line_size(&m, &lines[0]), (42.0, 20.0));
    }

    #[test]
    fn test_empty_text_carries_format_only() {
        let m = measure();
        let lines = wrap_elements(&m, 20.0, &[text(""), text("ab")]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 2);
    }

    #[test]
    fn test_runs_at_their_natural_width_share_one_line() {
        let m = measure();
        let sans = TextFormat {
            font_family: "Helvetica".into(),
            font_size: 12.0,
            ..Default::default()
        };
        let bold = TextFormat {
            bold: true,
            ..sans.clone()
        };
        let runs = [
            InlineElement::Text(TextElement::new(sans.clone(), "Module ")),
            InlineElement::Text(TextElement::new(bold, "b")),
            InlineElement::Text(TextElement::new(sans, " end")),
        ];
        let natural = natural_width(&m, &runs);
        for limit in [natural, natural - 1e-12, (20.0 + natural) - 20.0] {
            let lines = wrap_elements(&m, limit, &runs);
            assert_eq!(lines.len(), 1, "wrapped at {}", limit);
            assert_eq!(lines[0].len(), 3);
        }
    }

    #[test]
    fn test_natural_width_takes_widest_segment() {
        let m = measure();
        let els = [text("abc"), line_break(), text("abcdef"), text("g")];
        assert_eq!(natural_width(&m, &els), 42.0);
        assert_eq!(natural_width(&m, &[text("ab"), text("cd")]), 24.0);
    }
}
