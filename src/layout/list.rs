//! # List Items
//!
//! A list item is an ordinary block narrowed on the left by a marker gutter.
//! The marker (an ordinal like `3.` or a bullet) is drawn in the gutter,
//! vertically centered on the item's first line and paginated like a line,
//! so it always lands on the same page as the text it belongs to.
//!
//! The gutter is at least [`MARKER_GUTTER`] wide and grows to fit the
//! widest ordinal of the list, so `10.` never runs into its text.

use super::inline::{self, TextElement};
use super::{page_break, Canvas, LayoutEngine, Phase};
use crate::backend::MeasureContext;
use crate::error::Result;
use crate::geometry::{HalfBounds, Rect};
use crate::model::{Node, NodeKind};
use crate::style::{ResolvedStyle, TextFormat};

/// Minimum width reserved left of the item for its marker.
pub const MARKER_GUTTER: f64 = 16.0;

/// Space between an ordinal and its item.
const MARKER_GAP: f64 = 4.0;

const BULLET_RADIUS: f64 = 2.0;
const BULLET_INSET: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Ordinal(u32),
    Bullet,
}

impl Marker {
    /// The marker of the item at `index` among its siblings.
    pub fn for_item(ordered: bool, start: u32, index: usize) -> Self {
        if ordered {
            Marker::Ordinal(start.saturating_add(index as u32))
        } else {
            Marker::Bullet
        }
    }

    pub fn label(&self) -> Option<String> {
        match self {
            Marker::Ordinal(n) => Some(format!("{}.", n)),
            Marker::Bullet => None,
        }
    }
}

/// Gutter width for the items of `list`: the minimum, or the widest of its
/// first and last ordinal plus a gap. Ordinals grow monotonically, so the
/// last one has the most digits.
pub fn gutter_width<M: MeasureContext + ?Sized>(measure: &M, list: &Node, format: &TextFormat) -> f64 {
    let NodeKind::List { ordered: true, start } = list.kind else {
        return MARKER_GUTTER;
    };
    let items = list.children.len();
    if items == 0 {
        return MARKER_GUTTER;
    }
    [0, items - 1]
        .iter()
        .filter_map(|&i| Marker::for_item(true, start, i).label())
        .map(|label| measure.text_width(&TextElement::new(format.clone(), label)) + MARKER_GAP)
        .fold(MARKER_GUTTER, f64::max)
}

impl LayoutEngine<'_> {
    pub(crate) fn layout_list_item(
        &self,
        canvas: &mut Canvas<'_>,
        list: &Node,
        item: &Node,
        index: usize,
        style: &ResolvedStyle,
        bounds: HalfBounds,
    ) -> Result<Rect> {
        let marker = match list.kind {
            NodeKind::List { ordered, start } => Marker::for_item(ordered, start, index),
            _ => Marker::Bullet,
        };
        let gutter = gutter_width(canvas.measure(), list, &style.text);
        let narrowed = HalfBounds {
            left: bounds.left + gutter,
            ..bounds
        };

        if canvas.phase() == Phase::Drawing {
            self.draw_marker(canvas, item, marker, style, bounds.left, narrowed)?;
        }

        let rect = self.layout_generic(canvas, item, style, narrowed, None)?;
        Ok(Rect {
            left: bounds.left,
            ..rect
        })
    }

    fn draw_marker(
        &self,
        canvas: &mut Canvas<'_>,
        item: &Node,
        marker: Marker,
        style: &ResolvedStyle,
        gutter_left: f64,
        narrowed: HalfBounds,
    ) -> Result<()> {
        let content = narrowed.shrink(&[&style.block.border, &style.block.padding]);
        let mut top = content.top;
        let mut line_height = style.text.font_size;

        // Align with the first line of the first child's content box.
        if let Some(first) = item.children.first().filter(|c| c.kind.is_block()) {
            let first_style = self.styler.style(first, &style.text);
            let block = &first_style.block;
            let first_content = content.shrink(&[&block.margin, &block.border, &block.padding]);
            top = first_content.top;
            line_height = first_style.text.font_size;
            if !first.has_block_children() {
                let elements = self.block_inlines(first, &first_style.text)?;
                let lines = inline::wrap_elements(canvas.measure(), first_content.width(), &elements);
                if let Some(line) = lines.first() {
                    line_height = inline::line_size(canvas.measure(), line).1;
                }
            }
        }

        let top = page_break::fit(canvas.measure(), top, line_height);
        let Some(rc) = canvas.render_context() else {
            return Ok(());
        };

        match marker.label() {
            Some(label) => {
                let text = TextElement::new(style.text.clone(), label);
                let y = top.position + (line_height - style.text.font_size) / 2.0;
                rc.draw_text(top.page, gutter_left, y, &text);
            }
            None => {
                rc.draw_bullet(
                    top.page,
                    gutter_left + BULLET_INSET,
                    top.position + line_height / 2.0,
                    style.text.color,
                    BULLET_RADIUS,
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DisplayList;
    use crate::model::PageConfig;

    fn list(ordered: bool, start: u32, items: usize) -> Node {
        let children = (0..items)
            .map(|_| Node::new(NodeKind::ListItem, vec![Node::paragraph("x")]))
            .collect();
        Node::new(NodeKind::List { ordered, start }, children)
    }

    fn format(family: &str, size: f64) -> TextFormat {
        TextFormat {
            font_family: family.into(),
            font_size: size,
            ..Default::default()
        }
    }

    #[test]
    fn test_gutter_keeps_minimum_for_short_ordinals() {
        let m = DisplayList::new(PageConfig::default());
        let courier = format("Courier", 10.0);
        assert_eq!(gutter_width(&m, &list(true, 1, 3), &courier), MARKER_GUTTER);
        assert_eq!(gutter_width(&m, &list(false, 1, 300), &courier), MARKER_GUTTER);
        assert_eq!(gutter_width(&m, &list(true, 1, 0), &courier), MARKER_GUTTER);
    }

    #[test]
    fn test_gutter_grows_to_widest_ordinal() {
        let m = DisplayList::new(PageConfig::default());
        // "10." in Courier 10 is 18pt.
        assert_eq!(gutter_width(&m, &list(true, 1, 10), &format("Courier", 10.0)), 22.0);
        assert_eq!(gutter_width(&m, &list(true, 98, 3), &format("Courier", 10.0)), 28.0);

        // "10." in Helvetica 12 is 16.68pt, wider than the minimum gutter.
        let helvetica = format("Helvetica", 12.0);
        let label = TextElement::new(helvetica.clone(), "10.");
        let gutter = gutter_width(&m, &list(true, 1, 12), &helvetica);
        assert!(gutter >= m.text_width(&label) + MARKER_GAP);
        assert!(gutter > MARKER_GUTTER);
    }

    #[test]
    fn test_ordinal_numbering_from_start() {
        assert_eq!(Marker::for_item(true, 1, 0), Marker::Ordinal(1));
        assert_eq!(Marker::for_item(true, 7, 2), Marker::Ordinal(9));
        assert_eq!(Marker::for_item(false, 7, 2), Marker::Bullet);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Marker::Ordinal(3).label().as_deref(), Some("3."));
        assert_eq!(Marker::Bullet.label(), None);
    }
}
