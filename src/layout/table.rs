//! # Table Layout
//!
//! Tables are laid out in three steps:
//!
//! 1. **Natural widths**: for the auto strategies, every cell's inline
//!    content is measured unwrapped; each column keeps its widest cell.
//! 2. **Column widths**: the [`TableLayout`] strategy turns natural widths
//!    into content widths that fit the table's available width.
//! 3. **Rows**: each row measures all of its cells, takes the lowest bottom,
//!    draws its own box, then lays every cell out again with that bottom
//!    forced so all cells of a row share one height.
//!
//! A row that would straddle a page break moves to the next page when it
//! fits there whole. Rows taller than a page stay put and their cells break
//! line by line.

use super::{inline, page_break, Canvas, LayoutEngine, Phase};
use crate::backend::MeasureContext;
use crate::error::Result;
use crate::geometry::{HalfBounds, Rect};
use crate::model::{Node, NodeKind};
use crate::style::{ResolvedStyle, Spacer, TableLayout};

/// A row with its resolved style.
struct Row<'n> {
    node: &'n Node,
    style: ResolvedStyle,
}

fn is_row(node: &Node) -> bool {
    matches!(node.kind, NodeKind::TableHeader | NodeKind::TableRow)
}

fn is_cell(node: &Node) -> bool {
    matches!(node.kind, NodeKind::TableCell { .. })
}

fn cells(row: &Node) -> impl Iterator<Item = &Node> {
    row.children.iter().filter(|c| is_cell(c))
}

/// Horizontal space a box takes beyond its content.
fn chrome(style: &ResolvedStyle) -> f64 {
    let block = &style.block;
    block.margin.horizontal() + block.border.horizontal() + block.padding.horizontal()
}

/// Number of columns: one per alignment, or the widest row when the table
/// declares none.
pub fn column_count(table: &Node) -> usize {
    match &table.kind {
        NodeKind::Table { alignments } if !alignments.is_empty() => alignments.len(),
        _ => table
            .children
            .iter()
            .filter(|c| is_row(c))
            .map(|row| cells(row).count())
            .max()
            .unwrap_or(0),
    }
}

/// Scale natural widths to the available width per `strategy`.
pub fn distribute(strategy: TableLayout, natural: &[f64], available: f64) -> Vec<f64> {
    let columns = natural.len();
    if columns == 0 {
        return Vec::new();
    }
    let even = vec![available / columns as f64; columns];
    let total: f64 = natural.iter().sum();

    match strategy {
        TableLayout::Evenly => even,
        TableLayout::AutoFilled if total > 0.0 => {
            natural.iter().map(|w| w * available / total).collect()
        }
        TableLayout::AutoFilled => even,
        TableLayout::AutoCompact if total > available => {
            natural.iter().map(|w| w * available / total).collect()
        }
        TableLayout::AutoCompact => natural.to_vec(),
    }
}

impl LayoutEngine<'_> {
    pub(crate) fn layout_table(
        &self,
        canvas: &mut Canvas<'_>,
        table: &Node,
        style: &ResolvedStyle,
        bounds: HalfBounds,
    ) -> Result<Rect> {
        let rows: Vec<Row<'_>> = table
            .children
            .iter()
            .filter(|child| {
                let keep = is_row(child);
                if !keep {
                    log::debug!("table: skipping {} child", child.kind.name());
                }
                keep
            })
            .map(|node| Row {
                node,
                style: self.styler.style(node, &style.text),
            })
            .collect();

        let spacers: [&dyn Spacer; 2] = [&style.block.border, &style.block.padding];
        let content = bounds.shrink(&spacers);
        let columns = column_count(table);
        let widths = self.column_widths(canvas.measure(), &rows, columns, style.block.table_layout, content.width())?;

        self.decorate(canvas, &style.block, bounds, None, |canvas: &mut Canvas<'_>| {
            let mut cursor = content.top;
            for row in &rows {
                let margin = row.style.block.margin;
                let row_bounds = HalfBounds::new(content.left, content.right, cursor).shrink(&[&margin]);
                let rect = self.layout_row(canvas, row, row_bounds, &widths)?;
                cursor = rect.bottom.offset(margin.bottom);
            }
            Ok(content.to_rect(cursor).expand(&spacers))
        })
    }

    /// Content width of every column.
    fn column_widths<M: MeasureContext + ?Sized>(
        &self,
        measure: &M,
        rows: &[Row<'_>],
        columns: usize,
        strategy: TableLayout,
        content_width: f64,
    ) -> Result<Vec<f64>> {
        let Some(first_row) = rows.first() else {
            return Ok(vec![0.0; columns]);
        };
        let first_cell_chrome = cells(first_row.node)
            .next()
            .map_or(0.0, |cell| chrome(&self.styler.style(cell, &first_row.style.text)));
        let available =
            (content_width - chrome(&first_row.style) - columns as f64 * first_cell_chrome).max(0.0);

        let natural = match strategy {
            TableLayout::Evenly => vec![0.0; columns],
            TableLayout::AutoFilled | TableLayout::AutoCompact => self.natural_widths(measure, rows, columns)?,
        };
        Ok(distribute(strategy, &natural, available))
    }

    fn natural_widths<M: MeasureContext + ?Sized>(
        &self,
        measure: &M,
        rows: &[Row<'_>],
        columns: usize,
    ) -> Result<Vec<f64>> {
        let mut widths = vec![0.0_f64; columns];
        for row in rows {
            for (i, cell) in cells(row.node).take(columns).enumerate() {
                let cell_style = self.styler.style(cell, &row.style.text);
                let elements = self.deep_inlines(cell, &cell_style.text)?;
                widths[i] = widths[i].max(inline::natural_width(measure, &elements));
            }
        }
        Ok(widths)
    }

    /// Lay out one row, moving it to the next page first when it would
    /// straddle a break but fits on a fresh page.
    fn layout_row(
        &self,
        canvas: &mut Canvas<'_>,
        row: &Row<'_>,
        bounds: HalfBounds,
        widths: &[f64],
    ) -> Result<Rect> {
        let mut bounds = bounds;
        let mut measured = self.row_body(&mut canvas.measuring(), row, bounds, widths)?;
        if measured.spans_pages() && !page_break::at_page_top(canvas.measure(), bounds.top) {
            let moved = HalfBounds {
                top: page_break::next_page_top(canvas.measure(), bounds.top.page),
                ..bounds
            };
            let remeasured = self.row_body(&mut canvas.measuring(), row, moved, widths)?;
            if !remeasured.spans_pages() {
                log::debug!("table: row moves to page {}", moved.top.page);
                bounds = moved;
                measured = remeasured;
            }
        }

        // The measured rect is final; only a drawing pass lays the row out again.
        if canvas.phase() == Phase::Measuring {
            return Ok(measured);
        }
        self.decorate(canvas, &row.style.block, bounds, Some(measured.bottom), |canvas: &mut Canvas<'_>| {
            self.row_body(canvas, row, bounds, widths)
        })
    }

    fn row_body(
        &self,
        canvas: &mut Canvas<'_>,
        row: &Row<'_>,
        bounds: HalfBounds,
        widths: &[f64],
    ) -> Result<Rect> {
        let spacers: [&dyn Spacer; 2] = [&row.style.block.border, &row.style.block.padding];
        let content = bounds.shrink(&spacers);

        let mut placed = Vec::with_capacity(widths.len());
        let mut x = content.left;
        for (cell, width) in cells(row.node).zip(widths.iter().copied()) {
            let style = self.styler.style(cell, &row.style.text);
            let block = &style.block;
            let left = x + block.margin.left;
            let right = left + block.border.horizontal() + block.padding.horizontal() + width;
            let cell_bounds = HalfBounds::new(left, right, content.top.offset(block.margin.top));
            x += width + chrome(&style);
            placed.push((cell, style, cell_bounds));
        }

        let mut bottom = content.top;
        let mut margin_bottom = 0.0_f64;
        for (cell, style, cell_bounds) in &placed {
            let rect = self.layout_generic(&mut canvas.measuring(), cell, style, *cell_bounds, None)?;
            bottom = bottom.max(rect.bottom);
            margin_bottom = margin_bottom.max(style.block.margin.bottom);
        }

        if canvas.phase() == Phase::Drawing {
            for (cell, style, cell_bounds) in &placed {
                self.layout_generic(canvas, cell, style, *cell_bounds, Some(bottom))?;
            }
        }

        Ok(content.to_rect(bottom.offset(margin_bottom)).expand(&spacers))
    }
}
