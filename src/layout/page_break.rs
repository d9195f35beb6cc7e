//! # Page Break Decisions
//!
//! Every unit that advances the vertical cursor (a line, a list marker, a
//! table row) asks here whether it still fits on its page. A unit that
//! would cross the bottom bound moves to the top of the next page, unless
//! it already sits at the top of its page: moving it again would only
//! produce a blank page.

use crate::backend::MeasureContext;
use crate::geometry::{VerticalCoord, EPSILON};

/// Where a unit of `height` starting at `top` should actually start.
pub fn fit<M: MeasureContext + ?Sized>(measure: &M, top: VerticalCoord, height: f64) -> VerticalCoord {
    let (_, page_bottom) = measure.page_vertical_bounds(top.page);
    if top.position + height <= page_bottom + EPSILON || at_page_top(measure, top) {
        return top;
    }
    let next = next_page_top(measure, top.page);
    log::debug!(
        "page break: {:.2}pt unit at page {} y={:.2} moves to page {}",
        height,
        top.page,
        top.position,
        next.page
    );
    next
}

/// Whether `coord` is at (or above) the top bound of its page.
pub fn at_page_top<M: MeasureContext + ?Sized>(measure: &M, coord: VerticalCoord) -> bool {
    let (page_top, _) = measure.page_vertical_bounds(coord.page);
    coord.position <= page_top + EPSILON
}

/// The top bound of the page after `page`.
pub fn next_page_top<M: MeasureContext + ?Sized>(measure: &M, page: usize) -> VerticalCoord {
    let (page_top, _) = measure.page_vertical_bounds(page + 1);
    VerticalCoord::new(page + 1, page_top)
}
