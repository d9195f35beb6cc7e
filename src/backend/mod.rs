//! # Backend Interfaces
//!
//! The layout engine never touches fonts or pages directly. It asks a
//! [`MeasureContext`] how big things are and, in the drawing phase only,
//! tells a [`RenderContext`] where to put them. Every draw call carries its
//! full format, so a backend never needs to track "current" drawing state.
//!
//! [`DisplayList`] is the reference backend: it records draw calls into
//! serializable pages.

pub mod display_list;

pub use display_list::{DisplayList, DrawCommand, Page};

use crate::geometry::Rect;
use crate::layout::inline::{ImageElement, TextElement};
use crate::style::{Border, Color};

/// Size queries. Must be free of side effects.
pub trait MeasureContext {
    /// Advance width of a text run in its own format.
    fn text_width(&self, text: &TextElement) -> f64;

    /// The longest prefix of `text` that fits in `max_width`, ending at a
    /// line break opportunity. The separating whitespace is left on the
    /// remainder, so the caller's remainder is `text[prefix.len()..]`.
    ///
    /// Returns the whole element when it fits and `None` when no non-empty
    /// prefix does.
    fn sub_text(&self, text: &TextElement, max_width: f64) -> Option<TextElement>;

    /// The usable `(top, bottom)` range of a page.
    fn page_vertical_bounds(&self, page: usize) -> (f64, f64);
}

/// Drawing primitives. Coordinates grow downward from the page's top edge;
/// `(x, y)` is the top-left corner of the drawn element.
pub trait RenderContext: MeasureContext {
    fn draw_text(&mut self, page: usize, x: f64, y: f64, text: &TextElement);

    fn draw_image(&mut self, page: usize, x: f64, y: f64, image: &ImageElement);

    /// A filled circle centered at `(x, y)`.
    fn draw_bullet(&mut self, page: usize, x: f64, y: f64, color: Color, radius: f64);

    /// Background and border of a box. The box may span pages.
    fn draw_box(&mut self, rect: &Rect, background: Option<Color>, border: &Border);
}
