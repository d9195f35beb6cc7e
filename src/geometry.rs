//! # Page-Aware Geometry
//!
//! Vertical positions are always qualified by a page index. A [`Rect`] may
//! start on one page and end on a later one; comparing coordinates across
//! pages goes through [`VerticalCoord::less_than`] and nothing else.

use serde::Serialize;

use crate::style::Spacer;

/// Slack allowed when deciding whether a width or height fits. Box edges are
/// derived by adding and subtracting chrome, so a box sized to its content
/// can come out a few ulps narrower than the content itself.
pub const EPSILON: f64 = 1e-6;

/// A position within the paginated flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VerticalCoord {
    pub page: usize,
    pub position: f64,
}

impl VerticalCoord {
    pub fn new(page: usize, position: f64) -> Self {
        Self { page, position }
    }

    /// Page first, then position within the same page.
    pub fn less_than(&self, other: &VerticalCoord) -> bool {
        if self.page == other.page {
            return self.position < other.position;
        }
        self.page < other.page
    }

    /// The later of two coordinates.
    pub fn max(self, other: VerticalCoord) -> VerticalCoord {
        if self.less_than(&other) {
            other
        } else {
            self
        }
    }

    /// Shift within the same page.
    pub fn offset(self, dy: f64) -> VerticalCoord {
        VerticalCoord {
            page: self.page,
            position: self.position + dy,
        }
    }
}

/// A box whose bottom is not known yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HalfBounds {
    pub left: f64,
    pub right: f64,
    pub top: VerticalCoord,
}

impl HalfBounds {
    pub fn new(left: f64, right: f64, top: VerticalCoord) -> Self {
        Self { left, right, top }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Move left, right and top inward by every spacer in turn.
    pub fn shrink(mut self, spacers: &[&dyn Spacer]) -> Self {
        for s in spacers {
            let (left, top, right, _) = s.space();
            self.left += left;
            self.top.position += top;
            self.right -= right;
        }
        self
    }

    /// Inverse of [`HalfBounds::shrink`].
    pub fn expand(mut self, spacers: &[&dyn Spacer]) -> Self {
        for s in spacers {
            let (left, top, right, _) = s.space();
            self.left -= left;
            self.top.position -= top;
            self.right += right;
        }
        self
    }

    pub fn to_rect(self, bottom: VerticalCoord) -> Rect {
        Rect {
            left: self.left,
            right: self.right,
            top: self.top,
            bottom,
        }
    }
}

/// A fully resolved box that may span several pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub left: f64,
    pub right: f64,
    pub top: VerticalCoord,
    pub bottom: VerticalCoord,
}

impl Rect {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn spans_pages(&self) -> bool {
        self.top.page != self.bottom.page
    }

    /// Move all four edges inward by every spacer in turn.
    pub fn shrink(mut self, spacers: &[&dyn Spacer]) -> Self {
        for s in spacers {
            let (left, top, right, bottom) = s.space();
            self.left += left;
            self.top.position += top;
            self.right -= right;
            self.bottom.position -= bottom;
        }
        self
    }

    /// Inverse of [`Rect::shrink`].
    pub fn expand(mut self, spacers: &[&dyn Spacer]) -> Self {
        for s in spacers {
            let (left, top, right, bottom) = s.space();
            self.left -= left;
            self.top.position -= top;
            self.right += right;
            self.bottom.position += bottom;
        }
        self
    }

    pub fn to_half_bounds(self) -> HalfBounds {
        HalfBounds {
            left: self.left,
            right: self.right,
            top: self.top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Border, BorderEdge, Color, IndividualBorder, Spacing};

    fn approx_eq(a: &Rect, b: &Rect) -> bool {
        const EPS: f64 = 1e-9;
        (a.left - b.left).abs() < EPS
            && (a.right - b.right).abs() < EPS
            && a.top.page == b.top.page
            && (a.top.position - b.top.position).abs() < EPS
            && a.bottom.page == b.bottom.page
            && (a.bottom.position - b.bottom.position).abs() < EPS
    }

    #[test]
    fn test_less_than_compares_page_first() {
        let a = VerticalCoord::new(0, 700.0);
        let b = VerticalCoord::new(1, 10.0);
        assert!(a.less_than(&b));
        assert!(!b.less_than(&a));
    }

    #[test]
    fn test_less_than_same_page() {
        let a = VerticalCoord::new(2, 10.0);
        let b = VerticalCoord::new(2, 20.0);
        assert!(a.less_than(&b));
        assert!(!b.less_than(&a));
        assert!(!a.less_than(&a));
    }

    #[test]
    fn test_max_uses_page_ordering() {
        let a = VerticalCoord::new(0, 800.0);
        let b = VerticalCoord::new(1, 60.0);
        assert_eq!(a.max(b), b);
        assert_eq!(b.max(a), b);
    }

    #[test]
    fn test_shrink_expand_inverse() {
        let rect = Rect {
            left: 10.0,
            right: 300.0,
            top: VerticalCoord::new(0, 40.0),
            bottom: VerticalCoord::new(2, 120.5),
        };
        let margin = Spacing {
            top: 3.0,
            right: 1.5,
            bottom: 7.25,
            left: 2.0,
        };
        let border = Border::uniform(1.0, Color::BLACK, 4.0);
        let edges = Border::Individual(IndividualBorder {
            left: BorderEdge {
                width: 10.0,
                color: Color::BLACK,
            },
            ..Default::default()
        });
        let padding = Spacing::uniform(0.1);
        let spacers: [&dyn Spacer; 4] = [&margin, &border, &edges, &padding];

        let shrunk = rect.shrink(&spacers);
        assert!((shrunk.left - (10.0 + 2.0 + 1.0 + 10.0 + 0.1)).abs() < 1e-9);
        assert!(approx_eq(&shrunk.expand(&spacers), &rect));
    }

    #[test]
    fn test_half_bounds_shrink() {
        let hb = HalfBounds::new(0.0, 100.0, VerticalCoord::new(1, 50.0));
        let padding = Spacing::symmetric(5.0, 10.0);
        let shrunk = hb.shrink(&[&padding]);
        assert_eq!(shrunk.width(), 80.0);
        assert_eq!(shrunk.top, VerticalCoord::new(1, 55.0));
        assert_eq!(shrunk.expand(&[&padding]), hb);
    }

    #[test]
    fn test_rect_spanning_pages() {
        let hb = HalfBounds::new(0.0, 10.0, VerticalCoord::new(0, 700.0));
        let rect = hb.to_rect(VerticalCoord::new(1, 100.0));
        assert!(rect.spans_pages());
        assert!(rect.top.less_than(&rect.bottom));
        assert_eq!(rect.to_half_bounds(), hb);
    }
}
