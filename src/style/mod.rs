//! # Style System
//!
//! The resolved styles the layout engine works with. There is no cascade
//! here: a [`Styler`] maps each node to a [`BlockStyle`] and an inherited
//! [`TextFormat`], and the engine only ever sees those resolved values.
//!
//! Margin, padding and borders all implement [`Spacer`], which is what the
//! box-model arithmetic in [`crate::geometry`] consumes.

mod styler;

pub use styler::{DefaultStyler, Styler};

use serde::{Deserialize, Serialize};

/// Anything that occupies space around a box edge: margins, padding and
/// borders (a border's stroke width is space too).
pub trait Spacer {
    /// Edge magnitudes as `(left, top, right, bottom)`.
    fn space(&self) -> (f64, f64, f64, f64);

    fn horizontal(&self) -> f64 {
        let (left, _, right, _) = self.space();
        left + right
    }

    fn vertical(&self) -> f64 {
        let (_, top, _, bottom) = self.space();
        top + bottom
    }

    fn bottom(&self) -> f64 {
        self.space().3
    }
}

/// Plain edge spacing used for margin and padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

impl Spacing {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

impl Spacer for Spacing {
    fn space(&self) -> (f64, f64, f64, f64) {
        (self.left, self.top, self.right, self.bottom)
    }
}

/// A border with the same width and color on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniformBorder {
    pub width: f64,
    pub color: Color,
    #[serde(default)]
    pub radius: f64,
}

impl Spacer for UniformBorder {
    fn space(&self) -> (f64, f64, f64, f64) {
        (self.width, self.width, self.width, self.width)
    }
}

/// One edge of an [`IndividualBorder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderEdge {
    pub width: f64,
    pub color: Color,
}

/// A border whose four edges are styled independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndividualBorder {
    #[serde(default)]
    pub left: BorderEdge,
    #[serde(default)]
    pub top: BorderEdge,
    #[serde(default)]
    pub right: BorderEdge,
    #[serde(default)]
    pub bottom: BorderEdge,
}

impl Spacer for IndividualBorder {
    fn space(&self) -> (f64, f64, f64, f64) {
        (
            self.left.width,
            self.top.width,
            self.right.width,
            self.bottom.width,
        )
    }
}

/// The border of a block box or an inline text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Border {
    #[default]
    None,
    Uniform(UniformBorder),
    Individual(IndividualBorder),
}

impl Border {
    pub fn uniform(width: f64, color: Color, radius: f64) -> Self {
        Border::Uniform(UniformBorder {
            width,
            color,
            radius,
        })
    }

    /// Corner radius; only uniform borders are rounded.
    pub fn radius(&self) -> f64 {
        match self {
            Border::Uniform(b) => b.radius,
            Border::None | Border::Individual(_) => 0.0,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Border::None)
    }
}

impl Spacer for Border {
    fn space(&self) -> (f64, f64, f64, f64) {
        match self {
            Border::None => (0.0, 0.0, 0.0, 0.0),
            Border::Uniform(b) => b.space(),
            Border::Individual(b) => b.space(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
}

/// How a table distributes its available width among columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableLayout {
    /// Equal columns, content ignored.
    Evenly,
    /// Columns proportional to their content, stretched or squeezed to fill
    /// the table exactly.
    AutoFilled,
    /// Columns proportional to their content, only ever squeezed.
    #[default]
    AutoCompact,
}

/// Character formatting of an inline run. Inherited down the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormat {
    pub color: Color,
    pub background_color: Option<Color>,
    pub font_size: f64,
    pub font_family: String,
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub underline: bool,
    pub border: Border,
}

/// Box properties of a block node. Not inherited.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlockStyle {
    pub margin: Spacing,
    pub padding: Spacing,
    pub border: Border,
    pub background_color: Option<Color>,
    pub text_align: TextAlign,
    pub table_layout: TableLayout,
}

/// Everything one styler call resolves for one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyle {
    pub block: BlockStyle,
    pub text: TextFormat,
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const BLUE: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// An opaque gray from an 8-bit level.
    pub fn gray(level: u8) -> Self {
        let v = level as f64 / 255.0;
        Self::rgb(v, v, v)
    }

    /// Whether drawing with this color has any visible effect.
    pub fn is_visible(&self) -> bool {
        self.a > 0.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_border_occupies_width_on_every_edge() {
        let border = Border::uniform(2.0, Color::BLACK, 3.0);
        assert_eq!(border.space(), (2.0, 2.0, 2.0, 2.0));
        assert_eq!(border.radius(), 3.0);
    }

    #[test]
    fn test_individual_border_edges() {
        let border = Border::Individual(IndividualBorder {
            left: BorderEdge {
                width: 10.0,
                color: Color::BLACK,
            },
            bottom: BorderEdge {
                width: 1.0,
                color: Color::BLACK,
            },
            ..Default::default()
        });
        assert_eq!(border.space(), (10.0, 0.0, 0.0, 1.0));
        assert_eq!(border.horizontal(), 10.0);
        assert_eq!(border.bottom(), 1.0);
        assert_eq!(border.radius(), 0.0);
    }

    #[test]
    fn test_no_border_takes_no_space() {
        assert_eq!(Border::None.vertical(), 0.0);
        assert!(Border::default().is_none());
    }

    #[test]
    fn test_spacing_order() {
        let s = Spacing {
            top: 1.0,
            right: 2.0,
            bottom: 3.0,
            left: 4.0,
        };
        assert_eq!(s.space(), (4.0, 1.0, 2.0, 3.0));
        assert_eq!(Spacing::symmetric(5.0, 7.0).horizontal(), 14.0);
    }
}
