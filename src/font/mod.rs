//! # Font Management
//!
//! Text measurement for the reference backend. The standard families
//! (Helvetica, Times, Courier and their common aliases) are measured from
//! built-in width tables and need no font data. Custom TrueType/OpenType
//! fonts are parsed with ttf-parser.

pub mod metrics;

pub use metrics::StandardFontMetrics;
use std::collections::HashMap;

use crate::error::RenderError;
use crate::model::FontEntry;
use crate::style::TextFormat;

/// A font registry that maps family + weight + style to custom font metrics.
#[derive(Debug, Clone, Default)]
pub struct FontRegistry {
    fonts: HashMap<FontKey, CustomFontMetrics>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
        })
    }
}

/// The standard families, after alias resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFamily {
    Helvetica,
    Times,
    Courier,
}

impl StandardFamily {
    /// Map a family name to a standard family. Unknown names fall back to
    /// Helvetica.
    pub fn from_name(family: &str) -> Self {
        match family.to_ascii_lowercase().as_str() {
            "times" | "times-roman" | "times new roman" | "serif" => StandardFamily::Times,
            "courier" | "courier new" | "monospace" => StandardFamily::Courier,
            _ => StandardFamily::Helvetica,
        }
    }

    pub fn metrics(&self, bold: bool) -> &'static StandardFontMetrics {
        match (self, bold) {
            (StandardFamily::Helvetica, false) => &metrics::HELVETICA,
            (StandardFamily::Helvetica, true) => &metrics::HELVETICA_BOLD,
            // Times bold is measured with the roman widths.
            (StandardFamily::Times, _) => &metrics::TIMES_ROMAN,
            (StandardFamily::Courier, _) => &metrics::COURIER,
        }
    }
}

/// Metrics resolved for one text run.
#[derive(Debug, Clone, Copy)]
pub enum FontMetrics<'a> {
    Standard(&'static StandardFontMetrics),
    Custom(&'a CustomFontMetrics),
}

impl FontMetrics<'_> {
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        match self {
            FontMetrics::Standard(m) => m.char_width(ch, font_size),
            FontMetrics::Custom(m) => m.char_width(ch, font_size),
        }
    }

    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a custom font, trying the exact weight first, then the weight
    /// snapped to regular/bold.
    pub fn resolve(&self, family: &str, weight: u32, italic: bool) -> Option<&CustomFontMetrics> {
        let key = FontKey {
            family: family.to_string(),
            weight,
            italic,
        };
        if let Some(font) = self.fonts.get(&key) {
            return Some(font);
        }

        let snapped_weight = if weight >= 600 { 700 } else { 400 };
        let key = FontKey {
            family: family.to_string(),
            weight: snapped_weight,
            italic,
        };
        if let Some(font) = self.fonts.get(&key) {
            return Some(font);
        }

        // A family registered in one style measures every style.
        self.fonts
            .iter()
            .find(|(k, _)| k.family == family)
            .map(|(_, font)| font)
    }

    /// Register a custom font.
    pub fn register(
        &mut self,
        family: &str,
        weight: u32,
        italic: bool,
        data: &[u8],
    ) -> Result<(), RenderError> {
        let metrics = CustomFontMetrics::from_font_data(data).ok_or_else(|| {
            RenderError::Font(format!(
                "'{}' is not a valid TrueType/OpenType font",
                family
            ))
        })?;
        self.fonts.insert(
            FontKey {
                family: family.to_string(),
                weight,
                italic,
            },
            metrics,
        );
        Ok(())
    }
}

/// Shared font context used by the display list backend.
#[derive(Debug, Clone, Default)]
pub struct FontContext {
    registry: FontRegistry,
}

impl FontContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the metrics for a family, weight and style.
    pub fn resolve(&self, family: &str, weight: u32, italic: bool) -> FontMetrics<'_> {
        match self.registry.resolve(family, weight, italic) {
            Some(custom) => FontMetrics::Custom(custom),
            None => FontMetrics::Standard(StandardFamily::from_name(family).metrics(weight >= 600)),
        }
    }

    /// Metrics for the font a text format selects.
    pub fn for_format(&self, format: &TextFormat) -> FontMetrics<'_> {
        let weight = if format.bold { 700 } else { 400 };
        self.resolve(&format.font_family, weight, format.italic)
    }

    /// Register a font from raw TrueType/OpenType bytes.
    pub fn register(
        &mut self,
        family: &str,
        weight: u32,
        italic: bool,
        data: &[u8],
    ) -> Result<(), RenderError> {
        self.registry.register(family, weight, italic, data)
    }

    /// Register a font from a document entry whose `src` is base64 or a
    /// base64 data URI.
    pub fn register_entry(&mut self, entry: &FontEntry) -> Result<(), RenderError> {
        use base64::Engine;

        let payload = match entry.src.split_once(";base64,") {
            Some((_, b64)) => b64,
            None => entry.src.as_str(),
        };
        let data = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| RenderError::Font(format!("'{}': {}", entry.family, e)))?;
        self.register(&entry.family, entry.weight, entry.italic, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sans(bold: bool) -> TextFormat {
        TextFormat {
            font_family: "Helvetica".into(),
            font_size: 12.0,
            bold,
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_family_measures_as_helvetica() {
        let ctx = FontContext::new();
        let unknown = TextFormat {
            font_family: "NoSuchFont".into(),
            ..sans(false)
        };
        assert!((ctx.for_format(&sans(false)).char_width(' ', 12.0) - 3.336).abs() < 1e-9);
        assert_eq!(
            ctx.for_format(&unknown).measure_string("Layout", 12.0),
            ctx.for_format(&sans(false)).measure_string("Layout", 12.0)
        );
    }

    #[test]
    fn test_heavy_weights_resolve_to_bold() {
        let ctx = FontContext::new();
        let bold = ctx.for_format(&sans(true)).char_width('A', 12.0);
        assert!(bold > ctx.for_format(&sans(false)).char_width('A', 12.0));
        assert_eq!(ctx.resolve("Helvetica", 800, false).char_width('A', 12.0), bold);
        assert_eq!(ctx.resolve("Helvetica", 500, false).char_width('A', 12.0), ctx.for_format(&sans(false)).char_width('A', 12.0));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(StandardFamily::from_name("Arial"), StandardFamily::Helvetica);
        assert_eq!(StandardFamily::from_name("monospace"), StandardFamily::Courier);
        assert_eq!(StandardFamily::from_name("Serif"), StandardFamily::Times);
    }

    #[test]
    fn test_for_format_uses_bold() {
        let ctx = FontContext::new();
        let mut format = TextFormat {
            font_family: "Helvetica".into(),
            font_size: 10.0,
            ..Default::default()
        };
        let regular = ctx.for_format(&format).measure_string("m", 10.0);
        format.bold = true;
        let bold = ctx.for_format(&format).measure_string("m", 10.0);
        assert!((regular - 8.33).abs() < 1e-9);
        assert!((bold - 8.89).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_custom_font() {
        let mut ctx = FontContext::new();
        let err = ctx.register("Broken", 400, false, b"not a font").unwrap_err();
        assert!(matches!(err, RenderError::Font(_)));
        assert!(matches!(ctx.resolve("Broken", 400, false), FontMetrics::Standard(_)));

        let entry = FontEntry {
            family: "Broken".into(),
            src: "data:font/ttf;base64,!!!".into(),
            weight: 400,
            italic: false,
        };
        assert!(ctx.register_entry(&entry).is_err());
    }
}
