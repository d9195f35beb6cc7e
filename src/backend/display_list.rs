//! # Display List Backend
//!
//! Records every draw call as a [`DrawCommand`] on its [`Page`]. The result
//! is plain data: serialize it, diff it in tests, or feed it to a real
//! output writer.
//!
//! Pages are created on demand when a draw call references them, so the
//! layout engine can flow onto page `n + 1` without asking first.

use std::sync::Arc;

use serde::Serialize;
use unicode_linebreak::linebreaks;

use super::{MeasureContext, RenderContext};
use crate::font::FontContext;
use crate::geometry::{Rect, EPSILON};
use crate::layout::inline::{ImageElement, ImageType, TextElement};
use crate::model::PageConfig;
use crate::style::{Border, Color};

/// One laid-out page.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

/// A positioned drawing primitive. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum DrawCommand {
    Text {
        x: f64,
        y: f64,
        width: f64,
        text: String,
        font_family: String,
        font_size: f64,
        bold: bool,
        italic: bool,
        underline: bool,
        strike: bool,
        color: Color,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        name: String,
        image_type: ImageType,
    },
    /// A filled circle centered at `(x, y)`.
    Bullet {
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
    },
    /// One page's segment of a box. Continuation segments have open edges
    /// where the box carries on to the previous or next page.
    Box {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        background: Option<Color>,
        border: Border,
        open_top: bool,
        open_bottom: bool,
    },
}

/// A recording [`RenderContext`].
#[derive(Debug)]
pub struct DisplayList {
    config: PageConfig,
    fonts: Arc<FontContext>,
    pages: Vec<Page>,
}

impl DisplayList {
    pub fn new(config: PageConfig) -> Self {
        Self::with_fonts(config, Arc::new(FontContext::new()))
    }

    pub fn with_fonts(config: PageConfig, fonts: Arc<FontContext>) -> Self {
        Self {
            config,
            fonts,
            pages: Vec::new(),
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// The recorded pages; always at least one, even for an empty document.
    pub fn into_pages(mut self) -> Vec<Page> {
        if self.pages.is_empty() {
            self.page_mut(0);
        }
        self.pages
    }

    fn page_mut(&mut self, index: usize) -> &mut Page {
        let (width, height) = self.config.size.dimensions();
        while self.pages.len() <= index {
            let next = self.pages.len();
            self.pages.push(Page {
                index: next,
                width,
                height,
                commands: Vec::new(),
            });
        }
        &mut self.pages[index]
    }

    fn push(&mut self, page: usize, command: DrawCommand) {
        self.page_mut(page).commands.push(command);
    }
}

impl MeasureContext for DisplayList {
    fn text_width(&self, text: &TextElement) -> f64 {
        self.fonts
            .for_format(&text.format)
            .measure_string(&text.text, text.format.font_size)
    }

    fn sub_text(&self, text: &TextElement, max_width: f64) -> Option<TextElement> {
        if self.text_width(text) <= max_width + EPSILON {
            return Some(text.clone());
        }

        let metrics = self.fonts.for_format(&text.format);
        let mut best = None;
        for (offset, _) in linebreaks(&text.text) {
            let candidate = &text.text[..offset];
            let candidate = candidate.strip_suffix(' ').unwrap_or(candidate);
            if candidate.is_empty() {
                continue;
            }
            if metrics.measure_string(candidate, text.format.font_size) > max_width + EPSILON {
                break;
            }
            best = Some(candidate);
        }

        best.map(|prefix| TextElement {
            format: text.format.clone(),
            text: prefix.to_string(),
        })
    }

    fn page_vertical_bounds(&self, _page: usize) -> (f64, f64) {
        self.config.vertical_bounds()
    }
}

impl RenderContext for DisplayList {
    fn draw_text(&mut self, page: usize, x: f64, y: f64, text: &TextElement) {
        let format = &text.format;
        let width = self.text_width(text);

        if format.background_color.is_some() || !format.border.is_none() {
            self.push(
                page,
                DrawCommand::Box {
                    x,
                    y,
                    width,
                    height: format.font_size,
                    background: format.background_color,
                    border: format.border,
                    open_top: false,
                    open_bottom: false,
                },
            );
        }

        self.push(
            page,
            DrawCommand::Text {
                x,
                y,
                width,
                text: text.text.clone(),
                font_family: format.font_family.clone(),
                font_size: format.font_size,
                bold: format.bold,
                italic: format.italic,
                underline: format.underline,
                strike: format.strike,
                color: format.color,
            },
        );
    }

    fn draw_image(&mut self, page: usize, x: f64, y: f64, image: &ImageElement) {
        self.push(
            page,
            DrawCommand::Image {
                x,
                y,
                width: image.width,
                height: image.height,
                name: image.name.clone(),
                image_type: image.image_type,
            },
        );
    }

    fn draw_bullet(&mut self, page: usize, x: f64, y: f64, color: Color, radius: f64) {
        self.push(page, DrawCommand::Bullet { x, y, radius, color });
    }

    fn draw_box(&mut self, rect: &Rect, background: Option<Color>, border: &Border) {
        let background = background.filter(Color::is_visible);
        if background.is_none() && border.is_none() {
            return;
        }

        let (page_top, page_bottom) = self.config.vertical_bounds();
        for page in rect.top.page..=rect.bottom.page {
            let top = if page == rect.top.page {
                rect.top.position
            } else {
                page_top
            };
            let bottom = if page == rect.bottom.page {
                rect.bottom.position
            } else {
                page_bottom
            };
            self.push(
                page,
                DrawCommand::Box {
                    x: rect.left,
                    y: top,
                    width: rect.width(),
                    height: bottom - top,
                    background,
                    border: *border,
                    open_top: page != rect.top.page,
                    open_bottom: page != rect.bottom.page,
                },
            );
        }
    }
}
