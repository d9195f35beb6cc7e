//! # Quire
//!
//! A paginated layout engine for block/inline document trees.
//!
//! Quire takes a tree of block nodes (paragraphs, headings, lists, tables,
//! code blocks, quotes) holding inline runs (text, emphasis, links, images)
//! and turns it into absolutely positioned drawing primitives, page by
//! page. Geometry is computed before anything is drawn, content flows across
//! page boundaries line by line, and tables keep the cells of a row at one
//! height.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]     Document tree: block and inline nodes
//!       ↓
//!   [style]     Styler maps each node to box + text styles
//!       ↓
//!   [layout]    Measure-then-draw block layout, inline wrap, tables, lists
//!       ↓
//!   [backend]   MeasureContext / RenderContext; DisplayList records pages
//! ```
//!
//! The layout engine only talks to the [`backend::MeasureContext`] and
//! [`backend::RenderContext`] traits. [`backend::DisplayList`] is the
//! bundled implementation; an output writer for a real page format
//! implements the same traits.

pub mod backend;
pub mod error;
pub mod font;
pub mod geometry;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod style;

use std::sync::Arc;

use backend::{DisplayList, Page};
use error::Result;
use font::FontContext;
use image_loader::{DefaultImageLoader, ImageLoader};
use layout::{Canvas, LayoutEngine, Phase};
use model::{Document, FontEntry, Node, PageConfig};
use style::{DefaultStyler, Styler};

/// Lays node trees out onto pages with a configurable styler, image loader,
/// page geometry and fonts.
pub struct Renderer {
    styler: Box<dyn Styler>,
    images: Box<dyn ImageLoader>,
    page: PageConfig,
    fonts: Arc<FontContext>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            styler: Box::new(DefaultStyler::default()),
            images: Box::new(DefaultImageLoader::default()),
            page: PageConfig::default(),
            fonts: Arc::new(FontContext::new()),
        }
    }

    pub fn with_styler(mut self, styler: impl Styler + 'static) -> Self {
        self.styler = Box::new(styler);
        self
    }

    pub fn with_image_loader(mut self, images: impl ImageLoader + 'static) -> Self {
        self.images = Box::new(images);
        self
    }

    pub fn with_page(mut self, page: PageConfig) -> Self {
        self.page = page;
        self
    }

    /// Register the custom fonts a document declares.
    pub fn with_document_fonts(mut self, fonts: &[FontEntry]) -> Result<Self> {
        for entry in fonts {
            Arc::make_mut(&mut self.fonts).register_entry(entry)?;
        }
        Ok(self)
    }

    /// Register a custom TrueType/OpenType font from raw bytes.
    pub fn register_font(
        &mut self,
        family: &str,
        weight: u32,
        italic: bool,
        data: &[u8],
    ) -> Result<()> {
        Arc::make_mut(&mut self.fonts).register(family, weight, italic, data)
    }

    pub fn page(&self) -> &PageConfig {
        &self.page
    }

    /// Lay `root` out and return the drawn pages; always at least one.
    pub fn render(&self, root: &Node) -> Result<Vec<Page>> {
        let mut backend = DisplayList::with_fonts(self.page, Arc::clone(&self.fonts));
        let engine = LayoutEngine::new(self.styler.as_ref(), self.images.as_ref());
        let (left, right) = self.page.horizontal_bounds();

        let mut canvas = Canvas::new(&mut backend, Phase::Drawing);
        let rect = engine.layout_root(&mut canvas, root, left, right)?;

        let pages = backend.into_pages();
        log::debug!(
            "rendered {} page(s), content ends on page {} at y={:.2}",
            pages.len(),
            rect.bottom.page,
            rect.bottom.position
        );
        Ok(pages)
    }
}

/// Render a document with the default styler and image loader, using the
/// document's own page geometry and fonts.
pub fn render_document(document: &Document) -> Result<Vec<Page>> {
    Renderer::new()
        .with_page(document.page)
        .with_document_fonts(&document.fonts)?
        .render(&document.root)
}

/// Render a document described as JSON.
pub fn render_json(json: &str) -> Result<Vec<Page>> {
    let document: Document = serde_json::from_str(json)?;
    render_document(&document)
}
