//! # Image Loading
//!
//! Resolves the `src` of an inline image node to an [`ImageElement`]: the
//! raw bytes plus the format and pixel dimensions the layout needs. One pixel
//! is laid out as one point.
//!
//! Supported `src` formats:
//! - `data:image/...;base64,...` data URIs
//! - file paths starting with `/`, `./` or `../`
//!
//! Remote URLs are rejected; fetching is the caller's business (implement
//! [`ImageLoader`] for that).

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use thiserror::Error;

use crate::layout::inline::{ImageElement, ImageType};

/// Turns an image source into an element ready for layout.
///
/// `Ok(None)` means the image was skipped; the caller shows the alt text
/// instead.
pub trait ImageLoader {
    fn load_image(&self, src: &str) -> Result<Option<ImageElement>, ImageError>;
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid data URI: missing ';base64,' marker")]
    InvalidDataUri,
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to read image file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("unsupported image format (expected PNG, JPEG or GIF)")]
    UnsupportedFormat,
    #[error("unsupported image source '{0}'")]
    UnsupportedSource(String),
}

/// What [`DefaultImageLoader`] does when an image cannot be loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageErrorPolicy {
    /// Fail the render.
    #[default]
    Propagate,
    /// Log a warning and fall back to the alt text.
    Skip,
}

/// Loads data URIs and local files, caching every result by `src`.
#[derive(Debug, Default)]
pub struct DefaultImageLoader {
    policy: ImageErrorPolicy,
    cache: RefCell<HashMap<String, Option<ImageElement>>>,
}

impl DefaultImageLoader {
    pub fn new(policy: ImageErrorPolicy) -> Self {
        Self {
            policy,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> ImageErrorPolicy {
        self.policy
    }

    /// Number of distinct sources seen so far.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl ImageLoader for DefaultImageLoader {
    fn load_image(&self, src: &str) -> Result<Option<ImageElement>, ImageError> {
        if let Some(hit) = self.cache.borrow().get(src) {
            return Ok(hit.clone());
        }

        let name = self.cache.borrow().len().to_string();
        let loaded = read_source_bytes(src).and_then(|bytes| decode(name, bytes));
        match loaded {
            Ok(element) => {
                self.cache
                    .borrow_mut()
                    .insert(src.to_string(), Some(element.clone()));
                Ok(Some(element))
            }
            Err(e) if self.policy == ImageErrorPolicy::Skip => {
                log::warn!("Skipping image '{}': {}", src, e);
                self.cache.borrow_mut().insert(src.to_string(), None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Resolve the source string to raw image bytes.
fn read_source_bytes(src: &str) -> Result<Vec<u8>, ImageError> {
    // Data URI: data:image/png;base64,iVBOR...
    if let Some(rest) = src.strip_prefix("data:") {
        let (_, payload) = rest
            .split_once(";base64,")
            .ok_or(ImageError::InvalidDataUri)?;
        return base64_decode(payload);
    }

    // Only explicit path prefixes, so nothing that merely contains '/' is
    // taken for a file.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        return std::fs::read(src).map_err(|source| ImageError::Io {
            path: src.to_string(),
            source,
        });
    }

    Err(ImageError::UnsupportedSource(src.to_string()))
}

fn base64_decode(input: &str) -> Result<Vec<u8>, ImageError> {
    use base64::Engine;
    Ok(base64::engine::general_purpose::STANDARD.decode(input.trim())?)
}

/// Detect the format from magic bytes and read the dimensions without
/// decoding pixels.
fn decode(name: String, data: Vec<u8>) -> Result<ImageElement, ImageError> {
    let reader = image::io::Reader::new(Cursor::new(&data))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(image::ImageError::IoError(e)))?;

    let image_type = match reader.format() {
        Some(image::ImageFormat::Png) => ImageType::Png,
        Some(image::ImageFormat::Jpeg) => ImageType::Jpeg,
        Some(image::ImageFormat::Gif) => ImageType::Gif,
        _ => return Err(ImageError::UnsupportedFormat),
    };

    let (width, height) = reader.into_dimensions()?;

    Ok(ImageElement {
        name,
        image_type,
        width: width as f64,
        height: height as f64,
        bytes: Arc::from(data),
    })
}
