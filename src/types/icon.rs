use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use super::errors::FaviconError;

/// Fixed 1x1 transparent PNG shown when no favicon could be fetched.
const PLACEHOLDER_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Ratio used when no display settings are supplied.
pub const DEFAULT_WIDE_ICON_ASPECT_RATIO: f64 = 1.5;

/// A decoded service icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icon {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub width: u32,
    pub height: u32,
    pub is_placeholder: bool,
}

impl Icon {
    /// Returns the "missing image" icon.
    pub fn placeholder() -> Self {
        Self {
            bytes: BASE64.decode(PLACEHOLDER_PNG_BASE64).unwrap_or_default(),
            content_type: "image/png".to_string(),
            width: 1,
            height: 1,
            is_placeholder: true,
        }
    }

    /// Decodes raw image bytes, keeping them as-is and recording the format and size.
    ///
    /// # Errors
    /// Returns `FaviconError::DecodeError` if the bytes are empty or not a
    /// supported image format.
    pub fn decode(bytes: Vec<u8>) -> Result<Self, FaviconError> {
        if bytes.is_empty() {
            return Err(FaviconError::DecodeError("empty image body".to_string()));
        }

        let format = image::guess_format(&bytes)
            .map_err(|e| FaviconError::DecodeError(e.to_string()))?;
        let decoded = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| FaviconError::DecodeError(e.to_string()))?;

        Ok(Self {
            content_type: format.to_mime_type().to_string(),
            width: decoded.width(),
            height: decoded.height(),
            bytes,
            is_placeholder: false,
        })
    }

    /// Width divided by height, `None` for a degenerate image.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height == 0 {
            return None;
        }
        Some(f64::from(self.width) / f64::from(self.height))
    }
}

/// How a presentation layer should scale an icon into its square slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconFit {
    /// Scale to fit entirely inside the slot (letterboxed).
    AspectFit,
    /// Scale to cover the slot, cropping overflow.
    AspectFill,
}

/// Display policy choosing an `IconFit` for wide icons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconDisplayPolicy {
    pub wide_icon_aspect_ratio: f64,
}

impl Default for IconDisplayPolicy {
    fn default() -> Self {
        Self {
            wide_icon_aspect_ratio: DEFAULT_WIDE_ICON_ASPECT_RATIO,
        }
    }
}

impl IconDisplayPolicy {
    pub fn new(wide_icon_aspect_ratio: f64) -> Self {
        Self {
            wide_icon_aspect_ratio,
        }
    }

    /// Icons wider than the threshold are fitted so they are not cropped away.
    pub fn fit_for(&self, icon: &Icon) -> IconFit {
        match icon.aspect_ratio() {
            Some(ratio) if ratio > self.wide_icon_aspect_ratio => IconFit::AspectFit,
            _ => IconFit::AspectFill,
        }
    }
}
