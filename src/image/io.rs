//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{CanonicalBuffer, PixelBuffer};
use crate::normalize::to_canonical_owned;
use crate::util::{TraceMatchError, TraceMatchResult};
use image::{ColorType, DynamicImage};
use std::path::Path;

/// File extensions (lowercase) the template loader accepts.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Returns true when `path` has a supported image extension (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Converts a decoded image to a 1, 3 or 4 channel 8-bit buffer.
///
/// Grayscale stays single-channel, color stays 3-channel, anything carrying
/// alpha becomes 4-channel. Higher bit depths are reduced to 8 bits.
pub fn pixels_from_dynamic_image(img: &DynamicImage) -> TraceMatchResult<PixelBuffer> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    match img.color() {
        ColorType::L8 | ColorType::L16 => {
            PixelBuffer::new(img.to_luma8().into_raw(), width, height, 1)
        }
        color if color.has_alpha() => {
            PixelBuffer::new(img.to_rgba8().into_raw(), width, height, 4)
        }
        _ => PixelBuffer::new(img.to_rgb8().into_raw(), width, height, 3),
    }
}

/// Decodes an image file without changing its channel layout class.
pub fn load_pixels<P: AsRef<Path>>(path: P) -> TraceMatchResult<PixelBuffer> {
    let img = image::open(path).map_err(|err| TraceMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    pixels_from_dynamic_image(&img)
}

/// Decodes an image file and normalizes it to an owned canonical buffer.
pub fn load_canonical<P: AsRef<Path>>(path: P) -> TraceMatchResult<CanonicalBuffer> {
    let pixels = load_pixels(path)?;
    to_canonical_owned(pixels.view())
}
