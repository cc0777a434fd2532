//! Error types for tracematch.

use thiserror::Error;

/// Result alias for tracematch operations.
pub type TraceMatchResult<T> = std::result::Result<T, TraceMatchError>;

/// Errors that can occur when preparing buffers or running a match.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TraceMatchError {
    /// Width or height is zero, or the size overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride cannot hold one row of pixels.
    #[error("invalid stride: stride {stride} < row bytes {row_bytes}")]
    InvalidStride { row_bytes: usize, stride: usize },
    /// Backing slice is shorter than the described image.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Channel count outside {1, 3, 4}, or a non-canonical buffer where one is required.
    #[error("unsupported pixel format: {channels} channels")]
    UnsupportedFormat { channels: usize },
    /// Template exceeds the searched source (or region) in either dimension.
    #[error(
        "template {tpl_width}x{tpl_height} does not fit in source {src_width}x{src_height}"
    )]
    TemplateTooLarge {
        tpl_width: usize,
        tpl_height: usize,
        src_width: usize,
        src_height: usize,
    },
    /// No template with this name in the store or the fallback directories.
    #[error("template not found: {name}")]
    TemplateNotFound { name: String },
    /// Search region does not lie within the source.
    #[error(
        "region out of bounds: ({x}, {y}, {width}, {height}) in {img_width}x{img_height}"
    )]
    RegionOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Decoding an image file failed.
    #[error("image I/O failed: {reason}")]
    ImageIo { reason: String },
}
