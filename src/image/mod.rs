//! Pixel buffers and views.
//!
//! `PixelView` is a borrowed 2D view into a 1D byte buffer with interleaved
//! channels and an explicit stride. The stride counts bytes between the starts
//! of consecutive rows, so a stride larger than `width * channels` represents
//! padded rows. ROI slices are zero-copy views into the same backing slice and
//! retain the original stride.

use crate::util::{TraceMatchError, TraceMatchResult};

mod canonical;
pub mod integral;
#[cfg(feature = "image-io")]
pub mod io;

pub use canonical::{CanonicalBuffer, CanonicalImage, CanonicalView, CANONICAL_CHANNELS};

/// Borrowed interleaved pixel view with an explicit row stride.
#[derive(Copy, Clone, Debug)]
pub struct PixelView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
}

impl<'a> PixelView<'a> {
    /// Creates a tightly packed view with `stride == width * channels`.
    pub fn from_slice(
        data: &'a [u8],
        width: usize,
        height: usize,
        channels: usize,
    ) -> TraceMatchResult<Self> {
        let row_bytes = row_bytes(width, height, channels)?;
        Self::new(data, width, height, channels, row_bytes)
    }

    /// Creates a view with an explicit stride in bytes.
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        channels: usize,
        stride: usize,
    ) -> TraceMatchResult<Self> {
        let needed = required_len(width, height, channels, stride)?;
        if data.len() < needed {
            return Err(TraceMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of interleaved channels per pixel.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the stride in bytes between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// Returns channel `c` of the pixel at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize, c: usize) -> Option<u8> {
        if x >= self.width || y >= self.height || c >= self.channels {
            return None;
        }
        let idx = y
            .checked_mul(self.stride)?
            .checked_add(x * self.channels + c)?;
        self.data.get(idx).copied()
    }

    /// Returns the interleaved bytes of row `y` (length `width * channels`).
    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width * self.channels)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> TraceMatchResult<PixelView<'a>> {
        if width == 0 || height == 0 {
            return Err(TraceMatchError::InvalidDimensions { width, height });
        }
        let out_of_bounds = TraceMatchError::RegionOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or_else(|| out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x * self.channels))
            .ok_or(TraceMatchError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        let data = self
            .data
            .get(start..)
            .ok_or(TraceMatchError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;

        PixelView::new(data, width, height, self.channels, self.stride)
    }
}

/// Owned, tightly packed interleaved pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
}

impl PixelBuffer {
    /// Wraps a contiguous buffer of exactly `width * height * channels` bytes.
    pub fn new(
        data: Vec<u8>,
        width: usize,
        height: usize,
        channels: usize,
    ) -> TraceMatchResult<Self> {
        let needed = row_bytes(width, height, channels)?
            .checked_mul(height)
            .ok_or(TraceMatchError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(TraceMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(TraceMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of interleaved channels per pixel.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the contiguous pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a borrowed view of the buffer.
    pub fn view(&self) -> PixelView<'_> {
        PixelView {
            data: &self.data,
            width: self.width,
            height: self.height,
            channels: self.channels,
            stride: self.width * self.channels,
        }
    }
}

fn row_bytes(width: usize, height: usize, channels: usize) -> TraceMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(TraceMatchError::InvalidDimensions { width, height });
    }
    if channels == 0 {
        return Err(TraceMatchError::UnsupportedFormat { channels });
    }
    width
        .checked_mul(channels)
        .ok_or(TraceMatchError::InvalidDimensions { width, height })
}

pub(crate) fn required_len(
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
) -> TraceMatchResult<usize> {
    let row_bytes = row_bytes(width, height, channels)?;
    if stride < row_bytes {
        return Err(TraceMatchError::InvalidStride { row_bytes, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(row_bytes))
        .ok_or(TraceMatchError::InvalidDimensions { width, height })
}
