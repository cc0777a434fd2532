//! Canonical 3-channel images.
//!
//! Every buffer that reaches the correlation kernels is canonical: three
//! interleaved channels in RGB order. The type split mirrors ownership:
//! `CanonicalView` borrows, `CanonicalImage` either borrows a capture that was
//! already canonical or owns a converted copy.

use std::borrow::Cow;

use crate::image::{required_len, PixelView};
use crate::util::{TraceMatchError, TraceMatchResult};

/// Channel count of canonical buffers.
pub const CANONICAL_CHANNELS: usize = 3;

/// Borrowed canonical (3-channel) view.
#[derive(Copy, Clone, Debug)]
pub struct CanonicalView<'a> {
    pixels: PixelView<'a>,
}

impl<'a> CanonicalView<'a> {
    /// Creates a view with an explicit stride in bytes.
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        stride: usize,
    ) -> TraceMatchResult<Self> {
        let pixels = PixelView::new(data, width, height, CANONICAL_CHANNELS, stride)?;
        Ok(Self { pixels })
    }

    /// Creates a tightly packed view.
    pub fn from_slice(data: &'a [u8], width: usize, height: usize) -> TraceMatchResult<Self> {
        let pixels = PixelView::from_slice(data, width, height, CANONICAL_CHANNELS)?;
        Ok(Self { pixels })
    }

    /// Reinterprets a generic view, failing unless it has exactly 3 channels.
    pub fn try_from_pixels(pixels: PixelView<'a>) -> TraceMatchResult<Self> {
        if pixels.channels() != CANONICAL_CHANNELS {
            return Err(TraceMatchError::UnsupportedFormat {
                channels: pixels.channels(),
            });
        }
        Ok(Self { pixels })
    }

    /// Returns the underlying generic view.
    pub fn as_pixels(&self) -> PixelView<'a> {
        self.pixels
    }

    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    pub fn stride(&self) -> usize {
        self.pixels.stride()
    }

    /// Returns channel `c` of the pixel at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize, c: usize) -> Option<u8> {
        self.pixels.pixel(x, y, c)
    }

    /// Returns the interleaved bytes of row `y` (length `3 * width`).
    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        self.pixels.row(y)
    }

    /// Returns a zero-copy ROI view.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> TraceMatchResult<CanonicalView<'a>> {
        let pixels = self.pixels.roi(x, y, width, height)?;
        Ok(Self { pixels })
    }

    /// Copies the view into a tightly packed owned buffer.
    pub fn to_owned_buffer(&self) -> CanonicalBuffer {
        let row_bytes = self.width() * CANONICAL_CHANNELS;
        let mut data = Vec::with_capacity(row_bytes * self.height());
        for y in 0..self.height() {
            if let Some(row) = self.row(y) {
                data.extend_from_slice(row);
            }
        }
        CanonicalImage {
            data: Cow::Owned(data),
            width: self.width(),
            height: self.height(),
            stride: row_bytes,
        }
    }
}

/// Canonical image that either borrows its pixels or owns them.
#[derive(Clone, Debug)]
pub struct CanonicalImage<'a> {
    data: Cow<'a, [u8]>,
    width: usize,
    height: usize,
    stride: usize,
}

/// Canonical image that owns its pixels.
pub type CanonicalBuffer = CanonicalImage<'static>;

impl CanonicalImage<'static> {
    /// Wraps a contiguous RGB buffer of exactly `width * height * 3` bytes.
    pub fn from_vec(data: Vec<u8>, width: usize, height: usize) -> TraceMatchResult<Self> {
        let stride = width
            .checked_mul(CANONICAL_CHANNELS)
            .ok_or(TraceMatchError::InvalidDimensions { width, height })?;
        let needed = required_len(width, height, CANONICAL_CHANNELS, stride)?;
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
            data: Cow::Owned(data),
            width,
            height,
            stride,
        })
    }
}

impl<'a> CanonicalImage<'a> {
    /// Borrows an existing canonical view without copying.
    pub fn borrowed(view: CanonicalView<'a>) -> Self {
        let pixels = view.as_pixels();
        Self {
            data: Cow::Borrowed(pixels.as_slice()),
            width: pixels.width(),
            height: pixels.height(),
            stride: pixels.stride(),
        }
    }

    /// Returns true when the pixels are borrowed from the caller's buffer.
    pub fn is_borrowed(&self) -> bool {
        matches!(self.data, Cow::Borrowed(_))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> CanonicalView<'_> {
        CanonicalView {
            pixels: PixelView {
                data: &self.data,
                width: self.width,
                height: self.height,
                channels: CANONICAL_CHANNELS,
                stride: self.stride,
            },
        }
    }

    /// Detaches the image from any borrowed buffer.
    pub fn into_owned(self) -> CanonicalBuffer {
        if self.is_borrowed() {
            return self.view().to_owned_buffer();
        }
        CanonicalImage {
            data: Cow::Owned(self.data.into_owned()),
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CanonicalBuffer, CanonicalImage, CanonicalView};
    use crate::image::PixelView;
    use crate::util::TraceMatchError;

    #[test]
    fn rejects_non_canonical_views() {
        let data = [0u8; 16];
        let rgba = PixelView::from_slice(&data, 2, 2, 4).unwrap();
        let err = CanonicalView::try_from_pixels(rgba).unwrap_err();
        assert_eq!(err, TraceMatchError::UnsupportedFormat { channels: 4 });
    }

    #[test]
    fn into_owned_compacts_padded_borrow() {
        let data = [1u8, 2, 3, 9, 4, 5, 6, 9];
        let view = CanonicalView::new(&data, 1, 2, 4).unwrap();
        let image = CanonicalImage::borrowed(view);
        assert!(image.is_borrowed());

        let owned: CanonicalBuffer = image.into_owned();
        assert!(!owned.is_borrowed());
        assert_eq!(owned.view().stride(), 3);
        assert_eq!(owned.view().row(1).unwrap(), &[4u8, 5, 6]);
    }
}
