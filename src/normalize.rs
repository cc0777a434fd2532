//! Channel normalization to the canonical 3-channel layout.
//!
//! Grayscale is replicated into all three channels, 4-channel input drops its
//! alpha byte without compositing, and 3-channel input passes through. The
//! borrowing variant keeps 3-channel input zero-copy (large captures are
//! normalized once per poll); the owning variant always returns an independent
//! buffer (templates are cached past the lifetime of their decode buffer).

use crate::image::{
    CanonicalBuffer, CanonicalImage, CanonicalView, PixelView, CANONICAL_CHANNELS,
};
use crate::util::{TraceMatchError, TraceMatchResult};

/// Normalizes a view, borrowing it unchanged when it is already canonical.
pub fn to_canonical(view: PixelView<'_>) -> TraceMatchResult<CanonicalImage<'_>> {
    match view.channels() {
        CANONICAL_CHANNELS => CanonicalView::try_from_pixels(view).map(CanonicalImage::borrowed),
        1 | 4 => convert(view),
        channels => Err(TraceMatchError::UnsupportedFormat { channels }),
    }
}

/// Normalizes a view into an independent, tightly packed buffer.
pub fn to_canonical_owned(view: PixelView<'_>) -> TraceMatchResult<CanonicalBuffer> {
    match view.channels() {
        CANONICAL_CHANNELS => Ok(CanonicalView::try_from_pixels(view)?.to_owned_buffer()),
        1 | 4 => convert(view),
        channels => Err(TraceMatchError::UnsupportedFormat { channels }),
    }
}

fn convert(view: PixelView<'_>) -> TraceMatchResult<CanonicalBuffer> {
    let width = view.width();
    let height = view.height();
    let channels = view.channels();
    let mut out = Vec::with_capacity(width * height * CANONICAL_CHANNELS);
    for y in 0..height {
        let row = view.row(y).ok_or(TraceMatchError::BufferTooSmall {
            needed: (y + 1) * view.stride(),
            got: view.as_slice().len(),
        })?;
        match channels {
            1 => {
                for &v in row {
                    out.extend_from_slice(&[v, v, v]);
                }
            }
            4 => {
                for px in row.chunks_exact(4) {
                    out.extend_from_slice(&px[..CANONICAL_CHANNELS]);
                }
            }
            channels => return Err(TraceMatchError::UnsupportedFormat { channels }),
        }
    }
    CanonicalImage::from_vec(out, width, height)
}

#[cfg(test)]
mod tests {
    use super::{to_canonical, to_canonical_owned};
    use crate::image::{CanonicalView, PixelView};
    use crate::util::TraceMatchError;

    fn same_pixels(a: CanonicalView<'_>, b: CanonicalView<'_>) -> bool {
        a.width() == b.width()
            && a.height() == b.height()
            && (0..a.height()).all(|y| a.row(y) == b.row(y))
    }

    #[test]
    fn grayscale_is_replicated() {
        let data = [10u8, 20, 30, 40];
        let gray = PixelView::from_slice(&data, 2, 2, 1).unwrap();
        let canonical = to_canonical(gray).unwrap();
        assert!(!canonical.is_borrowed());
        let view = canonical.view();
        assert_eq!(view.row(0).unwrap(), &[10u8, 10, 10, 20, 20, 20]);
        assert_eq!(view.row(1).unwrap(), &[30u8, 30, 30, 40, 40, 40]);
    }

    #[test]
    fn alpha_is_truncated_without_compositing() {
        let data = [1u8, 2, 3, 0, 4, 5, 6, 255];
        let rgba = PixelView::from_slice(&data, 2, 1, 4).unwrap();
        let canonical = to_canonical(rgba).unwrap();
        assert_eq!(canonical.view().row(0).unwrap(), &[1u8, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn rgb_borrow_is_zero_copy_and_clone_is_independent() {
        let data = [1u8, 2, 3, 4, 5, 6, 0, 0];
        let rgb = PixelView::new(&data, 1, 2, 3, 4).unwrap();

        let borrowed = to_canonical(rgb).unwrap();
        assert!(borrowed.is_borrowed());
        assert_eq!(borrowed.view().as_pixels().as_slice().as_ptr(), data.as_ptr());

        let owned = to_canonical_owned(rgb).unwrap();
        assert!(!owned.is_borrowed());
        assert_eq!(owned.view().stride(), 3);
        assert!(same_pixels(borrowed.view(), owned.view()));
    }

    #[test]
    fn normalizing_twice_is_idempotent() {
        let data: Vec<u8> = (0u8..27).collect();
        let rgb = PixelView::from_slice(&data, 3, 3, 3).unwrap();
        let once = to_canonical_owned(rgb).unwrap();
        let twice = to_canonical_owned(once.view().as_pixels()).unwrap();
        assert!(same_pixels(once.view(), twice.view()));
        assert_eq!(twice.view().as_pixels().as_slice(), data.as_slice());
    }

    #[test]
    fn other_channel_counts_are_rejected() {
        let data = [0u8; 8];
        let two = PixelView::from_slice(&data, 2, 2, 2).unwrap();
        assert_eq!(
            to_canonical(two).unwrap_err(),
            TraceMatchError::UnsupportedFormat { channels: 2 }
        );
        assert_eq!(
            to_canonical_owned(two).unwrap_err(),
            TraceMatchError::UnsupportedFormat { channels: 2 }
        );
    }
}
