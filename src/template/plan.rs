//! Template plan precomputation for per-channel NCC.

use crate::image::{CanonicalView, CANONICAL_CHANNELS};
use crate::util::{TraceMatchError, TraceMatchResult};

/// Precomputed per-channel statistics and zero-mean buffer for a template.
///
/// The zero-mean buffer is interleaved in the same layout as the template
/// (`3 * width` values per row, no padding).
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    mean: [f64; CANONICAL_CHANNELS],
    sum_sq_dev: [f64; CANONICAL_CHANNELS],
    zero_mean: Vec<f64>,
}

impl TemplatePlan {
    /// Builds a plan from a canonical template view.
    pub fn from_view(tpl: CanonicalView<'_>) -> TraceMatchResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width
            .checked_mul(height)
            .ok_or(TraceMatchError::InvalidDimensions { width, height })?;

        let mut sum = [0u64; CANONICAL_CHANNELS];
        for y in 0..height {
            let row = template_row(tpl, y)?;
            for px in row.chunks_exact(CANONICAL_CHANNELS) {
                for c in 0..CANONICAL_CHANNELS {
                    sum[c] += u64::from(px[c]);
                }
            }
        }

        let count_f = count as f64;
        let mean = sum.map(|s| s as f64 / count_f);

        let mut sum_sq_dev = [0.0f64; CANONICAL_CHANNELS];
        let mut zero_mean = Vec::with_capacity(count * CANONICAL_CHANNELS);
        for y in 0..height {
            let row = template_row(tpl, y)?;
            for px in row.chunks_exact(CANONICAL_CHANNELS) {
                for c in 0..CANONICAL_CHANNELS {
                    let d = f64::from(px[c]) - mean[c];
                    sum_sq_dev[c] += d * d;
                    zero_mean.push(d);
                }
            }
        }

        Ok(Self {
            width,
            height,
            mean,
            sum_sq_dev,
            zero_mean,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels per channel in one window.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Returns the per-channel mean intensity.
    pub fn mean(&self) -> [f64; CANONICAL_CHANNELS] {
        self.mean
    }

    /// Returns the per-channel sum of squared deviations from the mean.
    pub fn sum_sq_dev(&self) -> [f64; CANONICAL_CHANNELS] {
        self.sum_sq_dev
    }

    /// Returns the zero-mean template buffer in interleaved row-major order.
    pub fn zero_mean(&self) -> &[f64] {
        &self.zero_mean
    }

    /// Returns the zero-mean values of template row `y`.
    pub fn zero_mean_row(&self, y: usize) -> &[f64] {
        let len = self.width * CANONICAL_CHANNELS;
        &self.zero_mean[y * len..(y + 1) * len]
    }
}

fn template_row(tpl: CanonicalView<'_>, y: usize) -> TraceMatchResult<&[u8]> {
    tpl.row(y).ok_or_else(|| TraceMatchError::BufferTooSmall {
        needed: (y + 1)
            .checked_mul(tpl.stride())
            .unwrap_or(usize::MAX),
        got: tpl.as_pixels().as_slice().len(),
    })
}
