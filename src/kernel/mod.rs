//! Correlation kernel implementations.
//!
//! A kernel scores one template-sized window of a canonical source. Every
//! kernel computes the same quantity: per channel
//!
//! ```text
//! num     = sum (s - mean_s) * (t - mean_t)
//! denom_s = sum (s - mean_s)^2
//! denom_t = sum (t - mean_t)^2
//! corr    = num / sqrt(denom_s * denom_t)    (0 when the root is <= 1e-5)
//! ```
//!
//! averaged over the three channels and clamped to `[0, 1]`. Kernels differ
//! only in how they obtain the window statistics.

use crate::candidate::{BestPeak, Peak};
use crate::image::CANONICAL_CHANNELS;

pub mod integral;
pub mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Below this value of `sqrt(denom_s * denom_t)` a channel is treated as flat.
pub const FLAT_EPSILON: f64 = 1e-5;

/// Window scorer over one source image and one template plan.
pub trait Kernel {
    /// Source width and height in pixels.
    fn image_size(&self) -> (usize, usize);

    /// Template width and height in pixels.
    fn template_size(&self) -> (usize, usize);

    /// Computes the aggregated score of the window whose top-left is `(x, y)`.
    ///
    /// The caller guarantees the window lies inside the source.
    fn score_at(&self, x: usize, y: usize) -> f64;

    /// Returns the inclusive maximum top-left offsets, or `None` if the
    /// template does not fit.
    fn max_offset(&self) -> Option<(usize, usize)> {
        let (img_w, img_h) = self.image_size();
        let (tpl_w, tpl_h) = self.template_size();
        if tpl_w > img_w || tpl_h > img_h {
            return None;
        }
        Some((img_w - tpl_w, img_h - tpl_h))
    }
}

/// Normalized correlation of one channel with the flat-region guard.
#[inline]
pub(crate) fn channel_correlation(num: f64, denom_s: f64, denom_t: f64) -> f64 {
    let denom = (denom_s * denom_t).sqrt();
    if denom > FLAT_EPSILON {
        num / denom
    } else {
        0.0
    }
}

/// Scores this close to 1 are reported as exactly 1.
pub const PERFECT_EPSILON: f64 = 1e-10;

/// Mean of the channel correlations, clamped to `[0, 1]`.
///
/// Rounding leaves an exact match a few ulps below 1; such scores snap to 1
/// so a threshold of 1.0 accepts a pixel-identical window.
#[inline]
pub(crate) fn aggregate(corr: [f64; CANONICAL_CHANNELS]) -> f64 {
    let mean = corr.iter().sum::<f64>() / CANONICAL_CHANNELS as f64;
    if mean >= 1.0 - PERFECT_EPSILON {
        return 1.0;
    }
    mean.clamp(0.0, 1.0)
}

/// Scans all `x` for rows `y0..=y1` in row-major order.
pub fn scan_rows<K: Kernel + ?Sized>(kernel: &K, max_x: usize, y0: usize, y1: usize) -> BestPeak {
    let mut best = BestPeak::new();
    for y in y0..=y1 {
        for x in 0..=max_x {
            best.push(Peak {
                x,
                y,
                score: kernel.score_at(x, y),
            });
        }
    }
    best
}

/// Scans every valid offset and returns the first best window.
///
/// Returns `None` when the template does not fit in the source.
pub fn scan_full<K: Kernel + ?Sized>(kernel: &K) -> Option<Peak> {
    let (max_x, max_y) = kernel.max_offset()?;
    scan_rows(kernel, max_x, 0, max_y).get()
}
