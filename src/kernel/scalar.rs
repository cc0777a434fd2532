//! Two-pass reference kernel.
//!
//! Computes the window mean first, then the mean-subtracted sums, exactly as
//! the correlation is defined. It is the slow ground truth the integral kernel
//! is checked against.

use crate::image::{CanonicalView, CANONICAL_CHANNELS};
use crate::kernel::{aggregate, channel_correlation, Kernel};
use crate::template::TemplatePlan;

/// Direct two-pass NCC kernel.
pub struct NccScalar<'a> {
    image: CanonicalView<'a>,
    plan: &'a TemplatePlan,
}

impl<'a> NccScalar<'a> {
    pub fn new(image: CanonicalView<'a>, plan: &'a TemplatePlan) -> Self {
        Self { image, plan }
    }

    fn window_row(&self, x: usize, y: usize) -> &'a [u8] {
        let start = x * CANONICAL_CHANNELS;
        let len = self.plan.width() * CANONICAL_CHANNELS;
        self.image
            .row(y)
            .and_then(|row| row.get(start..start + len))
            .unwrap_or(&[])
    }
}

impl Kernel for NccScalar<'_> {
    fn image_size(&self) -> (usize, usize) {
        (self.image.width(), self.image.height())
    }

    fn template_size(&self) -> (usize, usize) {
        (self.plan.width(), self.plan.height())
    }

    fn score_at(&self, x: usize, y: usize) -> f64 {
        let tpl_h = self.plan.height();
        let n = self.plan.pixel_count() as f64;

        let mut sum = [0.0f64; CANONICAL_CHANNELS];
        for ty in 0..tpl_h {
            for px in self.window_row(x, y + ty).chunks_exact(CANONICAL_CHANNELS) {
                for c in 0..CANONICAL_CHANNELS {
                    sum[c] += f64::from(px[c]);
                }
            }
        }
        let mean_s = sum.map(|s| s / n);

        let mut num = [0.0f64; CANONICAL_CHANNELS];
        let mut denom_s = [0.0f64; CANONICAL_CHANNELS];
        for ty in 0..tpl_h {
            let src = self.window_row(x, y + ty).chunks_exact(CANONICAL_CHANNELS);
            let tpl = self.plan.zero_mean_row(ty).chunks_exact(CANONICAL_CHANNELS);
            for (s_px, t_px) in src.zip(tpl) {
                for c in 0..CANONICAL_CHANNELS {
                    let ds = f64::from(s_px[c]) - mean_s[c];
                    num[c] += ds * t_px[c];
                    denom_s[c] += ds * ds;
                }
            }
        }

        let denom_t = self.plan.sum_sq_dev();
        let mut corr = [0.0f64; CANONICAL_CHANNELS];
        for c in 0..CANONICAL_CHANNELS {
            corr[c] = channel_correlation(num[c], denom_s[c], denom_t[c]);
        }
        aggregate(corr)
    }
}
