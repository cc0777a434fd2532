//! Integral-image kernel used by the matcher.
//!
//! Window sums and sums of squares come from summed-area tables in O(1) per
//! window. Since the template plan is zero-mean, the cross term reduces to
//! `sum s * (t - mean_t)`, which needs no source mean at all. The source
//! variance is formed in integer arithmetic as `(n * S2 - S^2) / n`.

use crate::image::integral::IntegralImage;
use crate::image::{CanonicalView, CANONICAL_CHANNELS};
use crate::kernel::{aggregate, channel_correlation, Kernel};
use crate::template::TemplatePlan;

/// NCC kernel with precomputed source integral images.
pub struct NccIntegral<'a> {
    image: CanonicalView<'a>,
    plan: &'a TemplatePlan,
    integral: IntegralImage,
}

impl<'a> NccIntegral<'a> {
    /// Builds the integral tables for `image` once; scoring is then read-only.
    pub fn new(image: CanonicalView<'a>, plan: &'a TemplatePlan) -> Self {
        let integral = IntegralImage::build(image);
        Self {
            image,
            plan,
            integral,
        }
    }
}

impl Kernel for NccIntegral<'_> {
    fn image_size(&self) -> (usize, usize) {
        (self.integral.width(), self.integral.height())
    }

    fn template_size(&self) -> (usize, usize) {
        (self.plan.width(), self.plan.height())
    }

    fn score_at(&self, x: usize, y: usize) -> f64 {
        let tpl_w = self.plan.width();
        let tpl_h = self.plan.height();
        let start = x * CANONICAL_CHANNELS;
        let len = tpl_w * CANONICAL_CHANNELS;

        let mut num = [0.0f64; CANONICAL_CHANNELS];
        for ty in 0..tpl_h {
            let Some(src) = self.image.row(y + ty).and_then(|r| r.get(start..start + len)) else {
                return 0.0;
            };
            let tpl = self.plan.zero_mean_row(ty);
            for (s_px, t_px) in src
                .chunks_exact(CANONICAL_CHANNELS)
                .zip(tpl.chunks_exact(CANONICAL_CHANNELS))
            {
                for c in 0..CANONICAL_CHANNELS {
                    num[c] += f64::from(s_px[c]) * t_px[c];
                }
            }
        }

        let n = self.plan.pixel_count() as u128;
        let (sum, sum_sq) = self.integral.window(x, y, tpl_w, tpl_h);
        let denom_t = self.plan.sum_sq_dev();
        let mut corr = [0.0f64; CANONICAL_CHANNELS];
        for c in 0..CANONICAL_CHANNELS {
            let s = u128::from(sum[c]);
            let scaled = n * u128::from(sum_sq[c]) - s * s;
            let denom_s = scaled as f64 / n as f64;
            corr[c] = channel_correlation(num[c], denom_s, denom_t[c]);
        }
        aggregate(corr)
    }
}
