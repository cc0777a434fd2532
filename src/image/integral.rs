//! Per-channel integral images for canonical buffers.
//!
//! Both tables are `(width + 1) x (height + 1)` with a zero first row and
//! column, so the sum over any rectangle is four lookups. Values are `u64`,
//! which keeps window sums exact for any image that fits in memory.

use crate::image::{CanonicalView, CANONICAL_CHANNELS};

/// Summed-area tables of values and squared values, per channel.
pub struct IntegralImage {
    width: usize,
    height: usize,
    sum: Vec<[u64; CANONICAL_CHANNELS]>,
    sum_sq: Vec<[u64; CANONICAL_CHANNELS]>,
}

impl IntegralImage {
    /// Builds both tables in a single pass over the image.
    pub fn build(image: CanonicalView<'_>) -> Self {
        let width = image.width();
        let height = image.height();
        let cols = width + 1;
        let mut sum = vec![[0u64; CANONICAL_CHANNELS]; cols * (height + 1)];
        let mut sum_sq = vec![[0u64; CANONICAL_CHANNELS]; cols * (height + 1)];

        for y in 0..height {
            let Some(row) = image.row(y) else {
                break;
            };
            let mut run = [0u64; CANONICAL_CHANNELS];
            let mut run_sq = [0u64; CANONICAL_CHANNELS];
            for (x, px) in row.chunks_exact(CANONICAL_CHANNELS).enumerate() {
                let above = (y * cols) + x + 1;
                let here = above + cols;
                for c in 0..CANONICAL_CHANNELS {
                    let v = u64::from(px[c]);
                    run[c] += v;
                    run_sq[c] += v * v;
                    sum[here][c] = sum[above][c] + run[c];
                    sum_sq[here][c] = sum_sq[above][c] + run_sq[c];
                }
            }
        }

        Self {
            width,
            height,
            sum,
            sum_sq,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns per-channel `(sum, sum of squares)` over the window at `(x, y)`.
    ///
    /// The caller guarantees `x + w <= width` and `y + h <= height`.
    pub fn window(
        &self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
    ) -> ([u64; CANONICAL_CHANNELS], [u64; CANONICAL_CHANNELS]) {
        let cols = self.width + 1;
        let tl = y * cols + x;
        let tr = tl + w;
        let bl = tl + h * cols;
        let br = bl + w;
        let mut s = [0u64; CANONICAL_CHANNELS];
        let mut s2 = [0u64; CANONICAL_CHANNELS];
        for c in 0..CANONICAL_CHANNELS {
            s[c] = self.sum[br][c] + self.sum[tl][c] - self.sum[tr][c] - self.sum[bl][c];
            s2[c] =
                self.sum_sq[br][c] + self.sum_sq[tl][c] - self.sum_sq[tr][c] - self.sum_sq[bl][c];
        }
        (s, s2)
    }
}
