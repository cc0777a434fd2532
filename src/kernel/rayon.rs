//! Rayon-parallel scan (feature-gated).
//!
//! Rows are scored in parallel; each row keeps its own first maximum, and the
//! per-row results are merged in row order with the same strict comparison as
//! the sequential scan, so the reported window is identical.

use crate::candidate::{BestPeak, Peak};
use crate::kernel::{scan_rows, Kernel};
use rayon::prelude::*;

/// Row-parallel equivalent of [`scan_full`](crate::kernel::scan_full).
pub fn scan_full_par<K: Kernel + Sync + ?Sized>(kernel: &K) -> Option<Peak> {
    let (max_x, max_y) = kernel.max_offset()?;

    let rows: Vec<BestPeak> = (0..=max_y)
        .into_par_iter()
        .map(|y| scan_rows(kernel, max_x, y, y))
        .collect();

    let mut best = BestPeak::new();
    for row in rows {
        best.merge(row);
    }
    best.get()
}
