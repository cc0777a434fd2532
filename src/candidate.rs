//! Best-window tracking for exhaustive scans.

/// Scored window placement (top-left corner in scanned-view coordinates).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the window.
    pub x: usize,
    /// Y coordinate (row) of the window.
    pub y: usize,
    /// Aggregated NCC score of the window, in `[0, 1]`.
    pub score: f64,
}

/// Keeps the first strict maximum seen in push order.
///
/// Pushing windows in row-major order makes ties resolve to the smallest `y`,
/// then the smallest `x`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BestPeak {
    best: Option<Peak>,
}

impl BestPeak {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `peak` if it is strictly better than the current best.
    #[inline]
    pub fn push(&mut self, peak: Peak) {
        match self.best {
            Some(best) if peak.score <= best.score => {}
            _ => self.best = Some(peak),
        }
    }

    /// Merges a later-scanned tracker, keeping earlier peaks on ties.
    pub fn merge(&mut self, later: BestPeak) {
        if let Some(peak) = later.best {
            self.push(peak);
        }
    }

    pub fn get(&self) -> Option<Peak> {
        self.best
    }
}
