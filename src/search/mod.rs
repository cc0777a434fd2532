//! Exhaustive template search.
//!
//! The free functions score canonical views directly. [`Matcher`] is the
//! entry point for the automation loop: it resolves templates by name from a
//! [`TemplateStore`], normalizes raw captures and applies search regions.

use crate::image::CanonicalView;
use crate::kernel::integral::NccIntegral;
use crate::kernel::scalar::NccScalar;
use crate::kernel::{scan_full, Kernel};
use crate::template::TemplatePlan;
use crate::trace::trace_span;
use crate::util::{TraceMatchError, TraceMatchResult};

mod matcher;

pub use matcher::Matcher;

/// Outcome of one match query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchResult {
    /// Whether `score` reached the caller's threshold.
    pub success: bool,
    /// Left edge of the best window, in source coordinates.
    pub x: usize,
    /// Top edge of the best window, in source coordinates.
    pub y: usize,
    /// Best aggregated score, in `[0, 1]`.
    pub score: f64,
}

impl MatchResult {
    /// Result for a template that cannot fit in the searched area.
    pub fn no_fit() -> Self {
        Self {
            success: false,
            x: 0,
            y: 0,
            score: 0.0,
        }
    }

    /// Returns the center of the matched window for a template of the given size.
    pub fn center(&self, tpl_width: usize, tpl_height: usize) -> (usize, usize) {
        (self.x + tpl_width / 2, self.y + tpl_height / 2)
    }

    fn offset(mut self, dx: usize, dy: usize) -> Self {
        self.x += dx;
        self.y += dy;
        self
    }
}

/// How window statistics are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KernelKind {
    /// Literal two-pass computation per window.
    Direct,
    /// Integral-image window sums (default).
    #[default]
    Integral,
}

/// Configuration for match queries.
#[derive(Clone, Debug, Default)]
pub struct MatchConfig {
    /// Window statistics strategy; all strategies agree within rounding.
    pub kernel: KernelKind,
    /// Scan rows in parallel (requires the `rayon` feature, ignored otherwise).
    pub parallel: bool,
}

/// Matches `template` against `source` with the default configuration.
///
/// A template larger than the source yields [`MatchResult::no_fit`].
pub fn match_template(
    source: CanonicalView<'_>,
    template: CanonicalView<'_>,
    threshold: f64,
) -> MatchResult {
    match_template_with(source, template, threshold, &MatchConfig::default())
}

/// Like [`match_template`] with an explicit configuration.
pub fn match_template_with(
    source: CanonicalView<'_>,
    template: CanonicalView<'_>,
    threshold: f64,
    cfg: &MatchConfig,
) -> MatchResult {
    try_match_template_with(source, template, threshold, cfg)
        .unwrap_or_else(|_| MatchResult::no_fit())
}

/// Like [`match_template`], but reports a template that does not fit as
/// [`TraceMatchError::TemplateTooLarge`].
pub fn try_match_template(
    source: CanonicalView<'_>,
    template: CanonicalView<'_>,
    threshold: f64,
) -> TraceMatchResult<MatchResult> {
    try_match_template_with(source, template, threshold, &MatchConfig::default())
}

/// Strict variant of [`match_template_with`].
pub fn try_match_template_with(
    source: CanonicalView<'_>,
    template: CanonicalView<'_>,
    threshold: f64,
    cfg: &MatchConfig,
) -> TraceMatchResult<MatchResult> {
    let plan = TemplatePlan::from_view(template)?;
    match_plan(source, &plan, threshold, cfg)
}

/// Scores a prepared template plan against `source`.
pub(crate) fn match_plan(
    source: CanonicalView<'_>,
    plan: &TemplatePlan,
    threshold: f64,
    cfg: &MatchConfig,
) -> TraceMatchResult<MatchResult> {
    let too_large = TraceMatchError::TemplateTooLarge {
        tpl_width: plan.width(),
        tpl_height: plan.height(),
        src_width: source.width(),
        src_height: source.height(),
    };
    if plan.width() > source.width() || plan.height() > source.height() {
        return Err(too_large);
    }

    let _span = trace_span!(
        "match_template",
        src_w = source.width(),
        src_h = source.height(),
        tpl_w = plan.width(),
        tpl_h = plan.height()
    )
    .entered();

    let best = match cfg.kernel {
        KernelKind::Direct => scan(&NccScalar::new(source, plan), cfg.parallel),
        KernelKind::Integral => scan(&NccIntegral::new(source, plan), cfg.parallel),
    }
    .ok_or(too_large)?;

    Ok(MatchResult {
        success: best.score >= threshold,
        x: best.x,
        y: best.y,
        score: best.score,
    })
}

#[cfg(feature = "rayon")]
fn scan<K: Kernel + Sync>(kernel: &K, parallel: bool) -> Option<crate::candidate::Peak> {
    if parallel {
        crate::kernel::rayon::scan_full_par(kernel)
    } else {
        scan_full(kernel)
    }
}

#[cfg(not(feature = "rayon"))]
fn scan<K: Kernel>(kernel: &K, _parallel: bool) -> Option<crate::candidate::Peak> {
    scan_full(kernel)
}
