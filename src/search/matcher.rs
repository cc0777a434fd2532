//! Store-backed matcher used by the automation loop.

use crate::image::PixelView;
use crate::normalize::to_canonical;
use crate::region::{select, SearchRegion};
use crate::search::{match_plan, MatchConfig, MatchResult};
use crate::store::TemplateStore;
use crate::template::{TemplatePlan, TemplateRecord};
use crate::trace::trace_debug;
use crate::util::{TraceMatchError, TraceMatchResult};

/// Matches captures against templates held by a [`TemplateStore`].
///
/// The matcher borrows the store; any number of matchers (on any number of
/// threads) may share one store while the owner reloads it between sessions.
pub struct Matcher<'s> {
    store: &'s TemplateStore,
    cfg: MatchConfig,
}

impl<'s> Matcher<'s> {
    /// Creates a matcher with the default configuration.
    pub fn new(store: &'s TemplateStore) -> Self {
        Self {
            store,
            cfg: MatchConfig::default(),
        }
    }

    /// Replaces the match configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Finds the named template in `source`.
    ///
    /// `source` may have 1, 3 or 4 channels; 3-channel captures are scanned
    /// without copying. Missing templates fail with `TemplateNotFound`; a
    /// template that does not fit in the searched area is an unsuccessful
    /// result, not an error.
    pub fn find(
        &self,
        source: PixelView<'_>,
        name: &str,
        threshold: f64,
        region: SearchRegion,
    ) -> TraceMatchResult<MatchResult> {
        #[cfg(feature = "image-io")]
        let record = self.store.resolve(name)?;
        #[cfg(not(feature = "image-io"))]
        let record = self.store.get(name)?;

        self.find_record(source, &record, threshold, region)
    }

    /// Finds an already resolved template record in `source`.
    ///
    /// Reuses the record's cached plan across calls.
    pub fn find_record(
        &self,
        source: PixelView<'_>,
        record: &TemplateRecord,
        threshold: f64,
        region: SearchRegion,
    ) -> TraceMatchResult<MatchResult> {
        self.run(source, record.plan()?, record.name(), threshold, region)
    }

    /// Finds an explicit template buffer (1, 3 or 4 channels) in `source`.
    pub fn find_with(
        &self,
        source: PixelView<'_>,
        template: PixelView<'_>,
        threshold: f64,
        region: SearchRegion,
    ) -> TraceMatchResult<MatchResult> {
        let template = to_canonical(template)?;
        let plan = TemplatePlan::from_view(template.view())?;
        self.run(source, &plan, "<buffer>", threshold, region)
    }

    fn run(
        &self,
        source: PixelView<'_>,
        plan: &TemplatePlan,
        name: &str,
        threshold: f64,
        region: SearchRegion,
    ) -> TraceMatchResult<MatchResult> {
        let source = to_canonical(source)?;
        let selection = select(source.view(), region);

        let local = match match_plan(selection.view, plan, threshold, &self.cfg) {
            Ok(result) => result,
            Err(TraceMatchError::TemplateTooLarge { .. }) => {
                trace_debug!(
                    "match_no_fit",
                    template = name,
                    tpl_w = plan.width(),
                    tpl_h = plan.height(),
                    area_w = selection.view.width(),
                    area_h = selection.view.height()
                );
                return Ok(MatchResult::no_fit());
            }
            Err(err) => return Err(err),
        };

        let result = local.offset(selection.offset_x, selection.offset_y);
        trace_debug!(
            "match_result",
            template = name,
            score = result.score,
            threshold = threshold,
            x = result.x,
            y = result.y,
            local_x = local.x,
            local_y = local.y,
            success = result.success
        );
        Ok(result)
    }
}
