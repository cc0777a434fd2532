//! Named templates and their matching plans.

use std::sync::OnceLock;

use crate::image::{CanonicalBuffer, CanonicalView};
use crate::util::TraceMatchResult;

mod plan;

pub use plan::TemplatePlan;

/// A normalized template under its file name.
///
/// Records are shared read-only between concurrent match calls; the store
/// replaces whole records on reload and never mutates one in place.
#[derive(Debug)]
pub struct TemplateRecord {
    name: String,
    buffer: CanonicalBuffer,
    plan: OnceLock<TemplatePlan>,
}

impl TemplateRecord {
    /// Creates a record from an owned canonical buffer.
    pub fn new(name: impl Into<String>, buffer: CanonicalBuffer) -> Self {
        Self {
            name: name.into(),
            buffer,
            plan: OnceLock::new(),
        }
    }

    /// Returns the name as it was loaded (original case).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.buffer.width()
    }

    pub fn height(&self) -> usize {
        self.buffer.height()
    }

    /// Returns a borrowed view of the template pixels.
    pub fn view(&self) -> CanonicalView<'_> {
        self.buffer.view()
    }

    /// Returns the matching plan, building it on first use.
    ///
    /// Every later query against this record reuses the same plan.
    pub fn plan(&self) -> TraceMatchResult<&TemplatePlan> {
        if let Some(plan) = self.plan.get() {
            return Ok(plan);
        }
        let plan = TemplatePlan::from_view(self.view())?;
        Ok(self.plan.get_or_init(|| plan))
    }
}
