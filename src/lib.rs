//! tracematch locates a small template image inside a larger capture.
//!
//! The matcher runs an exhaustive normalized cross-correlation scan over every
//! template-sized window of the source, scoring each of the three color
//! channels separately and averaging them. Inputs with 1, 3 or 4 channels are
//! normalized to a canonical 3-channel layout first; templates are loaded once
//! into a shared [`TemplateStore`] and looked up by name on each query.
//!
//! Optional features: `image-io` (default) decodes template files via the
//! `image` crate, `rayon` parallelizes the scan and bulk loading, `tracing`
//! emits spans and events.

pub mod candidate;
pub mod image;
pub mod kernel;
pub mod normalize;
pub mod region;
pub mod search;
pub mod store;
pub mod template;
mod trace;
pub mod util;

pub use candidate::Peak;
pub use crate::image::{CanonicalBuffer, CanonicalImage, CanonicalView, PixelBuffer, PixelView};
pub use normalize::{to_canonical, to_canonical_owned};
pub use region::{select, SearchRegion, Selection};
pub use search::{
    match_template, match_template_with, try_match_template, try_match_template_with,
    KernelKind, MatchConfig, MatchResult, Matcher,
};
#[cfg(feature = "image-io")]
pub use store::ReloadReport;
pub use store::TemplateStore;
pub use template::{TemplatePlan, TemplateRecord};
pub use util::{TraceMatchError, TraceMatchResult};

#[cfg(feature = "image-io")]
pub use crate::image::io;
