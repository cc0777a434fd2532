//! Search-region selection.
//!
//! A region restricts the scan to a sub-rectangle of the source. The selected
//! view borrows the source pixels, and the region origin is returned as an
//! offset so match coordinates can be reported in source space.

use crate::image::CanonicalView;
use crate::trace::trace_warn;
use crate::util::{TraceMatchError, TraceMatchResult};

/// Sub-rectangle of the source, in source pixel coordinates.
///
/// The default value (and any region with zero width or height) means
/// "search the entire source".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SearchRegion {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl SearchRegion {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true when the region selects the whole source.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Checks that the region lies fully inside an image of the given size.
    pub fn validate(&self, img_width: usize, img_height: usize) -> TraceMatchResult<()> {
        let fits_x = self
            .x
            .checked_add(self.width)
            .is_some_and(|end| end <= img_width);
        let fits_y = self
            .y
            .checked_add(self.height)
            .is_some_and(|end| end <= img_height);
        if fits_x && fits_y {
            Ok(())
        } else {
            Err(TraceMatchError::RegionOutOfBounds {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                img_width,
                img_height,
            })
        }
    }
}

/// View to scan plus the offset that maps its coordinates back to the source.
#[derive(Clone, Copy, Debug)]
pub struct Selection<'a> {
    pub view: CanonicalView<'a>,
    pub offset_x: usize,
    pub offset_y: usize,
}

/// Restricts `source` to `region`.
///
/// An empty region selects the whole source. A region that does not fit is
/// logged and also falls back to the whole source; it never fails the match.
pub fn select(source: CanonicalView<'_>, region: SearchRegion) -> Selection<'_> {
    let full = Selection {
        view: source,
        offset_x: 0,
        offset_y: 0,
    };
    if region.is_empty() {
        return full;
    }

    let view = region
        .validate(source.width(), source.height())
        .and_then(|()| source.roi(region.x, region.y, region.width, region.height));
    match view {
        Ok(view) => Selection {
            view,
            offset_x: region.x,
            offset_y: region.y,
        },
        Err(err) => {
            let reason = err.to_string();
            trace_warn!(
                "region_fallback",
                reason = reason.as_str(),
                img_width = source.width(),
                img_height = source.height()
            );
            full
        }
    }
}
