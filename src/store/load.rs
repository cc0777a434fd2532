//! Disk loading for the template store (requires `image-io`).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};

use crate::image::io::{is_supported_image, load_canonical};
use crate::image::CanonicalBuffer;
use crate::store::{is_plain_file_name, key, TemplateStore};
use crate::template::TemplateRecord;
use crate::trace::{trace_debug, trace_event, trace_span, trace_warn};
use crate::util::{TraceMatchError, TraceMatchResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Outcome of a bulk reload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReloadReport {
    /// Files decoded and inserted (including ones a later directory overrode).
    pub loaded: usize,
    /// Files that failed to decode or had unusable names.
    pub skipped: usize,
}

struct Candidate {
    name: String,
    path: PathBuf,
}

/// Lists supported image files directly inside `dir`, sorted by name.
fn list_dir(dir: &Path, report: &mut ReloadReport) -> Vec<Candidate> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            let dir = dir.display().to_string();
            let reason = err.to_string();
            trace_warn!(
                "template_dir_unreadable",
                dir = dir.as_str(),
                reason = reason.as_str()
            );
            return Vec::new();
        }
    };

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || !is_supported_image(&path) {
            continue;
        }
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => out.push(Candidate {
                name: name.to_owned(),
                path,
            }),
            None => {
                let path = path.display().to_string();
                trace_warn!("template_skipped", path = path.as_str(), reason = "non-UTF-8 name");
                report.skipped += 1;
            }
        }
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

/// Finds the file in `dir` whose name matches `name` case-insensitively.
///
/// An exact-case match wins; otherwise the last spelling in name order wins,
/// as it would in `reload`.
fn find_in_dir(dir: &Path, name: &str) -> Option<Candidate> {
    let exact = dir.join(name);
    if exact.is_file() {
        return Some(Candidate {
            name: name.to_owned(),
            path: exact,
        });
    }

    let wanted = key(name);
    let mut matches: Vec<Candidate> = fs::read_dir(dir)
        .ok()?
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            let file_name = path.file_name()?.to_str()?.to_owned();
            (path.is_file() && key(&file_name) == wanted).then_some(Candidate {
                name: file_name,
                path,
            })
        })
        .collect();
    matches.sort_by(|a, b| a.name.cmp(&b.name));
    matches.into_iter().next_back()
}

fn decode_all(candidates: &[Candidate]) -> Vec<TraceMatchResult<CanonicalBuffer>> {
    #[cfg(feature = "rayon")]
    {
        candidates
            .par_iter()
            .map(|c| load_canonical(&c.path))
            .collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        candidates.iter().map(|c| load_canonical(&c.path)).collect()
    }
}

impl TemplateStore {
    /// Replaces the whole cache with the images found in `dirs`.
    ///
    /// Each directory is scanned non-recursively for `png`, `jpg`, `jpeg` and
    /// `bmp` files. A file in a later directory replaces an earlier file with
    /// the same case-insensitive name. Unreadable directories and undecodable
    /// files are logged and skipped; they never abort the reload.
    pub fn reload<P: AsRef<Path>>(&self, dirs: &[P]) -> ReloadReport {
        let _serial = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let _span = trace_span!("store_reload", dirs = dirs.len()).entered();

        let mut report = ReloadReport::default();
        let dirs: Vec<PathBuf> = dirs.iter().map(|d| d.as_ref().to_path_buf()).collect();
        let candidates: Vec<Candidate> = dirs
            .iter()
            .flat_map(|dir| list_dir(dir, &mut report))
            .collect();
        let decoded = decode_all(&candidates);

        let mut records = HashMap::with_capacity(candidates.len());
        for (candidate, result) in candidates.into_iter().zip(decoded) {
            match result {
                Ok(buffer) => {
                    trace_event!(
                        "template_loaded",
                        template = candidate.name.as_str(),
                        width = buffer.width(),
                        height = buffer.height()
                    );
                    let record = TemplateRecord::new(candidate.name, buffer);
                    records.insert(key(record.name()), Arc::new(record));
                    report.loaded += 1;
                }
                Err(err) => {
                    let path = candidate.path.display().to_string();
                    let reason = err.to_string();
                    trace_warn!(
                        "template_skipped",
                        path = path.as_str(),
                        reason = reason.as_str()
                    );
                    report.skipped += 1;
                }
            }
        }

        trace_event!(
            "store_reloaded",
            loaded = report.loaded,
            skipped = report.skipped,
            cached = records.len()
        );
        self.replace(records, dirs);
        report
    }

    /// Looks up `name`, falling back to a one-off decode from the reload directories.
    ///
    /// The fallback searches the directories last-to-first (matching reload's
    /// override order) and never inserts into the cache, so single-shot lookups
    /// cannot disturb the records the hot loop is using.
    pub fn resolve(&self, name: &str) -> TraceMatchResult<Arc<TemplateRecord>> {
        if let Ok(record) = self.get(name) {
            return Ok(record);
        }
        trace_debug!("template_cache_miss", template = name);

        if !is_plain_file_name(name) {
            return Err(TraceMatchError::TemplateNotFound {
                name: name.to_owned(),
            });
        }

        for dir in self.directories().iter().rev() {
            let Some(candidate) = find_in_dir(dir, name) else {
                continue;
            };
            let buffer = load_canonical(&candidate.path)?;
            let shown = candidate.path.display().to_string();
            trace_debug!("template_fallback_loaded", path = shown.as_str());
            return Ok(Arc::new(TemplateRecord::new(candidate.name, buffer)));
        }

        Err(TraceMatchError::TemplateNotFound {
            name: name.to_owned(),
        })
    }
}
