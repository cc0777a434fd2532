//! Named template cache shared by concurrent match calls.
//!
//! Templates are decoded and normalized once, at reload time, then handed out
//! as `Arc<TemplateRecord>` so a lookup holds the lock only long enough to
//! clone a pointer. A reload builds the complete new map without the lock and
//! swaps it in under the write lock: readers see either the old map or the new
//! one, never a partially populated one. Reloads are serialized among
//! themselves.
//!
//! Names keep their original case; lookups are case-insensitive.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};

use crate::template::TemplateRecord;
use crate::trace::trace_debug;
use crate::util::{TraceMatchError, TraceMatchResult};

#[cfg(feature = "image-io")]
mod load;

#[cfg(feature = "image-io")]
pub use load::ReloadReport;

#[derive(Default)]
struct StoreState {
    records: HashMap<String, Arc<TemplateRecord>>,
    dirs: Vec<PathBuf>,
}

/// Thread-safe template cache keyed by file name.
#[derive(Default)]
pub struct TemplateStore {
    state: RwLock<StoreState>,
    #[cfg_attr(not(feature = "image-io"), allow(dead_code))]
    reload_lock: Mutex<()>,
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

impl TemplateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from already-normalized records (no disk access).
    ///
    /// Later records replace earlier ones with the same case-insensitive name.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = TemplateRecord>,
    {
        let records = records
            .into_iter()
            .map(|record| (key(record.name()), Arc::new(record)))
            .collect();
        Self {
            state: RwLock::new(StoreState {
                records,
                dirs: Vec::new(),
            }),
            reload_lock: Mutex::new(()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the number of cached templates.
    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().records.is_empty()
    }

    /// Returns the cached template names (original case), sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .read()
            .records
            .values()
            .map(|record| record.name().to_owned())
            .collect();
        names.sort();
        names
    }

    /// Returns the directories of the last reload, in load order.
    pub fn directories(&self) -> Vec<PathBuf> {
        self.read().dirs.clone()
    }

    /// Looks up a cached template by case-insensitive name.
    pub fn get(&self, name: &str) -> TraceMatchResult<Arc<TemplateRecord>> {
        let record = self.read().records.get(&key(name)).cloned();
        match record {
            Some(record) => {
                trace_debug!("template_cache_hit", template = name);
                Ok(record)
            }
            None => Err(TraceMatchError::TemplateNotFound {
                name: name.to_owned(),
            }),
        }
    }

    #[cfg_attr(not(feature = "image-io"), allow(dead_code))]
    fn replace(&self, records: HashMap<String, Arc<TemplateRecord>>, dirs: Vec<PathBuf>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = StoreState { records, dirs };
    }
}

/// Rejects names that would escape the template directories.
#[cfg_attr(not(feature = "image-io"), allow(dead_code))]
pub(crate) fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}
