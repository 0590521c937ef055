//! Process-wide cache of decoded shapes.
//!
//! Entries are keyed by the concrete type and the options it was decoded with, and are
//! never evicted. The lock is only held for a single lookup or insert, never across a
//! decode, so nested decodes of other types can use the cache freely.

use super::{DocumentationObject, ReflectOptions, TypeHandle};
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// A decoded shape together with the placeholder value that produced it
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
    pub(crate) sample: Value,
    pub(crate) documentation: DocumentationObject,
}

type CacheKey = (TypeHandle, ReflectOptions);

static CACHE: OnceLock<Mutex<HashMap<CacheKey, CacheEntry>>> = OnceLock::new();

fn entries() -> MutexGuard<'static, HashMap<CacheKey, CacheEntry>> {
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    match cache.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("Shape cache lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

pub(crate) fn lookup(ty: TypeHandle, options: &ReflectOptions) -> Option<CacheEntry> {
    entries().get(&(ty, *options)).cloned()
}

pub(crate) fn insert(ty: TypeHandle, options: ReflectOptions, entry: CacheEntry) {
    entries().insert((ty, options), entry);
}

/// Drop every cached shape, e.g. after registering capabilities for types that were
/// already reflected
pub fn clear_cache() {
    let mut entries = entries();
    debug!("Clearing {} cached shapes", entries.len());
    entries.clear();
}

/// Number of cached shapes
pub fn cached_type_count() -> usize {
    entries().len()
}
