//! Resolution cache.
//!
//! Maps a concrete (source key, target key) pair to the outcome of a prior
//! hierarchy search: the chosen adapter, the no-op fallback, or the explicit
//! "no adapter" sentinel. Entries are derived, never authoritative: the
//! cache can be cleared at any time without affecting correctness, only
//! performance.
//!
//! Reads take a read lock; a write lock is taken only to insert a
//! first-computed entry. Two threads racing to insert the same key is
//! idempotent last-write-wins.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use recast_registry::{Adapter, TypeKey};

/// Outcome of resolving a concrete type pair.
#[derive(Clone)]
pub(crate) enum Resolution {
    /// An explicit adapter (possibly a factory-produced sub-adapter).
    Found(Arc<Adapter>),
    /// The implicit identity fallback applies.
    NoOp,
    /// No adapter exists for this pair.
    NotFound,
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Found(adapter) => f.debug_tuple("Found").field(adapter).finish(),
            Resolution::NoOp => f.write_str("NoOp"),
            Resolution::NotFound => f.write_str("NotFound"),
        }
    }
}

/// Concurrent map from concrete raw-type pairs to resolution outcomes.
#[derive(Debug, Default)]
pub(crate) struct ResolutionCache {
    entries: RwLock<FxHashMap<(TypeKey, TypeKey), Resolution>>,
}

impl ResolutionCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: (TypeKey, TypeKey)) -> Option<Resolution> {
        self.entries.read().get(&key).cloned()
    }

    pub(crate) fn insert(&self, key: (TypeKey, TypeKey), resolution: Resolution) {
        self.entries.write().insert(key, resolution);
    }

    pub(crate) fn clear(&self) {
        self.entries.write().clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}
