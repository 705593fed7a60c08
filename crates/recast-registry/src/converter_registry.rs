//! ConverterRegistry - pair-indexed adapter storage.
//!
//! Maps each [`ConvertiblePair`] to the ordered list of adapters declared
//! for it. Insertion order is the tie-break among adapters registered for
//! the same pair: earlier registrations win.
//!
//! # Thread Safety
//!
//! Mutation is an administrative operation performed during the
//! configuration phase, before concurrent read traffic begins. The facade
//! owns the registry behind `&mut self` registration methods, so the borrow
//! checker enforces the single-writer phase; lookups on shared references
//! are safe from any thread.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use recast_core::ConvertiblePair;

use crate::Adapter;

/// Pair-indexed storage of registered adapters.
#[derive(Debug, Default)]
pub struct ConverterRegistry {
    by_pair: FxHashMap<ConvertiblePair, Vec<Arc<Adapter>>>,
}

impl ConverterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under every pair it declares.
    ///
    /// For each pair the adapter is appended after previously registered
    /// adapters for the same pair.
    pub fn register(&mut self, adapter: Arc<Adapter>) {
        debug!(adapter = ?adapter, "registered adapter");
        for &pair in adapter.pairs() {
            self.by_pair.entry(pair).or_default().push(Arc::clone(&adapter));
        }
    }

    /// Remove all adapters declared for exactly this pair.
    ///
    /// Returns whether anything was removed. Adapters that also declare
    /// other pairs stay registered under those.
    pub fn remove(&mut self, pair: ConvertiblePair) -> bool {
        let removed = self.by_pair.remove(&pair).is_some();
        if removed {
            debug!(%pair, "removed convertible pair");
        }
        removed
    }

    /// The adapters registered for exactly this pair, in registration order.
    pub fn lookup(&self, pair: ConvertiblePair) -> &[Arc<Adapter>] {
        self.by_pair.get(&pair).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The number of distinct pairs with at least one adapter.
    pub fn pair_count(&self) -> usize {
        self.by_pair.len()
    }

    /// Whether no adapters are registered.
    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }
}
