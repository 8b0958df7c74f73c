//! Keys [`MetricsEntry`] instances by [`Handle`] for operator queries.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use super::entry::{MetricsEntry, MetricsSnapshot};
use crate::message::Handle;

/// Registry binding `handle → metrics entry`.
///
/// Operations for an unknown handle are no-ops (or return `None`/`false`) so
/// a racing unregister never turns a late metrics call into an error.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    entries: DashMap<Handle, Arc<MetricsEntry>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handle` to a fresh entry and return it for the caller to share
    /// with the mailbox and pump.
    pub fn register(
        &self,
        handle: Handle,
        name: Option<String>,
        implementation_tag: impl Into<String>,
    ) -> Arc<MetricsEntry> {
        let entry = Arc::new(MetricsEntry::new(handle, name, implementation_tag));
        self.entries.insert(handle, Arc::clone(&entry));
        entry
    }

    /// Remove `handle`'s entry. A no-op if it was never registered.
    pub fn unregister(&self, handle: Handle) {
        self.entries.remove(&handle);
    }

    pub fn get(&self, handle: Handle) -> Option<Arc<MetricsEntry>> {
        self.entries.get(&handle).map(|e| Arc::clone(e.value()))
    }

    /// Value-copy snapshot for one actor, or `None` if unknown.
    pub fn try_snapshot(&self, handle: Handle) -> Option<MetricsSnapshot> {
        self.entries.get(&handle).map(|e| e.snapshot())
    }

    /// Point-in-time slice over every registered actor.
    pub fn snapshot_all(&self) -> Vec<MetricsSnapshot> {
        self.entries.iter().map(|e| e.snapshot()).collect()
    }

    /// Toggle `handle`'s trace bit. Returns false for an unknown handle or
    /// when the bit was already at the requested value.
    pub fn set_trace_enabled(&self, handle: Handle, enabled: bool) -> bool {
        self.entries
            .get(&handle)
            .map(|e| e.set_trace_enabled(enabled))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
