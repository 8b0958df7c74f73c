//! One actor's atomic counters and trace bit.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

// Layer 3: Internal module imports
use crate::message::Handle;

/// Immutable, point-in-time copy of one actor's metrics.
///
/// Returned by [`super::MetricsRegistry::try_snapshot`] /
/// [`super::MetricsRegistry::snapshot_all`]; taking a snapshot never blocks
/// the counters it copies.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub handle: Handle,
    pub name: Option<String>,
    pub implementation_tag: String,
    pub queue_length: u64,
    pub processed_count: u64,
    pub exception_count: u64,
    pub average_processing_ticks: u64,
    pub last_enqueued_at: Option<DateTime<Utc>>,
    pub last_processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub trace_enabled: bool,
}

/// Live, atomically-updated metrics bound to one actor handle.
///
/// Registration binds `handle → (name, implementation tag, created-at)`;
/// every counter thereafter is lock-free and safe to call from any thread
///. Queue length is clamped at zero on dequeue so a dequeue racing
/// ahead of its matching enqueue snapshot never reports negative depth.
#[derive(Debug)]
pub struct MetricsEntry {
    handle: Handle,
    name: RwLock<Option<String>>,
    implementation_tag: String,
    queue_length: AtomicI64,
    processed_count: AtomicU64,
    exception_count: AtomicU64,
    total_processing_ticks: AtomicU64,
    last_enqueued_at: RwLock<Option<DateTime<Utc>>>,
    last_processed_at: RwLock<Option<DateTime<Utc>>>,
    created_at: DateTime<Utc>,
    trace_enabled: AtomicBool,
}

impl MetricsEntry {
    /// Bind a fresh entry to `handle`, stamping `created_at` as now.
    pub fn new(handle: Handle, name: Option<String>, implementation_tag: impl Into<String>) -> Self {
        Self {
            handle,
            name: RwLock::new(name),
            implementation_tag: implementation_tag.into(),
            queue_length: AtomicI64::new(0),
            processed_count: AtomicU64::new(0),
            exception_count: AtomicU64::new(0),
            total_processing_ticks: AtomicU64::new(0),
            last_enqueued_at: RwLock::new(None),
            last_processed_at: RwLock::new(None),
            created_at: Utc::now(),
            trace_enabled: AtomicBool::new(false),
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Record an enqueue: bump queue length, stamp last-enqueued time.
    pub fn record_enqueued(&self) {
        self.queue_length.fetch_add(1, Ordering::Relaxed);
        *self.last_enqueued_at.write() = Some(Utc::now());
    }

    /// Record a dequeue: drop queue length, clamped at zero.
    pub fn record_dequeued(&self) {
        let mut current = self.queue_length.load(Ordering::Relaxed);
        loop {
            let next = (current - 1).max(0);
            match self.queue_length.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }

    /// Record a completed handler invocation that took `ticks` processing units.
    pub fn record_processed(&self, ticks: u64) {
        self.processed_count.fetch_add(1, Ordering::Relaxed);
        self.total_processing_ticks.fetch_add(ticks, Ordering::Relaxed);
        *self.last_processed_at.write() = Some(Utc::now());
    }

    /// Record a handler exception.
    pub fn record_exception(&self) {
        self.exception_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Toggle the trace bit to `enabled`. Returns true iff the state actually changed.
    pub fn set_trace_enabled(&self, enabled: bool) -> bool {
        self.trace_enabled
            .compare_exchange(!enabled, enabled, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn trace_enabled(&self) -> bool {
        self.trace_enabled.load(Ordering::Relaxed)
    }

    /// Copy the current state into an immutable snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let processed = self.processed_count.load(Ordering::Relaxed);
        let total_ticks = self.total_processing_ticks.load(Ordering::Relaxed);
        let average = if processed == 0 { 0 } else { total_ticks / processed };

        MetricsSnapshot {
            handle: self.handle,
            name: self.name.read().clone(),
            implementation_tag: self.implementation_tag.clone(),
            queue_length: self.queue_length.load(Ordering::Relaxed).max(0) as u64,
            processed_count: processed,
            exception_count: self.exception_count.load(Ordering::Relaxed),
            average_processing_ticks: average,
            last_enqueued_at: *self.last_enqueued_at.read(),
            last_processed_at: *self.last_processed_at.read(),
            created_at: self.created_at,
            trace_enabled: self.trace_enabled(),
        }
    }
}
