//! Lock-free per-actor metrics and the registry that keys them by handle.
//!
//! Counters live on [`MetricsEntry`], one per actor, shared between the
//! mailbox's writer side (enqueue) and its single reader (the pump). The
//! [`MetricsRegistry`] binds `handle → entry` so operators can query any
//! actor's metrics without holding a reference to the actor itself.

mod entry;
mod registry;

pub use entry::{MetricsEntry, MetricsSnapshot};
pub use registry::MetricsRegistry;
