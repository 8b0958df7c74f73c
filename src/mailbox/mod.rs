//! Per-actor mailboxes and the metrics they feed.
//!
//! A mailbox is an unbounded FIFO: a single reader (the actor's pump, see
//! [`crate::actor::host`]) and any number of writers. There is no
//! backpressure strategy and no priority lane — ordering is exactly the
//! order in which enqueues linearize.

pub mod error;
pub mod metrics;
pub mod queue;

pub use error::MailboxError;
pub use metrics::{MetricsEntry, MetricsRegistry, MetricsSnapshot};
pub use queue::{CallOutcome, Mailbox, MailboxItem, MailboxSender};
