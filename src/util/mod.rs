//! Cross-cutting identifiers and the ambient trace-id context.

pub mod ids;
pub mod serde_helpers;
pub mod trace;

pub use ids::SessionId;
pub use serde_helpers::duration_serde;
pub use trace::{current_trace_id, new_trace_id, with_trace_id};
