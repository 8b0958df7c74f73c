//! Ambient trace-id propagation.
//!
//! Modeled as an explicit scoped context variable rather than relying on an
//! implicit thread-local. Any ambient trace-id
//! present when a message is originated is captured into its envelope
//! ([`crate::message::envelope::Envelope::trace_id`]); the pump installs an
//! envelope's trace-id into this scope for the duration of the handler and the
//! previous value (if any) is restored automatically on every exit path, since
//! [`tokio::task::LocalKey::scope`] restores it regardless of whether the
//! wrapped future returns normally, is cancelled, or panics.

// Layer 1: Standard library imports
use std::future::Future;

// Layer 2: Third-party crate imports
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

tokio::task_local! {
    static TRACE_ID: String;
}

/// Read the ambient trace-id, if one is installed for the current task.
pub fn current_trace_id() -> Option<String> {
    TRACE_ID.try_with(|id| id.clone()).ok()
}

/// Generate a fresh trace-id for a message with no ambient trace-id to capture.
pub fn new_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Install `trace_id` as the ambient trace-id for the duration of `fut`.
///
/// On return, the previously ambient trace-id (if any) becomes visible again.
pub async fn with_trace_id<F, T>(trace_id: String, fut: F) -> T
where
    F: Future<Output = T>,
{
    TRACE_ID.scope(trace_id, fut).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_ambient_trace_outside_scope() {
        assert_eq!(current_trace_id(), None);
    }

    #[tokio::test]
    async fn test_scope_installs_and_restores() {
        assert_eq!(current_trace_id(), None);
        with_trace_id("abc".to_string(), async {
            assert_eq!(current_trace_id(), Some("abc".to_string()));
        })
        .await;
        assert_eq!(current_trace_id(), None);
    }

    #[tokio::test]
    async fn test_nested_scope_restores_outer() {
        with_trace_id("outer".to_string(), async {
            with_trace_id("inner".to_string(), async {
                assert_eq!(current_trace_id(), Some("inner".to_string()));
            })
            .await;
            assert_eq!(current_trace_id(), Some("outer".to_string()));
        })
        .await;
    }

    #[test]
    fn test_new_trace_id_unique() {
        assert_ne!(new_trace_id(), new_trace_id());
    }
}
