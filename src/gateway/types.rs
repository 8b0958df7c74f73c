//! Shared value types crossing the gateway/router boundary.

// Layer 1: Standard library imports
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

// Layer 2: Third-party crate imports
use bytes::Bytes;
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
use crate::util::SessionId;

/// One reassembled message from (or to) an external client.
///
/// TCP carries only `Binary` (its framing has no text/binary distinction);
/// WebSocket carries whichever frame type the client sent, and a router
/// reply in kind is expected but not enforced.
#[derive(Debug, Clone)]
pub enum ClientMessage {
    Binary(Bytes),
    Text(String),
}

impl ClientMessage {
    pub fn len(&self) -> usize {
        match self {
            Self::Binary(bytes) => bytes.len(),
            Self::Text(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The client closed the connection or its read side returned EOF.
    ClientDisconnected,
    /// The gateway is shutting down.
    ServerShutdown,
    /// Framing or message validation failed.
    ProtocolViolation(String),
    /// The idle monitor observed no activity within the configured window.
    HeartbeatTimeout,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientDisconnected => write!(f, "client disconnected"),
            Self::ServerShutdown => write!(f, "server shutdown"),
            Self::ProtocolViolation(detail) => write!(f, "protocol violation: {detail}"),
            Self::HeartbeatTimeout => write!(f, "heartbeat timeout"),
        }
    }
}

/// Immutable, per-session identity handed to the router.
#[derive(Debug, Clone)]
pub struct SessionMetadata {
    pub session_id: SessionId,
    /// "tcp" or "ws".
    pub protocol: &'static str,
    pub remote_addr: Option<SocketAddr>,
    pub connected_at: DateTime<Utc>,
}

/// Tracks when a session last saw activity, for the idle monitor.
///
/// Shared between the session actor (which touches it on every inbound and
/// outbound message) and the idle-monitor task the gateway spawns alongside
/// it; a plain atomic avoids a lock on the per-message hot path.
#[derive(Debug)]
pub struct ActivityTracker {
    last_activity_millis: AtomicI64,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self { last_activity_millis: AtomicI64::new(Utc::now().timestamp_millis()) }
    }

    /// Record activity now.
    pub fn touch(&self) {
        self.last_activity_millis.store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Time elapsed since the last recorded activity.
    pub fn age(&self) -> Duration {
        let last = self.last_activity_millis.load(Ordering::Relaxed);
        let elapsed_millis = (Utc::now().timestamp_millis() - last).max(0);
        Duration::from_millis(elapsed_millis as u64)
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_tracker_starts_fresh() {
        let tracker = ActivityTracker::new();
        assert!(tracker.age() < Duration::from_millis(50));
    }

    #[test]
    fn test_activity_tracker_touch_resets_age() {
        let tracker = ActivityTracker::new();
        std::thread::sleep(Duration::from_millis(20));
        tracker.touch();
        assert!(tracker.age() < Duration::from_millis(20));
    }

    #[test]
    fn test_client_message_len() {
        assert_eq!(ClientMessage::Text("hi".to_string()).len(), 2);
        assert_eq!(ClientMessage::Binary(Bytes::from_static(b"abc")).len(), 3);
        assert!(ClientMessage::Text(String::new()).is_empty());
    }

    #[test]
    fn test_close_reason_display() {
        let reason = CloseReason::ProtocolViolation("oversized frame".to_string());
        assert!(reason.to_string().contains("oversized frame"));
    }
}
