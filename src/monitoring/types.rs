//! Monitoring event types and configuration structures.
//!
//! Covers every runtime-wide surface operators query: actor lifecycle,
//! mailbox pressure, cluster transport, registry churn, and gateway sessions.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::traits::{EventSeverity, MonitoringEvent};
use crate::message::Handle;

/// Configuration for monitoring behavior.
///
/// Controls how events are recorded, filtered, and stored in the monitor.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringConfig {
    /// Whether monitoring is enabled
    pub enabled: bool,

    /// Maximum number of events to keep in history
    pub max_history_size: usize,

    /// Minimum severity level to record (events below this are filtered)
    pub severity_filter: EventSeverity,

    /// Interval for snapshot generation (if using background snapshots)
    #[serde(with = "crate::util::duration_serde")]
    pub snapshot_interval: Duration,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_history_size: 1000,
            severity_filter: EventSeverity::Info,
            snapshot_interval: Duration::from_secs(60),
        }
    }
}

/// Snapshot of monitoring state at a point in time.
///
/// Provides queryable access to monitoring counters and recent event history.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringSnapshot<E: MonitoringEvent> {
    /// Timestamp when snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Total number of events recorded
    pub total_events: u64,

    /// Number of trace-level events
    pub trace_count: u64,

    /// Number of debug-level events
    pub debug_count: u64,

    /// Number of info-level events
    pub info_count: u64,

    /// Number of warning-level events
    pub warning_count: u64,

    /// Number of error-level events
    pub error_count: u64,

    /// Number of critical-level events
    pub critical_count: u64,

    /// Recent events (up to max_history_size)
    pub recent_events: Vec<E>,
}

// ============================================================================
// Actor Events
// ============================================================================

/// Events related to actor lifecycle and message processing.
#[derive(Debug, Clone, Serialize)]
pub struct ActorEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// Handle of the actor this event concerns.
    pub handle: Handle,

    /// Specific actor event type
    pub event_kind: ActorEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for ActorEvent {
    const EVENT_TYPE: &'static str = "actor";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            ActorEventKind::Created => EventSeverity::Debug,
            ActorEventKind::Started => EventSeverity::Info,
            ActorEventKind::MessageProcessed { .. } => EventSeverity::Trace,
            ActorEventKind::HandlerErrored { .. } => EventSeverity::Error,
            ActorEventKind::Killed => EventSeverity::Info,
        }
    }
}

/// Specific types of actor events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ActorEventKind {
    /// The actor entry was published to the registry.
    Created,

    /// The start hook returned successfully and the mailbox began serving.
    Started,

    /// The pump finished one handler invocation.
    MessageProcessed {
        /// Processing duration in microseconds.
        duration_micros: u64,
    },

    /// A handler returned an error (pump continues regardless).
    HandlerErrored {
        /// Error message
        error: String,
    },

    /// The actor was destroyed via `kill` or system shutdown.
    Killed,
}

// ============================================================================
// System Events
// ============================================================================

/// Events related to actor system operations.
#[derive(Debug, Clone, Serialize)]
pub struct SystemEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// Specific system event type
    pub event_kind: SystemEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for SystemEvent {
    const EVENT_TYPE: &'static str = "system";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            SystemEventKind::Started => EventSeverity::Info,
            SystemEventKind::Shutdown => EventSeverity::Info,
            SystemEventKind::ActorRegistered { .. } => EventSeverity::Debug,
            SystemEventKind::ActorDeregistered { .. } => EventSeverity::Debug,
            SystemEventKind::NameClaimRolledBack { .. } => EventSeverity::Warning,
        }
    }
}

/// Specific types of system events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SystemEventKind {
    /// Actor system started
    Started,

    /// Actor system shutting down
    Shutdown,

    /// Actor registered with the system
    ActorRegistered {
        /// Handle of the registered actor
        handle: Handle,
    },

    /// Actor deregistered from the system
    ActorDeregistered {
        /// Handle of the deregistered actor
        handle: Handle,
    },

    /// A local registration succeeded but the cluster name claim failed, so
    /// the local actor and name were rolled back before the error surfaced
    /// to the caller.
    NameClaimRolledBack {
        /// The name whose cluster claim was rejected.
        name: String,
    },
}

// ============================================================================
// Mailbox Events
// ============================================================================

/// Events related to mailbox queue depth.
#[derive(Debug, Clone, Serialize)]
pub struct MailboxEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// Handle of the actor owning the mailbox
    pub handle: Handle,

    /// Specific mailbox event type
    pub event_kind: MailboxEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for MailboxEvent {
    const EVENT_TYPE: &'static str = "mailbox";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            MailboxEventKind::Enqueued { .. } => EventSeverity::Trace,
            MailboxEventKind::Dequeued { .. } => EventSeverity::Trace,
            MailboxEventKind::Destroyed => EventSeverity::Debug,
        }
    }
}

/// Specific types of mailbox events. The mailbox is unbounded so there
/// is no backpressure/drop variant — only depth tracking and teardown.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum MailboxEventKind {
    /// Message enqueued; carries the queue depth immediately after.
    Enqueued {
        /// Current queue size
        queue_size: u64,
    },

    /// Message dequeued; carries the queue depth immediately after.
    Dequeued {
        /// Remaining queue size
        queue_size: u64,
    },

    /// The mailbox was closed and its remaining items drained.
    Destroyed,
}

// ============================================================================
// Transport / cluster events
// ============================================================================

/// Events related to the TCP cluster transport.
#[derive(Debug, Clone, Serialize)]
pub struct TransportEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// The peer node this event concerns, if known.
    pub peer_node_id: Option<String>,

    /// Specific transport event type
    pub event_kind: TransportEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for TransportEvent {
    const EVENT_TYPE: &'static str = "transport";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            TransportEventKind::HandshakeCompleted => EventSeverity::Info,
            TransportEventKind::ConnectionClosed { .. } => EventSeverity::Warning,
            TransportEventKind::PendingCallFaulted { .. } => EventSeverity::Error,
            TransportEventKind::HeartbeatSent | TransportEventKind::HeartbeatReceived => {
                EventSeverity::Trace
            }
        }
    }
}

/// Specific types of transport events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum TransportEventKind {
    /// Both sides exchanged their node-id handshake.
    HandshakeCompleted,

    /// The connection was torn down by a read/write error or EOF.
    ConnectionClosed {
        /// Human-readable reason.
        reason: String,
    },

    /// An outbound heartbeat frame was written.
    HeartbeatSent,

    /// An inbound heartbeat frame was read.
    HeartbeatReceived,

    /// A pending call was resolved with a remote fault.
    PendingCallFaulted {
        /// The fault's type tag.
        type_tag: String,
    },
}

// ============================================================================
// Registry events
// ============================================================================

/// Events related to the cluster registry.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// The service name this event concerns.
    pub name: String,

    /// Specific registry event type
    pub event_kind: RegistryEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for RegistryEvent {
    const EVENT_TYPE: &'static str = "registry";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            RegistryEventKind::Claimed { .. } => EventSeverity::Info,
            RegistryEventKind::Released => EventSeverity::Info,
            RegistryEventKind::ClaimRejected { .. } => EventSeverity::Warning,
            RegistryEventKind::CacheInvalidated => EventSeverity::Trace,
        }
    }
}

/// Specific types of registry events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum RegistryEventKind {
    /// `register_local_actor` succeeded.
    Claimed {
        /// The handle now bound to this name.
        handle: Handle,
    },

    /// `unregister_local_actor` completed.
    Released,

    /// A name claim lost to another live node.
    ClaimRejected {
        /// The node that already owns the name.
        owner: String,
    },

    /// A pub/sub notification invalidated or primed this name's cache entry.
    CacheInvalidated,
}

// ============================================================================
// Gateway events
// ============================================================================

/// Events related to the external-client gateway and its sessions.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// The session this event concerns.
    pub session_id: String,

    /// Specific gateway event type
    pub event_kind: GatewayEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for GatewayEvent {
    const EVENT_TYPE: &'static str = "gateway";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            GatewayEventKind::Accepted { .. } => EventSeverity::Info,
            GatewayEventKind::Closed { .. } => EventSeverity::Info,
            GatewayEventKind::ProtocolViolation { .. } => EventSeverity::Warning,
        }
    }
}

/// Specific types of gateway events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum GatewayEventKind {
    /// A client connection was accepted and bound to a session actor.
    Accepted {
        /// "tcp" or "ws".
        protocol: String,
    },

    /// The session was closed, for whatever reason.
    Closed {
        /// The close reason's debug label.
        reason: String,
    },

    /// Framing or protocol validation failed and the session was closed.
    ProtocolViolation {
        /// Human-readable detail.
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h() -> Handle {
        Handle::new(1).unwrap()
    }

    #[test]
    fn test_monitoring_config_default() {
        let config = MonitoringConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_history_size, 1000);
        assert_eq!(config.severity_filter, EventSeverity::Info);
        assert_eq!(config.snapshot_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_actor_event_severity() {
        let event = ActorEvent {
            timestamp: Utc::now(),
            handle: h(),
            event_kind: ActorEventKind::Started,
            metadata: HashMap::new(),
        };

        assert_eq!(event.severity(), EventSeverity::Info);
        assert_eq!(ActorEvent::EVENT_TYPE, "actor");
    }

    #[test]
    fn test_actor_event_handler_errored_is_error_severity() {
        let event = ActorEvent {
            timestamp: Utc::now(),
            handle: h(),
            event_kind: ActorEventKind::HandlerErrored { error: "boom".to_string() },
            metadata: HashMap::new(),
        };
        assert_eq!(event.severity(), EventSeverity::Error);
    }

    #[test]
    fn test_system_event_severity() {
        let event = SystemEvent {
            timestamp: Utc::now(),
            event_kind: SystemEventKind::Started,
            metadata: HashMap::new(),
        };

        assert_eq!(event.severity(), EventSeverity::Info);
        assert_eq!(SystemEvent::EVENT_TYPE, "system");
    }

    #[test]
    fn test_transport_event_severity() {
        let event = TransportEvent {
            timestamp: Utc::now(),
            peer_node_id: Some("node-b".to_string()),
            event_kind: TransportEventKind::ConnectionClosed { reason: "eof".to_string() },
            metadata: HashMap::new(),
        };
        assert_eq!(event.severity(), EventSeverity::Warning);
        assert_eq!(TransportEvent::EVENT_TYPE, "transport");
    }

    #[test]
    fn test_registry_event_severity() {
        let event = RegistryEvent {
            timestamp: Utc::now(),
            name: "boss".to_string(),
            event_kind: RegistryEventKind::ClaimRejected { owner: "node-a".to_string() },
            metadata: HashMap::new(),
        };
        assert_eq!(event.severity(), EventSeverity::Warning);
        assert_eq!(RegistryEvent::EVENT_TYPE, "registry");
    }

    #[test]
    fn test_gateway_event_severity() {
        let event = GatewayEvent {
            timestamp: Utc::now(),
            session_id: "s-1".to_string(),
            event_kind: GatewayEventKind::ProtocolViolation { detail: "oversized frame".to_string() },
            metadata: HashMap::new(),
        };
        assert_eq!(event.severity(), EventSeverity::Warning);
        assert_eq!(GatewayEvent::EVENT_TYPE, "gateway");
    }

    #[test]
    fn test_mailbox_event_severity() {
        let event = MailboxEvent {
            timestamp: Utc::now(),
            handle: h(),
            event_kind: MailboxEventKind::Destroyed,
            metadata: HashMap::new(),
        };

        assert_eq!(event.severity(), EventSeverity::Debug);
        assert_eq!(MailboxEvent::EVENT_TYPE, "mailbox");
    }

    #[test]
    fn test_monitoring_snapshot_creation() {
        let snapshot = MonitoringSnapshot::<ActorEvent> {
            timestamp: Utc::now(),
            total_events: 100,
            trace_count: 10,
            debug_count: 20,
            info_count: 30,
            warning_count: 25,
            error_count: 10,
            critical_count: 5,
            recent_events: vec![],
        };

        assert_eq!(snapshot.total_events, 100);
        assert_eq!(snapshot.trace_count, 10);
        assert_eq!(snapshot.critical_count, 5);
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_event_metadata() {
        let mut metadata = HashMap::new();
        metadata.insert("custom_key".to_string(), "custom_value".to_string());

        let event = SystemEvent {
            timestamp: Utc::now(),
            event_kind: SystemEventKind::Started,
            metadata,
        };

        assert_eq!(
            event.metadata.get("custom_key").expect("Key should exist"),
            "custom_value"
        );
    }
}
