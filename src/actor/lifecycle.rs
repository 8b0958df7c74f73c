//! Actor lifecycle state tracked by the host.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
// (none)

/// Where an actor sits in its run, per the host's pump.
///
/// ```text
/// Starting -> Running -> Stopping -> Stopped
/// ```
///
/// There is no `Failed` state: a handler error never halts the pump, so the only way out of `Running` is a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    /// The start hook is running; the mailbox is not yet served.
    Starting,
    /// The mailbox is being served.
    Running,
    /// Cancellation has been requested; draining in-flight work.
    Stopping,
    /// The stop hook has completed and the stop promise is fulfilled.
    Stopped,
}

impl Default for ActorState {
    fn default() -> Self {
        Self::Starting
    }
}

/// Tracks one actor's current state and when it last changed.
#[derive(Debug, Clone)]
pub struct ActorLifecycle {
    state: ActorState,
    last_state_change: DateTime<Utc>,
}

impl ActorLifecycle {
    pub fn new() -> Self {
        Self {
            state: ActorState::Starting,
            last_state_change: Utc::now(),
        }
    }

    pub fn transition_to(&mut self, new_state: ActorState) {
        self.state = new_state;
        self.last_state_change = Utc::now();
    }

    pub fn state(&self) -> ActorState {
        self.state
    }

    pub fn last_state_change(&self) -> DateTime<Utc> {
        self.last_state_change
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ActorState::Stopped)
    }

    pub fn is_running(&self) -> bool {
        self.state == ActorState::Running
    }
}

impl Default for ActorLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_starts_in_starting() {
        let lifecycle = ActorLifecycle::new();
        assert_eq!(lifecycle.state(), ActorState::Starting);
        assert!(!lifecycle.is_terminal());
        assert!(!lifecycle.is_running());
    }

    #[test]
    fn test_transitions_update_last_change() {
        let mut lifecycle = ActorLifecycle::new();
        let first = lifecycle.last_state_change();
        std::thread::sleep(std::time::Duration::from_millis(5));
        lifecycle.transition_to(ActorState::Running);
        assert!(lifecycle.last_state_change() >= first);
        assert!(lifecycle.is_running());
    }

    #[test]
    fn test_stopped_is_terminal() {
        let mut lifecycle = ActorLifecycle::new();
        lifecycle.transition_to(ActorState::Running);
        lifecycle.transition_to(ActorState::Stopping);
        lifecycle.transition_to(ActorState::Stopped);
        assert!(lifecycle.is_terminal());
        assert!(!lifecycle.is_running());
    }

    #[test]
    fn test_state_default() {
        assert_eq!(ActorState::default(), ActorState::Starting);
    }
}
