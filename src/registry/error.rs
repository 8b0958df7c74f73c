//! Cluster registry error taxonomy.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Errors surfaced by a [`super::ClusterRegistry`] implementation.
#[derive(Debug, Error, Clone)]
pub enum RegistryError {
    /// `register_local_actor` lost a name claim to another live node.
    #[error("name {name:?} is already claimed by node {owner:?}")]
    NameTaken { name: String, owner: String },

    /// No location or descriptor was found for the given key.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing KV/pub-sub store returned an error.
    #[error("registry backend error: {0}")]
    Backend(String),

    /// Construction-time configuration failed validation.
    #[error("invalid registry configuration: {0}")]
    InvalidConfig(String),
}

impl RegistryError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NameTaken { .. } | Self::InvalidConfig(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_taken_display() {
        let err = RegistryError::NameTaken { name: "boss".to_string(), owner: "node-b".to_string() };
        assert!(err.to_string().contains("boss"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_backend_is_transient() {
        assert!(RegistryError::Backend("timeout".to_string()).is_transient());
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let err = RegistryError::InvalidConfig("heartbeat_interval must be shorter than registration_ttl".to_string());
        assert!(err.is_fatal());
        assert!(!err.is_transient());
    }
}
