//! Actor system configuration.

// Layer 1: Standard library
use std::time::Duration;

// Layer 2: Third-party
use serde::{Deserialize, Serialize};

// Layer 3: Internal
use super::errors::SystemError;

/// Default timeout for actor spawn operations (5 seconds)
pub const DEFAULT_SPAWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for graceful system shutdown (30 seconds)
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum concurrent actors (0 = unlimited)
pub const DEFAULT_MAX_ACTORS: usize = 0;

/// Per-node offset [`crate::message::HandleAllocator`] starts from. A
/// cluster deployment gives each node a disjoint range so auto-allocated
/// handles never collide across nodes.
pub const DEFAULT_HANDLE_OFFSET: u64 = 0;

pub const DEFAULT_ENABLE_METRICS: bool = true;

const DEFAULT_NODE_ID: &str = "local";

/// System-wide configuration for one actor runtime instance.
///
/// # Examples
///
/// ```rust
/// use hearth_rt::system::SystemConfig;
///
/// let config = SystemConfig::default();
/// assert_eq!(config.node_id, "local");
///
/// let config = SystemConfig::builder()
///     .with_node_id("node-a")
///     .with_handle_offset(1_000_000)
///     .build()
///     .unwrap();
/// assert_eq!(config.handle_offset, 1_000_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Identifies this node within a cluster; also the default trace-scope label.
    pub node_id: String,

    /// Offset [`crate::message::HandleAllocator`] starts auto-allocating from.
    pub handle_offset: u64,

    /// Timeout for an actor's `on_start` hook during `create`.
    pub spawn_timeout: Duration,

    /// Timeout for graceful system shutdown.
    pub shutdown_timeout: Duration,

    /// Maximum concurrent actors (0 = unlimited)
    pub max_actors: usize,

    /// Enable the metrics registry.
    pub enable_metrics: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            node_id: DEFAULT_NODE_ID.to_string(),
            handle_offset: DEFAULT_HANDLE_OFFSET,
            spawn_timeout: DEFAULT_SPAWN_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            max_actors: DEFAULT_MAX_ACTORS,
            enable_metrics: DEFAULT_ENABLE_METRICS,
        }
    }
}

impl SystemConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SystemConfigBuilder {
        SystemConfigBuilder::default()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), SystemError> {
        if self.node_id.trim().is_empty() {
            return Err(SystemError::ConfigError("node_id must not be empty".to_string()));
        }
        if self.spawn_timeout.is_zero() {
            return Err(SystemError::ConfigError("spawn_timeout must be > 0".to_string()));
        }
        if self.shutdown_timeout.is_zero() {
            return Err(SystemError::ConfigError("shutdown_timeout must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`SystemConfig`] with a fluent API.
#[derive(Debug, Default)]
pub struct SystemConfigBuilder {
    config: SystemConfig,
}

impl SystemConfigBuilder {
    /// Set this node's identity within a cluster.
    pub fn with_node_id(mut self, node_id: impl Into<String>) -> Self {
        self.config.node_id = node_id.into();
        self
    }

    /// Set the offset handle auto-allocation starts from.
    pub fn with_handle_offset(mut self, offset: u64) -> Self {
        self.config.handle_offset = offset;
        self
    }

    /// Set timeout for actor spawn operations.
    pub fn with_spawn_timeout(mut self, timeout: Duration) -> Self {
        self.config.spawn_timeout = timeout;
        self
    }

    /// Set timeout for graceful system shutdown.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    /// Set maximum number of concurrent actors (0 = unlimited).
    pub fn with_max_actors(mut self, max: usize) -> Self {
        self.config.max_actors = max;
        self
    }

    /// Enable or disable the metrics registry.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.config.enable_metrics = enabled;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<SystemConfig, SystemError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SystemConfig::default();
        assert_eq!(config.node_id, "local");
        assert_eq!(config.spawn_timeout, Duration::from_secs(5));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(30));
        assert_eq!(config.max_actors, 0);
        assert!(config.enable_metrics);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(SystemConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_node_id() {
        let invalid = SystemConfig { node_id: "  ".to_string(), ..Default::default() };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_spawn_timeout() {
        let invalid = SystemConfig { spawn_timeout: Duration::from_secs(0), ..Default::default() };
        let result = invalid.validate();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_zero_shutdown_timeout() {
        let invalid = SystemConfig { shutdown_timeout: Duration::from_secs(0), ..Default::default() };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_builder_multiple_options() {
        let config = SystemConfig::builder()
            .with_node_id("node-b")
            .with_handle_offset(5_000)
            .with_spawn_timeout(Duration::from_secs(10))
            .with_shutdown_timeout(Duration::from_secs(60))
            .with_max_actors(100)
            .with_metrics(false)
            .build()
            .unwrap();

        assert_eq!(config.node_id, "node-b");
        assert_eq!(config.handle_offset, 5_000);
        assert_eq!(config.spawn_timeout, Duration::from_secs(10));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(60));
        assert_eq!(config.max_actors, 100);
        assert!(!config.enable_metrics);
    }

    #[test]
    fn test_builder_validation_failure() {
        let result = SystemConfig::builder().with_node_id("").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_serialization_json() {
        let config = SystemConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.node_id, deserialized.node_id);
        assert_eq!(config.max_actors, deserialized.max_actors);
    }
}
