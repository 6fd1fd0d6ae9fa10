//! Configuration types for the discovery system
//!
//! This module defines all configuration structures used throughout the crate.
//! Values are assembled once at startup (file plus environment overrides,
//! handled by the daemon) and stay immutable for the process lifetime.

use serde::{Deserialize, Serialize};

/// Main discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Deployment region identifier (validated into a `Region` at startup)
    pub region: String,

    /// Inventory source configuration
    pub inventory: InventoryConfig,

    /// Job label attached to every published target group
    pub job: String,

    /// Target sink configuration
    pub sink: SinkConfig,

    /// Seconds between reconciliation cycles
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DiscoveryConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.region.is_empty() {
            return Err(crate::Error::config("region cannot be empty"));
        }
        if self.job.is_empty() {
            return Err(crate::Error::config("job name cannot be empty"));
        }
        if self.refresh_interval_secs == 0 {
            return Err(crate::Error::config("refresh interval must be > 0"));
        }

        self.inventory.validate()?;
        self.sink.validate()?;

        Ok(())
    }
}

/// Inventory source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InventoryConfig {
    /// NetBox inventory API
    Netbox {
        /// Host name of the NetBox instance (scheme is always https)
        host: String,
    },

    /// Custom inventory source
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl InventoryConfig {
    /// Validate the inventory source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            InventoryConfig::Netbox { host } => {
                if host.is_empty() {
                    return Err(crate::Error::config("NetBox host cannot be empty"));
                }
                Ok(())
            }
            InventoryConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom inventory source factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom inventory source config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the source type name
    pub fn type_name(&self) -> &str {
        match self {
            InventoryConfig::Netbox { .. } => "netbox",
            InventoryConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Target sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkConfig {
    /// Kubernetes ConfigMap sink
    ConfigMap {
        /// Name of the ConfigMap object (must pre-exist)
        name: String,
        /// Namespace the ConfigMap lives in
        namespace: String,
        /// Key within the ConfigMap's data map that holds the document
        key: String,
        /// Explicit API server access; omit to use in-cluster detection
        #[serde(default)]
        api: Option<ApiAccessConfig>,
    },

    /// Local file sink
    File {
        /// Path of the destination file
        path: String,
    },

    /// Custom sink
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl SinkConfig {
    /// Validate the sink configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            SinkConfig::ConfigMap {
                name,
                namespace,
                key,
                ..
            } => {
                if name.is_empty() {
                    return Err(crate::Error::config("ConfigMap name cannot be empty"));
                }
                if namespace.is_empty() {
                    return Err(crate::Error::config("ConfigMap namespace cannot be empty"));
                }
                if key.is_empty() {
                    return Err(crate::Error::config("ConfigMap data key cannot be empty"));
                }
                Ok(())
            }
            SinkConfig::File { path } => {
                if path.is_empty() {
                    return Err(crate::Error::config("File sink path cannot be empty"));
                }
                Ok(())
            }
            SinkConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom sink factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom sink config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the sink type name
    pub fn type_name(&self) -> &str {
        match self {
            SinkConfig::ConfigMap { .. } => "config_map",
            SinkConfig::File { .. } => "file",
            SinkConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Explicit Kubernetes API access, for running outside the cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiAccessConfig {
    /// API server URL (e.g. "https://kubernetes.example:6443")
    pub server: String,

    /// Path of a file holding a bearer token
    #[serde(default)]
    pub token_file: Option<String>,

    /// Path of a PEM file holding the cluster CA certificate
    #[serde(default)]
    pub ca_file: Option<String>,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the internal event channel
    ///
    /// When full, new engine events are dropped (with a warning log).
    /// This prevents unbounded memory growth when no consumer drains the
    /// channel fast enough.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_refresh_interval_secs() -> u64 {
    300
}

fn default_event_channel_capacity() -> usize {
    1000
}
