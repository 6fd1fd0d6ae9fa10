//! Plugin-based component registry
//!
//! The registry allows inventory sources and target sinks to be registered
//! dynamically at runtime, keeping the engine free of hardcoded if-else
//! chains over sink types.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use netsd_core::registry::DiscoveryRegistry;
//! use netsd_core::config::SinkConfig;
//!
//! let registry = DiscoveryRegistry::new();
//!
//! // Implementation crates register themselves
//! netsd_sink_file::register(&registry);
//! netsd_sink_configmap::register(&registry);
//!
//! // Create a sink from config
//! let config = SinkConfig::File { path: "/etc/prom/targets.json".into() };
//! let sink = registry.create_sink(&config)?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use crate::config::{InventoryConfig, SinkConfig};
use crate::error::{Error, Result};
use crate::traits::{InventorySource, InventorySourceFactory, TargetSink, TargetSinkFactory};

/// Registry for plugin-based source and sink creation
///
/// The registry maintains maps of type names to factory objects, allowing
/// dynamic instantiation based on configuration.
///
/// ## Thread Safety
///
/// Interior mutability via RwLock: concurrent reads, exclusive writes.
#[derive(Default)]
pub struct DiscoveryRegistry {
    /// Registered inventory source factories
    sources: RwLock<HashMap<String, Box<dyn InventorySourceFactory>>>,

    /// Registered target sink factories
    sinks: RwLock<HashMap<String, Box<dyn TargetSinkFactory>>>,
}

impl DiscoveryRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an inventory source factory
    ///
    /// # Parameters
    ///
    /// - `name`: Source type name (e.g., "netbox")
    /// - `factory`: Factory object for creating source instances
    pub fn register_source(
        &self,
        name: impl Into<String>,
        factory: Box<dyn InventorySourceFactory>,
    ) {
        let name = name.into();
        let mut sources = self.sources.write().unwrap();
        sources.insert(name, factory);
    }

    /// Register a target sink factory
    ///
    /// # Parameters
    ///
    /// - `name`: Sink type name (e.g., "config_map", "file")
    /// - `factory`: Factory object for creating sink instances
    pub fn register_sink(&self, name: impl Into<String>, factory: Box<dyn TargetSinkFactory>) {
        let name = name.into();
        let mut sinks = self.sinks.write().unwrap();
        sinks.insert(name, factory);
    }

    /// Create an inventory source from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn InventorySource>)`: Created source instance
    /// - `Err(Error)`: If the source type is not registered or creation fails
    pub fn create_source(&self, config: &InventoryConfig) -> Result<Box<dyn InventorySource>> {
        let source_type = config.type_name();
        let sources = self.sources.read().unwrap();

        let factory = sources.get(source_type).ok_or_else(|| {
            Error::config(format!("unknown inventory source type: {source_type}"))
        })?;

        factory.create(config)
    }

    /// Create a target sink from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn TargetSink>)`: Created sink instance
    /// - `Err(Error)`: If the sink type is not registered or creation fails
    pub fn create_sink(&self, config: &SinkConfig) -> Result<Box<dyn TargetSink>> {
        let sink_type = config.type_name();
        let sinks = self.sinks.read().unwrap();

        let factory = sinks
            .get(sink_type)
            .ok_or_else(|| Error::config(format!("unknown sink type: {sink_type}")))?;

        factory.create(config)
    }
}
