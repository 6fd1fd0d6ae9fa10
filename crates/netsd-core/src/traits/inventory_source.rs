// # Inventory Source Trait
//
// Defines the interface for querying the external device inventory.
//
// ## Implementations
//
// - NetBox: `netsd-inventory-netbox` crate
//
// ## Usage
//
// ```rust,ignore
// use netsd_core::InventorySource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* InventorySource implementation */;
//
//     let devices = source.fetch().await?;
//     println!("{} devices found", devices.len());
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A device record returned by the inventory source.
///
/// Only the name is interpreted downstream; every other inventory
/// attribute is dropped at deserialization. Device records live for a
/// single reconciliation cycle and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Device name as recorded in the inventory
    pub name: String,
}

impl Device {
    /// Create a device record.
    ///
    /// This constructor is public for use in:
    /// - `InventorySource` implementations
    /// - Contract tests within netsd-core
    /// - External testing code
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Trait for inventory source implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// Sources are single-shot and stateless: one bounded query per call,
/// errors returned to the caller. Whether a failed cycle is retried or
/// skipped is owned by the engine, never by the source.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Fetch the current set of candidate devices.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Device>)`: The devices matching the source's compiled-in query
    /// - `Err(Error)`: Network failure, unexpected status, or malformed payload
    async fn fetch(&self) -> Result<Vec<Device>, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}

/// Helper trait for constructing inventory sources from configuration
pub trait InventorySourceFactory: Send + Sync {
    /// Create an InventorySource instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this source type
    ///
    /// # Returns
    ///
    /// A boxed InventorySource trait object
    fn create(
        &self,
        config: &crate::config::InventoryConfig,
    ) -> Result<Box<dyn InventorySource>, crate::Error>;
}
