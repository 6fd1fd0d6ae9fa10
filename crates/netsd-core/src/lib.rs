// # netsd-core
//
// Core library for the switch discovery system.
//
// ## Architecture Overview
//
// This library provides the core functionality for periodic service
// discovery against a device inventory:
//
// - **InventorySource**: Trait for querying the device inventory
// - **TargetSink**: Trait for publishing the target-list document
// - **DiscoveryEngine**: Reconciliation loop driving fetch → filter → publish
// - **DiscoveryRegistry**: Plugin-based registry for sources and sinks
// - **Region / DeviceFilter / TargetDocument**: The domain model
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Plugin-Based**: Sources and sinks are registered dynamically
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Availability over freshness**: A failing cycle keeps the last
//    published document in place instead of crashing the loop

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod filter;
pub mod region;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use config::{ApiAccessConfig, DiscoveryConfig, InventoryConfig, SinkConfig};
pub use document::{TargetDocument, TargetGroup};
pub use engine::{DiscoveryEngine, EngineEvent};
pub use error::{Error, Result};
pub use filter::DeviceFilter;
pub use region::Region;
pub use registry::DiscoveryRegistry;
pub use traits::{Device, InventorySource, TargetSink};
