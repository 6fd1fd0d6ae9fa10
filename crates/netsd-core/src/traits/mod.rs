//! Core traits for the discovery system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`InventorySource`]: Query the device inventory
//! - [`TargetSink`]: Publish the target-list document to a destination

pub mod inventory_source;
pub mod target_sink;

pub use inventory_source::{Device, InventorySource, InventorySourceFactory};
pub use target_sink::{TargetSink, TargetSinkFactory};
