//! Core discovery engine
//!
//! The DiscoveryEngine is responsible for:
//! - Fetching candidate devices from the InventorySource on a fixed interval
//! - Selecting devices whose names match the region's conventions
//! - Publishing the resulting target document via the TargetSink
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐        ┌──────────────────┐        ┌─────────────┐
//! │ InventorySource │──────▶ │ DiscoveryEngine  │──────▶ │ TargetSink  │
//! │ (fetch)         │        │ (filter + cycle) │        │ (publish)   │
//! └─────────────────┘        └──────────────────┘        └─────────────┘
//!                                      │
//!                                      ▼
//!                               ┌─────────────┐
//!                               │   Events    │
//!                               │  (notify)   │
//!                               └─────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Interval tick fires
//! 2. Fetch devices from the inventory source
//! 3. On fetch failure: log, skip the publish, keep the last published document
//! 4. Filter devices into fully-qualified targets
//! 5. Publish the regenerated document (empty target lists included)
//! 6. Wait for the next tick
//!
//! One cycle runs to completion before the next begins; cycles never
//! overlap. A failing cycle never aborts the loop — only startup
//! validation terminates the process.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::config::DiscoveryConfig;
use crate::document::TargetDocument;
use crate::error::Result;
use crate::filter::DeviceFilter;
use crate::region::Region;
use crate::traits::{InventorySource, TargetSink};

/// Events emitted by the DiscoveryEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        region: String,
        interval_secs: u64,
    },

    /// A cycle fetched, filtered and published successfully
    CycleCompleted {
        devices_seen: usize,
        targets_published: usize,
    },

    /// Inventory fetch failed; the publish was skipped for this cycle
    InventoryFailed {
        error: String,
    },

    /// Publishing the document failed; the previous document stays in place
    PublishFailed {
        error: String,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Core discovery engine
///
/// The engine orchestrates the fetch → filter → publish cycle on a fixed
/// interval. It runs until a shutdown signal is received.
///
/// ## Lifecycle
///
/// 1. Create with [`DiscoveryEngine::new()`] — validates configuration,
///    the region, and compiles the device filter; all fatal conditions
///    surface here, before any network call
/// 2. Start with [`DiscoveryEngine::run()`]
/// 3. Engine runs until SIGTERM/SIGINT
///
/// ## Threading
///
/// All cycles run sequentially on a single async task; the interval sleep
/// is a suspension between cycles, not an overlapping timer.
pub struct DiscoveryEngine {
    /// Inventory source queried each cycle
    inventory: Box<dyn InventorySource>,

    /// Destination for the published document
    sink: Box<dyn TargetSink>,

    /// Compiled device-name filter
    filter: DeviceFilter,

    /// Validated region (for logging)
    region: Region,

    /// Job label attached to published target groups
    job: String,

    /// Time between cycles
    refresh_interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DiscoveryEngine {
    /// Create a new discovery engine
    ///
    /// # Parameters
    ///
    /// - `inventory`: Inventory source implementation
    /// - `sink`: Target sink implementation
    /// - `config`: Discovery configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or a region that does not match the
    /// required pattern. These are startup errors: the caller must treat
    /// them as fatal.
    pub fn new(
        inventory: Box<dyn InventorySource>,
        sink: Box<dyn TargetSink>,
        config: DiscoveryConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let region = Region::parse(&config.region)?;
        let filter = DeviceFilter::new(&region)?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            inventory,
            sink,
            filter,
            region,
            job: config.job,
            refresh_interval: Duration::from_secs(config.refresh_interval_secs),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run the engine
    ///
    /// Starts the interval-driven reconciliation loop. The first cycle
    /// runs immediately; subsequent cycles fire once per refresh
    /// interval. Runs until SIGTERM or SIGINT is received.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: Fatal error
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Internal run implementation that accepts an optional shutdown signal
    ///
    /// # Parameters
    ///
    /// - `shutdown_rx`: Optional oneshot receiver to trigger shutdown (for testing)
    async fn run_internal(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        info!(
            region = %self.region,
            interval_secs = self.refresh_interval.as_secs(),
            "starting discovery loop"
        );
        self.emit_event(EngineEvent::Started {
            region: self.region.as_str().to_string(),
            interval_secs: self.refresh_interval.as_secs(),
        });

        let mut ticker = tokio::time::interval(self.refresh_interval);
        // A cycle that overruns its interval must not cause a burst of
        // catch-up cycles afterwards.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        if let Some(mut rx) = shutdown_rx {
            // Test mode: wait for provided shutdown signal
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_cycle().await;
                    }

                    _ = &mut rx => {
                        info!("shutdown signal received");
                        self.emit_event(EngineEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        } else {
            // Production mode: wait for SIGTERM/SIGINT
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_cycle().await;
                    }

                    signal = shutdown_signal() => {
                        info!(signal, "shutdown signal received");
                        self.emit_event(EngineEvent::Stopped {
                            reason: signal.to_string(),
                        });
                        break;
                    }
                }
            }
        }

        info!("discovery loop stopped");
        Ok(())
    }

    /// Run one fetch → filter → publish cycle.
    ///
    /// Cycle failures are contained here: they are logged and emitted as
    /// events, and the previously published document stays in place.
    async fn run_cycle(&self) {
        let devices = match self.inventory.fetch().await {
            Ok(devices) => devices,
            Err(e) => {
                error!(
                    source = self.inventory.source_name(),
                    error = %e,
                    "inventory fetch failed, keeping previously published targets"
                );
                self.emit_event(EngineEvent::InventoryFailed {
                    error: e.to_string(),
                });
                return;
            }
        };

        let targets = self.filter.select(&devices);
        let document = TargetDocument::single(targets, &self.job);

        match self.sink.publish(&document).await {
            Ok(()) => {
                info!(
                    sink = self.sink.sink_name(),
                    devices = devices.len(),
                    targets = document.target_count(),
                    "published target document"
                );
                self.emit_event(EngineEvent::CycleCompleted {
                    devices_seen: devices.len(),
                    targets_published: document.target_count(),
                });
            }
            Err(e) => {
                error!(
                    sink = self.sink.sink_name(),
                    error = %e,
                    "publish failed, previous document remains in place"
                );
                self.emit_event(EngineEvent::PublishFailed {
                    error: e.to_string(),
                });
            }
        }
    }

    /// Emit an engine event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            debug!("event channel full or closed, dropping engine event");
        }
    }

    /// Test-only helper to run the engine with a controlled shutdown signal
    ///
    /// # Visibility
    ///
    /// This is `pub` for testing purposes only. Contract tests require
    /// controlled shutdown; production code should use `run()`, which
    /// manages shutdown via OS signals.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }
}

/// Wait for SIGTERM or SIGINT and report which one fired.
#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to install SIGTERM handler, falling back to ctrl-c");
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to install SIGINT handler, falling back to ctrl-c");
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

/// Fallback for non-Unix platforms (SIGINT only).
#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "SIGINT"
}
