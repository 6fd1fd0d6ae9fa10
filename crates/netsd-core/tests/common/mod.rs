//! Test doubles and common utilities for engine contract tests
//!
//! This module provides counter-instrumented doubles that verify the
//! engine's contracts without any real network or filesystem access.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use netsd_core::config::{DiscoveryConfig, EngineConfig, InventoryConfig, SinkConfig};
use netsd_core::document::TargetDocument;
use netsd_core::error::{Error, Result};
use netsd_core::traits::{Device, InventorySource, TargetSink};

/// One scripted inventory response
enum ScriptedResponse {
    Devices(Vec<Device>),
    Failure(String),
}

/// An inventory source serving a scripted sequence of responses.
///
/// Each `fetch()` consumes the next scripted entry; once the script runs
/// dry, fetches return an empty device list. Clones share state, so a
/// test can keep a handle after boxing the source for the engine.
#[derive(Clone)]
pub struct ScriptedInventory {
    inner: Arc<ScriptedInventoryState>,
}

struct ScriptedInventoryState {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    fetch_calls: AtomicUsize,
}

impl ScriptedInventory {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ScriptedInventoryState {
                responses: Mutex::new(VecDeque::new()),
                fetch_calls: AtomicUsize::new(0),
            }),
        }
    }

    /// Queue a successful response with the given device names
    pub fn push_devices(&self, names: &[&str]) {
        let devices = names.iter().map(|name| Device::new(*name)).collect();
        self.inner
            .responses
            .lock()
            .unwrap()
            .push_back(ScriptedResponse::Devices(devices));
    }

    /// Queue a fetch failure
    pub fn push_failure(&self, message: &str) {
        self.inner
            .responses
            .lock()
            .unwrap()
            .push_back(ScriptedResponse::Failure(message.to_string()));
    }

    /// Number of times fetch() was called
    pub fn fetch_call_count(&self) -> usize {
        self.inner.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventorySource for ScriptedInventory {
    async fn fetch(&self) -> Result<Vec<Device>> {
        self.inner.fetch_calls.fetch_add(1, Ordering::SeqCst);

        match self.inner.responses.lock().unwrap().pop_front() {
            Some(ScriptedResponse::Devices(devices)) => Ok(devices),
            Some(ScriptedResponse::Failure(message)) => Err(Error::inventory(message)),
            None => Ok(Vec::new()),
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// A sink that records every successfully published document.
///
/// Failures can be queued ahead of time; a queued failure consumes one
/// publish attempt without recording anything, mimicking a destination
/// that rejected the write and kept its previous content.
#[derive(Clone)]
pub struct RecordingSink {
    inner: Arc<RecordingSinkState>,
}

struct RecordingSinkState {
    published: Mutex<Vec<TargetDocument>>,
    publish_calls: AtomicUsize,
    failures: Mutex<VecDeque<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RecordingSinkState {
                published: Mutex::new(Vec::new()),
                publish_calls: AtomicUsize::new(0),
                failures: Mutex::new(VecDeque::new()),
            }),
        }
    }

    /// Queue a failure for the next publish attempt
    pub fn fail_next(&self, message: &str) {
        self.inner
            .failures
            .lock()
            .unwrap()
            .push_back(message.to_string());
    }

    /// Number of times publish() was called (including failed attempts)
    pub fn publish_call_count(&self) -> usize {
        self.inner.publish_calls.load(Ordering::SeqCst)
    }

    /// All successfully published documents, in order
    pub fn published(&self) -> Vec<TargetDocument> {
        self.inner.published.lock().unwrap().clone()
    }

    /// The most recently published document, if any
    pub fn last_published(&self) -> Option<TargetDocument> {
        self.inner.published.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TargetSink for RecordingSink {
    async fn publish(&self, document: &TargetDocument) -> Result<()> {
        self.inner.publish_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.inner.failures.lock().unwrap().pop_front() {
            return Err(Error::sink(message));
        }

        self.inner.published.lock().unwrap().push(document.clone());
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "recording"
    }
}

/// A minimal valid configuration for the qa-de-1 test region
pub fn test_config(refresh_interval_secs: u64) -> DiscoveryConfig {
    DiscoveryConfig {
        region: "qa-de-1".to_string(),
        inventory: InventoryConfig::Netbox {
            host: "netbox.test".to_string(),
        },
        job: "asw-discovery".to_string(),
        sink: SinkConfig::File {
            path: "/tmp/targets.json".to_string(),
        },
        refresh_interval_secs,
        engine: EngineConfig::default(),
    }
}
