// # NetBox Inventory Source
//
// This crate provides a NetBox-backed inventory source for the discovery
// system.
//
// ## Query
//
// Devices are fetched with a single filtered list call:
//
// `GET https://<host>/api/dcim/devices/?q=asw20&manufacturer_id=6`
//
// The query string and manufacturer id identify the access-switch
// hardware generation this pipeline monitors; they are compiled in, not
// user-configurable.
//
// ## TLS
//
// Internal NetBox instances sit behind an internal CA, so certificate
// validation is disabled — but only on this source's dedicated HTTP
// client, never process-wide. Other components keep full verification.
//
// ## Failure Behavior
//
// Every failure (connect error, unexpected status, malformed payload) is
// returned to the engine as a cycle-scoped error. The source never
// retries and never panics; retry/skip policy is owned by the engine.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use netsd_core::config::InventoryConfig;
use netsd_core::registry::DiscoveryRegistry;
use netsd_core::traits::{Device, InventorySource, InventorySourceFactory};
use netsd_core::{Error, Result};

/// Compiled-in device search term (access switch, generation 20)
const DEVICE_QUERY: &str = "asw20";

/// Compiled-in manufacturer id the switches are registered under
const MANUFACTURER_ID: &str = "6";

/// Bound on every inventory request; an unstable NetBox must not be able
/// to stall the reconciliation loop indefinitely.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// NetBox-backed inventory source
pub struct NetboxInventorySource {
    /// Base URL of the NetBox instance (no trailing slash)
    base_url: String,

    /// Dedicated HTTP client with relaxed certificate validation
    client: reqwest::Client,
}

impl NetboxInventorySource {
    /// Create a source for the given NetBox host.
    ///
    /// The scheme is always https; `host` is a bare host name.
    pub fn new(host: &str) -> Result<Self> {
        Self::with_base_url(format!("https://{host}"))
    }

    /// Create a source against an explicit base URL.
    ///
    /// Public for tests that point the source at a local mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| Error::inventory(format!("failed to build HTTP client: {e}")))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { base_url, client })
    }

    fn devices_url(&self) -> String {
        format!(
            "{}/api/dcim/devices/?q={}&manufacturer_id={}",
            self.base_url, DEVICE_QUERY, MANUFACTURER_ID
        )
    }
}

/// Shape of a NetBox device list response; everything beyond `results`
/// (pagination counters, next/previous links) is ignored.
#[derive(Debug, Deserialize)]
struct DeviceListResponse {
    results: Vec<Device>,
}

#[async_trait]
impl InventorySource for NetboxInventorySource {
    async fn fetch(&self) -> Result<Vec<Device>> {
        let url = self.devices_url();
        debug!(%url, "querying NetBox for devices");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::inventory(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http(format!(
                "NetBox returned {status} for {url}"
            )));
        }

        let body: DeviceListResponse = response
            .json()
            .await
            .map_err(|e| Error::inventory(format!("malformed device list from {url}: {e}")))?;

        info!(devices = body.results.len(), "NetBox query complete");
        Ok(body.results)
    }

    fn source_name(&self) -> &'static str {
        "netbox"
    }
}

/// Factory for creating NetBox inventory sources
pub struct NetboxFactory;

impl InventorySourceFactory for NetboxFactory {
    fn create(&self, config: &InventoryConfig) -> Result<Box<dyn InventorySource>> {
        match config {
            InventoryConfig::Netbox { host } => {
                Ok(Box::new(NetboxInventorySource::new(host)?))
            }
            _ => Err(Error::config("invalid config for NetBox inventory source")),
        }
    }
}

/// Register the NetBox inventory source with a registry
pub fn register(registry: &DiscoveryRegistry) {
    registry.register_source("netbox", Box::new(NetboxFactory));
}
