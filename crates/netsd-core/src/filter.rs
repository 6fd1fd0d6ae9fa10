//! Device selection
//!
//! Maps raw inventory records to fully-qualified scrape targets. The
//! filter is a pure function of its inputs: same device list in, same
//! target list out, with input order preserved.

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::region::Region;
use crate::traits::Device;

/// Selects region-local switches from an inventory result set.
///
/// The name pattern and DNS suffix are derived from the validated region
/// once at construction; each cycle then reuses the compiled pattern.
#[derive(Debug)]
pub struct DeviceFilter {
    pattern: Regex,
    dns_suffix: String,
}

impl DeviceFilter {
    /// Build a filter for the given region.
    pub fn new(region: &Region) -> Result<Self> {
        let pattern = Regex::new(&region.device_pattern())
            .map_err(|e| Error::config(format!("invalid device pattern: {e}")))?;

        Ok(Self {
            pattern,
            dns_suffix: region.dns_suffix(),
        })
    }

    /// Select matching devices and map them to target hostnames.
    ///
    /// A device is selected iff its name matches the region's device
    /// pattern in full. Non-matching devices are dropped silently; an
    /// empty result is valid and simply means there is currently nothing
    /// to monitor.
    pub fn select(&self, devices: &[Device]) -> Vec<String> {
        let targets: Vec<String> = devices
            .iter()
            .filter(|device| self.pattern.is_match(&device.name))
            .map(|device| format!("{}{}", device.name, self.dns_suffix))
            .collect();

        debug!(
            before = devices.len(),
            selected = targets.len(),
            "filtered inventory devices"
        );

        targets
    }
}
