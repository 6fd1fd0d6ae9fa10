//! Region identifiers and the naming conventions derived from them
//!
//! A region is a short code for a deployment zone (e.g. `qa-de-1`). It is
//! validated once at startup and then drives both the device-name filter
//! and the DNS suffix appended to every published target. An invalid
//! region is unrecoverable: every subsequent cycle would select the wrong
//! devices and publish the wrong hostnames.

use regex::Regex;

use crate::error::{Error, Result};

/// Full-match pattern for region identifiers: two lowercase letters, a
/// dash, two lowercase letters, a dash, one digit.
const REGION_PATTERN: &str = r"^[a-z]{2}-[a-z]{2}-\d$";

/// DNS zone all discovered devices resolve under.
const DNS_ZONE: &str = "cloud.sap";

/// A validated deployment region identifier.
///
/// Construction via [`Region::parse`] is the only way to obtain a value,
/// so holding a `Region` guarantees the pattern matched in full. Input
/// must already be lower-case; case folding is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region(String);

impl Region {
    /// Parse and validate a region identifier.
    ///
    /// # Returns
    ///
    /// - `Ok(Region)`: The value matched the region pattern in full
    /// - `Err(Error::InvalidRegion)`: Any partial, cased, or malformed value
    pub fn parse(value: &str) -> Result<Self> {
        let pattern = Regex::new(REGION_PATTERN)
            .map_err(|e| Error::config(format!("invalid region pattern: {e}")))?;

        if !pattern.is_match(value) {
            return Err(Error::InvalidRegion(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    /// The validated region string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// DNS suffix appended to every device name selected in this region.
    pub fn dns_suffix(&self) -> String {
        format!(".cc.{}.{}", self.0, DNS_ZONE)
    }

    /// Full-match pattern for device names belonging to this region:
    /// `<region>-asw20<digit>-bm<three digits>`.
    pub fn device_pattern(&self) -> String {
        format!(r"^{}-asw20\d-bm\d{{3}}$", self.0)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
