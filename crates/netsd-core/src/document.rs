//! The published target-list document
//!
//! Downstream scrapers consume a JSON document shaped like Prometheus
//! file-based service discovery: a list with a single group carrying the
//! target hostnames and a `job` label. The document is regenerated from
//! scratch every cycle and always replaces prior content in full; it is
//! never merged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// One group of scrape targets sharing a label set.
///
/// Field order matters to consumers diffing published content: `targets`
/// serializes before `labels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroup {
    /// Fully-qualified target hostnames
    pub targets: Vec<String>,

    /// Labels attached to every target in the group
    pub labels: BTreeMap<String, String>,
}

impl TargetGroup {
    /// Create a group labelled with a single `job` label.
    pub fn new(targets: Vec<String>, job: impl Into<String>) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert("job".to_string(), job.into());
        Self { targets, labels }
    }

    /// The `job` label, if present.
    pub fn job(&self) -> Option<&str> {
        self.labels.get("job").map(String::as_str)
    }
}

/// The complete published artifact: an ordered sequence of target groups.
///
/// The discovery pipeline always produces exactly one group, but the
/// serialized shape is a list so consumers parse it the same way as any
/// other service-discovery file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetDocument(Vec<TargetGroup>);

impl TargetDocument {
    /// Build a document holding a single group with a `job` label.
    ///
    /// An empty target list is a valid document: it tells consumers there
    /// is currently nothing to monitor.
    pub fn single(targets: Vec<String>, job: impl Into<String>) -> Self {
        Self(vec![TargetGroup::new(targets, job)])
    }

    /// The groups in publication order.
    pub fn groups(&self) -> &[TargetGroup] {
        &self.0
    }

    /// Total number of targets across all groups.
    pub fn target_count(&self) -> usize {
        self.0.iter().map(|group| group.targets.len()).sum()
    }

    /// Serialize with the stable 2-space pretty format consumers expect.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a previously serialized document.
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}
