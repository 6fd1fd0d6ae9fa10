// # File Target Sink
//
// Publishes the target document to a local file, for setups where the
// scraper reads service-discovery files from disk instead of a cluster
// object.
//
// ## Atomicity
//
// Each publish writes the serialized document to a temporary sibling
// file and renames it over the destination. Readers observe either the
// previous document or the new one, never a truncated file mid-write.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use netsd_core::config::SinkConfig;
use netsd_core::document::TargetDocument;
use netsd_core::registry::DiscoveryRegistry;
use netsd_core::traits::{TargetSink, TargetSinkFactory};
use netsd_core::{Error, Result};

/// File-based target sink
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Create a sink writing to the given path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl TargetSink for FileSink {
    async fn ensure_ready(&self) -> Result<()> {
        // The file itself may not exist yet, but its directory must.
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            return Err(Error::sink(format!(
                "target directory {} does not exist",
                parent.display()
            )));
        }

        Ok(())
    }

    async fn publish(&self, document: &TargetDocument) -> Result<()> {
        let payload = document.to_pretty_json()?;
        let temp_path = self.temp_path();

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            Error::sink(format!("failed to create {}: {e}", temp_path.display()))
        })?;
        file.write_all(payload.as_bytes()).await.map_err(|e| {
            Error::sink(format!("failed to write {}: {e}", temp_path.display()))
        })?;
        file.sync_all().await.map_err(|e| {
            Error::sink(format!("failed to sync {}: {e}", temp_path.display()))
        })?;
        drop(file);

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::sink(format!(
                "failed to move {} into place: {e}",
                temp_path.display()
            ))
        })?;

        debug!(
            path = %self.path.display(),
            bytes = payload.len(),
            "target document written"
        );
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "file"
    }
}

/// Factory for creating file sinks
pub struct FileSinkFactory;

impl TargetSinkFactory for FileSinkFactory {
    fn create(&self, config: &SinkConfig) -> Result<Box<dyn TargetSink>> {
        match config {
            SinkConfig::File { path } => Ok(Box::new(FileSink::new(path))),
            _ => Err(Error::config("invalid config for file sink")),
        }
    }
}

/// Register the file sink with a registry
pub fn register(registry: &DiscoveryRegistry) {
    registry.register_sink("file", Box::new(FileSinkFactory));
}
