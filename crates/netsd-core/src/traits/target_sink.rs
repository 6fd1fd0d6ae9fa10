// # Target Sink Trait
//
// Defines the interface for publishing the target-list document.
//
// ## Implementations
//
// - Kubernetes ConfigMap: `netsd-sink-configmap` crate
// - Local file: `netsd-sink-file` crate
//
// ## Usage
//
// ```rust,ignore
// use netsd_core::{TargetSink, TargetDocument};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let sink = /* TargetSink implementation */;
//
//     sink.ensure_ready().await?;
//     sink.publish(&TargetDocument::single(vec![], "my-job")).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::document::TargetDocument;

/// Trait for target sink implementations
///
/// A sink replaces its destination's content wholesale on every publish;
/// prior content is never merged. From a consumer's point of view the
/// replacement must be atomic: readers observe either the previous
/// document or the new one, never a partial write.
///
/// # Idempotency
///
/// Publishing the same document twice must be safe and leave the
/// destination in the same state as publishing it once.
#[async_trait]
pub trait TargetSink: Send + Sync {
    /// Verify the destination is usable before the first cycle.
    ///
    /// Called once at startup. An error here is fatal: a destination that
    /// cannot be read or reached will not self-correct, and the process
    /// must terminate rather than loop against it.
    async fn ensure_ready(&self) -> Result<(), crate::Error> {
        Ok(())
    }

    /// Publish a document, replacing any previously published content.
    ///
    /// # Parameters
    ///
    /// - `document`: The document to publish
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The destination now holds exactly this document
    /// - `Err(Error)`: The destination is unchanged or holds the previous document
    async fn publish(&self, document: &TargetDocument) -> Result<(), crate::Error>;

    /// Get the sink name (for logging/debugging)
    fn sink_name(&self) -> &'static str;
}

/// Helper trait for constructing target sinks from configuration
pub trait TargetSinkFactory: Send + Sync {
    /// Create a TargetSink instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this sink type
    ///
    /// # Returns
    ///
    /// A boxed TargetSink trait object
    fn create(
        &self,
        config: &crate::config::SinkConfig,
    ) -> Result<Box<dyn TargetSink>, crate::Error>;
}
