//! Seams to external collaborators.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Record, RenderedReport};

/// Source of the raw record set (network call abstracted away).
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch all records in source order. No retries.
    async fn fetch(&self) -> Result<Vec<Record>>;
}

/// Delivery collaborator for rendered reports (chat channel, webhook).
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Short sink name used in logs and delivery history.
    fn name(&self) -> &str;

    /// Deliver a rendered report to `destination` once.
    async fn deliver(&self, destination: &str, report: &RenderedReport) -> Result<()>;

    /// Send a plain text message. Returns the platform message id when one exists.
    async fn send_text(&self, destination: &str, text: &str) -> Result<Option<String>>;
}
