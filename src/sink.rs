use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Collection receiving every canonical alert.
pub const ALERTS_COLLECTION: &str = "alerts";
/// Collection receiving location alerts derived from message text.
pub const LOCATION_ALERTS_COLLECTION: &str = "location_alerts";

#[derive(Debug, Error)]
#[error("{0}")]
pub struct SinkError(pub String);

/// Append-only storage port. The pipeline only ever writes through this;
/// retries are the caller's business, not the sink's.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn append(&self, collection: &str, record: &Value) -> Result<(), SinkError>;
}
