pub mod alert_processor;
pub mod decode;
pub mod extract;
pub mod resolve;

use thiserror::Error;

use self::decode::FieldMap;

/// Terminal pipeline failures. The transport layer maps these onto the
/// response contract: decode and storage surface as 500, validation as 400.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Body could not be decoded for its declared content type.
    #[error("{0}")]
    Decode(String),
    /// Required canonical fields still missing after alias resolution.
    #[error("Missing required fields")]
    Validation {
        missing: Vec<&'static str>,
        received: FieldMap,
    },
    /// The persistence sink refused a write.
    #[error("{0}")]
    Storage(String),
}
