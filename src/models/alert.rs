use serde::{Deserialize, Serialize};

/// The canonical, transport-independent form of one inbound alert.
///
/// `sender` and `message` are non-empty in every constructed instance; the
/// validator rejects the request before normalization otherwise. All stored
/// fields are text, `time` and `received_at` as RFC 3339 UTC instants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalAlert {
    pub sender: String,
    pub message: String,
    pub time: String,
    pub sim: Option<String>,
    #[serde(rename = "filterName")]
    pub filter_name: Option<String>,
    #[serde(rename = "receivedAt")]
    pub received_at: String,
}
