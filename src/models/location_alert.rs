use serde::{Deserialize, Serialize};

/// Location fix parsed out of a message body of the form
/// `Student <n>:<lat>,<lng>`.
///
/// `lat` and `lng` stay textual, exactly as captured, so the sender's
/// precision survives storage untouched. Persisted as its own record next to
/// the canonical alert, never instead of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredLocationAlert {
    pub student_label: String,
    pub lat: String,
    pub lng: String,
    pub raw_message: String,
}
