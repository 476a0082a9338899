use chrono::Utc;
use tracing::{error, info, warn};

use crate::models::alert::CanonicalAlert;
use crate::models::location_alert::StructuredLocationAlert;
use crate::sink::{AlertSink, ALERTS_COLLECTION, LOCATION_ALERTS_COLLECTION};

use super::decode::FieldMap;
use super::extract;
use super::resolve::{self, ResolvedFields};
use super::IngestError;

/// Everything a fully processed request produced: the canonical record and,
/// when the message carried an embedded location fix, the derived record.
#[derive(Debug)]
pub struct Ingested {
    pub alert: CanonicalAlert,
    pub location: Option<StructuredLocationAlert>,
}

/// Fill defaults and assemble the canonical record.
///
/// `time` falls back to the ingestion instant when the client sent none;
/// `received_at` is always a fresh clock reading, taken separately from the
/// `time` default. Empty optional values become null.
pub fn normalize(resolved: ResolvedFields) -> CanonicalAlert {
    let time = resolved
        .time
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| Utc::now().to_rfc3339());
    CanonicalAlert {
        sender: resolved.sender,
        message: resolved.message,
        time,
        sim: resolved.sim.filter(|s| !s.is_empty()),
        filter_name: resolved.filter_name.filter(|f| !f.is_empty()),
        received_at: Utc::now().to_rfc3339(),
    }
}

/// Run a decoded field map through resolution, validation, normalization and
/// extraction, then write the result(s) through the sink.
///
/// The canonical alert is written first, the derived location alert second
/// and only after the first write landed. With `ack_storage_failures` set,
/// sink failures are logged but the alert is still acknowledged; by default
/// they surface as [`IngestError::Storage`].
pub async fn process_fields(
    sink: &dyn AlertSink,
    fields: FieldMap,
    ack_storage_failures: bool,
) -> Result<Ingested, IngestError> {
    let resolved = resolve::resolve(&fields);
    if let Err(missing) = resolve::validate(&resolved) {
        return Err(IngestError::Validation {
            missing,
            received: fields,
        });
    }

    let alert = normalize(resolved);
    let location = extract::extract_location(&alert.message);

    info!(
        sender = %alert.sender,
        has_location = location.is_some(),
        "Ingesting alert"
    );

    let record = serde_json::to_value(&alert).expect("canonical alert serializes to JSON");
    if let Err(e) = sink.append(ALERTS_COLLECTION, &record).await {
        error!("Alert write failed: {}", e);
        if !ack_storage_failures {
            return Err(IngestError::Storage(e.to_string()));
        }
        warn!("Acknowledging despite failed alert write (ACK_STORAGE_FAILURES set)");
    } else if let Some(loc) = &location {
        let record = serde_json::to_value(loc).expect("location alert serializes to JSON");
        if let Err(e) = sink.append(LOCATION_ALERTS_COLLECTION, &record).await {
            // Partial outcome: the canonical write landed, only the derived
            // record was lost. Log it as such before reporting the failure.
            error!("Location alert write failed after alert write succeeded: {}", e);
            if !ack_storage_failures {
                return Err(IngestError::Storage(e.to_string()));
            }
            warn!("Acknowledging despite failed location write (ACK_STORAGE_FAILURES set)");
        }
    }

    Ok(Ingested { alert, location })
}
