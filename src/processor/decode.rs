use std::collections::HashMap;

use axum::http::Method;
use serde_json::Value;

use super::IngestError;

/// Flat alias-keyed view of one inbound request: query parameters merged
/// first, decoded body fields merged on top. Body wins on key collision.
pub type FieldMap = HashMap<String, String>;

/// Turn a raw request into a [`FieldMap`], whatever the transport encoding.
///
/// `GET` uses the query string alone. `POST` decodes the body according to
/// its content type and layers it over the query. `OPTIONS` and rejected
/// methods never reach this function; the transport layer answers them first.
pub fn decode(
    method: &Method,
    content_type: Option<&str>,
    query: HashMap<String, String>,
    body: &[u8],
) -> Result<FieldMap, IngestError> {
    if *method == Method::GET {
        Ok(query)
    } else if *method == Method::POST {
        let mut fields = query;
        merge_body(&mut fields, content_type.unwrap_or(""), body)?;
        Ok(fields)
    } else {
        Err(IngestError::Decode(format!("no decoder for method {method}")))
    }
}

fn merge_body(
    fields: &mut FieldMap,
    content_type: &str,
    body: &[u8],
) -> Result<(), IngestError> {
    if content_type.contains("application/json") {
        // An empty or whitespace-only body counts as an empty object; a
        // malformed one is a decode error, never silently dropped.
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => {
                for (key, value) in map {
                    if let Some(text) = coerce_to_text(&value) {
                        fields.insert(key, text);
                    }
                }
            }
            // Scalar and array payloads carry no named fields.
            Ok(_) => {}
            Err(e) => {
                return Err(IngestError::Decode(format!("invalid JSON body: {e}")));
            }
        }
    } else if content_type.contains("application/x-www-form-urlencoded") {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| IngestError::Decode(format!("invalid form body: {e}")))?;
        for (key, value) in pairs {
            fields.insert(key, value);
        }
    } else {
        // Undeclared transport: accept a JSON object if that happens to be
        // what arrived, otherwise the body contributes nothing.
        if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
            for (key, value) in map {
                if let Some(text) = coerce_to_text(&value) {
                    fields.insert(key, text);
                }
            }
        }
    }
    Ok(())
}

/// Everything stored downstream is text. Scalars keep their literal form,
/// `null` counts as absent, nested values survive as compact JSON.
fn coerce_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        nested => serde_json::to_string(nested).ok(),
    }
}
