use super::decode::FieldMap;

// Alias precedence tables. The order here IS the contract: earlier entries
// win, and resolution never depends on map iteration order.
const SENDER_ALIASES: &[&str] = &["from", "sender", "in-number", "phone", "number"];
const MESSAGE_ALIASES: &[&str] = &["message", "msg", "text", "body", "payload"];
const TIME_ALIASES: &[&str] = &["time", "timestamp", "date"];
const SIM_ALIASES: &[&str] = &["sim", "in-sim"];
const FILTER_ALIASES: &[&str] = &["filter", "filter-name"];

/// Canonical field values after alias resolution, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFields {
    pub sender: String,
    pub message: String,
    pub time: Option<String>,
    pub sim: Option<String>,
    pub filter_name: Option<String>,
}

/// Map whatever alias names the client app used onto the canonical schema.
pub fn resolve(fields: &FieldMap) -> ResolvedFields {
    ResolvedFields {
        sender: first_present(fields, SENDER_ALIASES).unwrap_or_default(),
        message: first_present(fields, MESSAGE_ALIASES).unwrap_or_default(),
        time: first_present(fields, TIME_ALIASES),
        sim: first_present(fields, SIM_ALIASES),
        filter_name: first_present(fields, FILTER_ALIASES),
    }
}

// First alias carrying a non-empty value wins; an empty value does not
// shadow a later alias.
fn first_present(fields: &FieldMap, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| fields.get(*alias))
        .find(|value| !value.is_empty())
        .cloned()
}

/// Check both required canonical fields independently. The missing subset
/// comes back in the fixed order `sender`, `message`.
pub fn validate(resolved: &ResolvedFields) -> Result<(), Vec<&'static str>> {
    let mut missing = Vec::new();
    if resolved.sender.is_empty() {
        missing.push("sender");
    }
    if resolved.message.is_empty() {
        missing.push("message");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}
