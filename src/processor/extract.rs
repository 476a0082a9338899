use std::sync::OnceLock;

use regex::Regex;

use crate::models::location_alert::StructuredLocationAlert;

// `Student <n>:<lat>,<lng>` anywhere in the message, case-insensitive.
fn location_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)student\s*(\d+):([\d.]+),([\d.]+)")
            .expect("location pattern is valid")
    })
}

/// Scan a canonical message for an embedded location fix.
///
/// `None` means the pattern is absent, which is not an error. Only the first
/// occurrence counts; the coordinates are kept verbatim as captured.
pub fn extract_location(message: &str) -> Option<StructuredLocationAlert> {
    let caps = location_pattern().captures(message)?;
    Some(StructuredLocationAlert {
        student_label: format!("Student {}", &caps[1]),
        lat: caps[2].to_string(),
        lng: caps[3].to_string(),
        raw_message: message.to_string(),
    })
}
