//! Timestamp and identifier utilities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Generate a new session identifier
pub fn new_session_id() -> String {
    format!("session_{}", Uuid::new_v4().simple())
}

/// Build a band identifier from its name, e.g. `band_iron_maiden`.
/// `None` when the name holds no letters or digits.
pub fn band_id_from_name(name: &str) -> Option<String> {
    let slug: Vec<String> = name
        .split_whitespace()
        .map(|part| {
            part.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|part| !part.is_empty())
        .collect();
    if slug.is_empty() {
        return None;
    }
    Some(format!("band_{}", slug.join("_")))
}
