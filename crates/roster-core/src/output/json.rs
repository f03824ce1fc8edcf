//! JSON output formatter

use serde::Serialize;

/// Serialize records as a pretty-printed JSON document
///
/// # Errors
/// Returns an error if serialization fails
pub fn to_json<T: Serialize + ?Sized>(records: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}
