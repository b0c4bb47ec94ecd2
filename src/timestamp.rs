//! Log timestamp normalisation.

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

/// Format of the bracketed timestamp at the start of every log line.
pub const LOG_TIMESTAMP_FORMAT: &str = "%H:%M:%S - %d/%m/%Y";

// chrono is lenient about field widths and whitespace, so the exact shape is
// checked first.
static SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2} - \d{2}/\d{2}/\d{4}$").unwrap());

/// Parse `HH:MM:SS - DD/MM/YYYY` into an instant.
///
/// Returns `None` for anything that does not match, including out-of-range
/// fields; callers carry the `None` through as "timestamp unknown".
pub fn parse_log_timestamp(text: &str) -> Option<NaiveDateTime> {
    if !SHAPE_RE.is_match(text) {
        return None;
    }
    NaiveDateTime::parse_from_str(text, LOG_TIMESTAMP_FORMAT).ok()
}
