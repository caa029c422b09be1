//! HTTP cache validation module
//!
//! `ETag` generation, HTTP-date handling and conditional request checks.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Generate `ETag` from a file's size and modification time
///
/// The content is never read, so large files cost nothing to validate.
/// Returns a quoted string, e.g. `"abc123def"`
pub fn generate_etag(len: u64, modified: SystemTime) -> String {
    let mut hasher = DefaultHasher::new();
    len.hash(&mut hasher);
    modified.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Accepts a single tag, a comma separated list, or the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .map(str::trim)
            .any(|e| e == etag || e == "*" || e.strip_prefix("W/") == Some(etag))
    })
}

/// Format a timestamp as an HTTP-date (always GMT, second precision)
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP-date
///
/// RFC 2822 covers the IMF-fixdate form and numeric offsets; anything else is
/// treated as absent.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, HTTP_DATE_FORMAT).map(|naive| naive.and_utc())
        })
        .ok()
}

/// Whether an `If-Modified-Since` value means the client copy is fresh
///
/// The file time is truncated to whole seconds before comparing, since that
/// is all `Last-Modified` can express.
pub fn not_modified_since(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    let Some(since) = if_modified_since.and_then(parse_http_date) else {
        return false;
    };
    let modified = DateTime::<Utc>::from(modified);
    modified.timestamp() <= since.timestamp()
}
