//! Shared utility functions

use chrono::{DateTime, Utc};

/// Parse a datetime string (RFC3339 format) or return current time
///
/// Rows written by this crate always carry RFC3339 timestamps; the fallback
/// only matters for rows edited by hand.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Normalize an email address the way it is stored
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
