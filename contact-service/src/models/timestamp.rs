//! Text form of record timestamps as written to the document store.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// ISO-8601 with an explicit `+00:00` offset.
pub fn to_text(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Parse a stored timestamp. Values without an offset are taken as UTC.
pub fn parse_text(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|n| n.and_utc()),
    }
}
