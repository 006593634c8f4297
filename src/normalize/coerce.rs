//! Coercion of stored values into canonical types
//!
//! Every function here is total: malformed input maps to a documented
//! default instead of an error.

use bson::{oid::ObjectId, Bson};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Fixed-width display format for session dates
///
/// Lexicographic order on this format equals chronological order.
pub const SESSION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Naive layouts accepted when a date was stored as text
const TEXT_DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Canonical identifier for a reference value
///
/// Accepts an ObjectId or its 24-character hex encoding. Anything else
/// (null, missing, a malformed string, another type) is "no match".
pub fn coerce_object_id(value: Option<&Bson>) -> Option<ObjectId> {
    match value? {
        Bson::ObjectId(oid) => Some(*oid),
        Bson::String(s) => ObjectId::parse_str(s.trim()).ok(),
        _ => None,
    }
}

/// Awards as an integer
///
/// Numeric strings are parsed, doubles truncate toward zero, booleans count
/// as 1/0. Non-numeric text, null and missing values are 0.
pub fn coerce_awards(value: Option<&Bson>) -> i64 {
    match value {
        Some(Bson::Int32(n)) => i64::from(*n),
        Some(Bson::Int64(n)) => *n,
        Some(Bson::Double(f)) if f.is_finite() => f.trunc() as i64,
        Some(Bson::Boolean(b)) => i64::from(*b),
        Some(Bson::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

/// Comments as a list of strings
///
/// A bare string becomes a one-element list; blank strings, null and missing
/// become an empty list. Non-text list items are rendered or dropped.
pub fn coerce_comments(value: Option<&Bson>) -> Vec<String> {
    match value {
        Some(Bson::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        Some(Bson::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Bson::String(s) => Some(s.clone()),
                Bson::Int32(n) => Some(n.to_string()),
                Bson::Int64(n) => Some(n.to_string()),
                Bson::Double(f) => Some(f.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Session duration in hours
pub fn coerce_duration(value: Option<&Bson>) -> Option<f64> {
    match value? {
        Bson::Double(f) if f.is_finite() => Some(*f),
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Boolean flag, tolerating "true"/"false" text and 0/1 integers
pub fn coerce_bool(value: Option<&Bson>) -> bool {
    match value {
        Some(Bson::Boolean(b)) => *b,
        Some(Bson::Int32(n)) => *n != 0,
        Some(Bson::Int64(n)) => *n != 0,
        Some(Bson::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Timestamp from a native date or a date stored as text
///
/// Text is tried as RFC 3339 first, then as naive UTC layouts.
pub fn coerce_datetime(value: Option<&Bson>) -> Option<DateTime<Utc>> {
    match value? {
        Bson::DateTime(dt) => Some(dt.to_chrono()),
        Bson::String(s) => parse_text_date(s.trim()),
        _ => None,
    }
}

fn parse_text_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    TEXT_DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(s, layout).ok())
        .map(|naive| naive.and_utc())
}

/// Render a timestamp as `YYYY-MM-DD HH:MM`
pub fn format_session_date(dt: &DateTime<Utc>) -> String {
    dt.format(SESSION_DATE_FORMAT).to_string()
}
