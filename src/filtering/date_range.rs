use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::QueryConfig;

/// Closed interval on one date field. Each bound is optional, but a range
/// always carries at least one.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DateRange {
    pub field: String,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Parse a date bound.
///
/// Accepts RFC 3339 (`2024-01-01T10:00:00+02:00`), a naive timestamp
/// (`2024-01-01T10:00:00`, read as UTC) or a bare date (`2024-01-01`, read
/// as midnight UTC). Anything else yields `None`.
#[must_use]
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Build the date range for `date_from` / `date_to`.
///
/// Unparseable bounds are dropped on their own; the range disappears only
/// when neither bound survives.
#[must_use]
pub fn parse_date_range(
    date_from: Option<&str>,
    date_to: Option<&str>,
    config: &QueryConfig,
) -> Option<DateRange> {
    let from = date_from.and_then(parse_date);
    let to = date_to.and_then(parse_date);

    if date_from.is_some() && from.is_none() {
        tracing::debug!(value = ?date_from, "Ignoring unparseable date_from");
    }
    if date_to.is_some() && to.is_none() {
        tracing::debug!(value = ?date_to, "Ignoring unparseable date_to");
    }

    if from.is_none() && to.is_none() {
        return None;
    }

    Some(DateRange {
        field: config.date_field.clone(),
        from,
        to,
    })
}
