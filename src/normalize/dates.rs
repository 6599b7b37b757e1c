// src/normalize/dates.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::ingest::types::RawItem;

/// Parse a feed date. Accepts RFC 3339, RFC 2822 and a couple of naive
/// shapes some publishers emit (taken as UTC).
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    if let Ok(d) = DateTime::parse_from_rfc2822(s) {
        return Some(d.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(n) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(n.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}

/// Structured date, then the free-form one, then `now`.
pub fn published_at(item: &RawItem, now: DateTime<Utc>) -> DateTime<Utc> {
    item.iso_date
        .as_deref()
        .and_then(parse_date)
        .or_else(|| item.pub_date.as_deref().and_then(parse_date))
        .unwrap_or(now)
}
