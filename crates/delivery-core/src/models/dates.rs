//! Calendar date (de)serialization for wire payloads.
//!
//! The service exchanges plain `YYYY-MM-DD` dates. Some endpoints echo a full
//! timestamp instead; only its date part is kept.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a wire date, accepting `2024-03-10` as well as `2024-03-10T08:00:00`.
pub fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, WIRE_DATE_FORMAT).ok()
}

/// Instant a calendar date denotes when compared against "now" (midnight UTC).
pub fn start_of_day_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.format(WIRE_DATE_FORMAT).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_wire_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date: {}", raw)))
}
