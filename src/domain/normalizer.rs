use crate::domain::error::RecordError;
use crate::domain::models::{AttendanceRecord, PunchType, RawRecord, RawTimestamp, RecordMetadata};
use chrono::{DateTime, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalizes a batch of raw records, one result per input in input order.
///
/// Unparseable timestamps are replaced by `fallback` and flagged; a missing or
/// unknown punch type fails that record only.
pub fn normalize(
    raw_records: &[RawRecord],
    fallback: DateTime<Utc>,
) -> Vec<Result<AttendanceRecord, RecordError>> {
    raw_records
        .iter()
        .map(|raw| normalize_one(raw, fallback))
        .collect()
}

/// Like [`normalize`] but drops invalid records, logging each one.
pub fn normalize_valid(raw_records: &[RawRecord], fallback: DateTime<Utc>) -> Vec<AttendanceRecord> {
    normalize(raw_records, fallback)
        .into_iter()
        .enumerate()
        .filter_map(|(index, result)| match result {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Dropping attendance record #{}: {}", index, e);
                None
            }
        })
        .collect()
}

pub fn normalize_one(raw: &RawRecord, fallback: DateTime<Utc>) -> Result<AttendanceRecord, RecordError> {
    let punch_type = match raw.punch_type.as_deref() {
        Some(value) => value.parse::<PunchType>()?,
        None => return Err(RecordError::MissingType),
    };

    let (timestamp, timestamp_recovered) = match raw.timestamp.as_ref().and_then(parse_timestamp) {
        Some(timestamp) => (timestamp, false),
        None => {
            tracing::warn!(
                "Unparseable timestamp {:?} on record {:?}, using {}",
                raw.timestamp,
                raw.id,
                fallback
            );
            (fallback, true)
        }
    };

    Ok(AttendanceRecord {
        timestamp,
        punch_type,
        metadata: RecordMetadata {
            id: raw.id.clone(),
            device: raw.device.clone(),
            auth_method: raw.auth_method.clone(),
            location: raw.location.clone(),
        },
        timestamp_recovered,
    })
}

pub fn parse_timestamp(raw: &RawTimestamp) -> Option<DateTime<Utc>> {
    match raw {
        RawTimestamp::Instant(timestamp) => Some(*timestamp),
        RawTimestamp::Millis(millis) => DateTime::from_timestamp_millis(*millis),
        RawTimestamp::FractionalMillis(millis) if millis.is_finite() => {
            DateTime::from_timestamp_millis(millis.trunc() as i64)
        }
        RawTimestamp::FractionalMillis(_) => None,
        RawTimestamp::Text(text) => parse_timestamp_text(text),
        RawTimestamp::Other(_) => None,
    }
}

/// RFC 3339 first, then offset-less forms read as UTC.
fn parse_timestamp_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.to_utc());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}
