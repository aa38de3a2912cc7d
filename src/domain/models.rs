use crate::domain::accumulator::{self, Accumulation, WorkedDuration};
use crate::domain::error::RecordError;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PunchType {
    #[serde(rename = "entrada")]
    Entrance,
    #[serde(rename = "saída")]
    Exit,
}

impl PunchType {
    /// Label stored and validated by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            PunchType::Entrance => "entrada",
            PunchType::Exit => "saída",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            PunchType::Entrance => PunchType::Exit,
            PunchType::Exit => PunchType::Entrance,
        }
    }

    /// Secondary sort key for records sharing a timestamp: an exit closes the
    /// running interval before an entrance at the same instant opens the next.
    fn tie_rank(self) -> u8 {
        match self {
            PunchType::Exit => 0,
            PunchType::Entrance => 1,
        }
    }
}

impl fmt::Display for PunchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PunchType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entrada" | "entrance" | "entry" | "in" | "clock-in" | "clock_in" | "start" => {
                Ok(PunchType::Entrance)
            }
            "saída" | "saida" | "exit" | "out" | "clock-out" | "clock_out" | "end" => {
                Ok(PunchType::Exit)
            }
            _ => Err(RecordError::UnknownType(s.to_string())),
        }
    }
}

/// Timestamp exactly as a backend may send it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Epoch milliseconds.
    Millis(i64),
    FractionalMillis(f64),
    Instant(DateTime<Utc>),
    Text(String),
    Other(serde_json::Value),
}

/// Loosely typed attendance entry. Both observed response shapes are
/// accepted: the lower-case one returned by punch submission and the
/// capitalized one used by the listing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(default, alias = "ID", alias = "_id", deserialize_with = "loose_string")]
    pub id: Option<String>,
    #[serde(default, alias = "Timestamp")]
    pub timestamp: Option<RawTimestamp>,
    #[serde(
        default,
        rename = "type",
        alias = "Type",
        deserialize_with = "loose_string"
    )]
    pub punch_type: Option<String>,
    #[serde(default, alias = "Device", deserialize_with = "loose_string")]
    pub device: Option<String>,
    #[serde(
        default,
        rename = "authMethod",
        alias = "AuthMethod",
        alias = "auth_method",
        deserialize_with = "loose_string"
    )]
    pub auth_method: Option<String>,
    #[serde(default, alias = "Location", deserialize_with = "loose_string")]
    pub location: Option<String>,
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordMetadata {
    pub id: Option<String>,
    pub device: Option<String>,
    pub auth_method: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub timestamp: DateTime<Utc>,
    pub punch_type: PunchType,
    pub metadata: RecordMetadata,
    /// Set when the received timestamp could not be parsed and the fallback
    /// instant was used instead.
    pub timestamp_recovered: bool,
}

impl AttendanceRecord {
    pub fn new(timestamp: DateTime<Utc>, punch_type: PunchType) -> Self {
        Self {
            timestamp,
            punch_type,
            metadata: RecordMetadata::default(),
            timestamp_recovered: false,
        }
    }

    pub fn with_metadata(mut self, metadata: RecordMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Records in processing order: timestamp ascending, exits before
    /// entrances on equal timestamps.
    pub fn chronological(records: &[AttendanceRecord]) -> Vec<&AttendanceRecord> {
        let mut sorted: Vec<&AttendanceRecord> = records.iter().collect();
        sorted.sort_by(|a, b| chronological_order(a, b));
        sorted
    }
}

pub(crate) fn chronological_order(a: &AttendanceRecord, b: &AttendanceRecord) -> Ordering {
    a.timestamp
        .cmp(&b.timestamp)
        .then_with(|| a.punch_type.tie_rank().cmp(&b.punch_type.tie_rank()))
}

impl From<&AttendanceRecord> for RawRecord {
    fn from(record: &AttendanceRecord) -> Self {
        RawRecord {
            id: record.metadata.id.clone(),
            timestamp: Some(RawTimestamp::Instant(record.timestamp)),
            punch_type: Some(record.punch_type.as_str().to_string()),
            device: record.metadata.device.clone(),
            auth_method: record.metadata.auth_method.clone(),
            location: record.metadata.location.clone(),
        }
    }
}

/// One calendar day of punches. The worked duration is derived on demand and
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub date: NaiveDate,
    records: Vec<AttendanceRecord>,
}

impl DaySummary {
    pub fn new(date: NaiveDate, mut records: Vec<AttendanceRecord>) -> Self {
        records.sort_by(chronological_order);
        Self { date, records }
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn worked(&self) -> WorkedDuration {
        accumulator::accumulate(&self.timed_records())
    }

    pub fn detail(&self) -> Accumulation {
        accumulator::accumulate_detailed(&self.timed_records())
    }

    // A recovered timestamp is listed but never opens or closes a pair.
    fn timed_records(&self) -> Vec<AttendanceRecord> {
        self.records
            .iter()
            .filter(|record| !record.timestamp_recovered)
            .cloned()
            .collect()
    }

    /// Buckets records by the calendar day of their timestamp at `offset`,
    /// ascending by date.
    pub fn group_by_day(records: Vec<AttendanceRecord>, offset: FixedOffset) -> Vec<DaySummary> {
        let mut days: BTreeMap<NaiveDate, Vec<AttendanceRecord>> = BTreeMap::new();
        for record in records {
            let date = record.timestamp.with_timezone(&offset).date_naive();
            days.entry(date).or_default().push(record);
        }

        days.into_iter()
            .map(|(date, records)| DaySummary::new(date, records))
            .collect()
    }
}
