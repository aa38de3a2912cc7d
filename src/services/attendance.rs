use crate::api::{ApiError, AttendanceBackend, AuthProof, PunchRequest, Session};
use crate::domain::accumulator::{self, Accumulation, MonthlyTotals, WorkedDuration};
use crate::domain::models::{AttendanceRecord, DaySummary, PunchType, RawRecord};
use crate::domain::{normalizer, report, sequencer};
use crate::utils::time::local_date;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use std::collections::BTreeMap;

/// One day as shown to the user.
#[derive(Debug, Clone)]
pub struct DayView {
    pub summary: DaySummary,
    /// What the next punch will be, decided from everything the backend
    /// returned for its own day window.
    pub next: PunchType,
    pub worked: WorkedDuration,
    pub detail: Accumulation,
    /// Records dropped because they could not be normalized.
    pub invalid: usize,
}

impl DayView {
    fn build(summary: DaySummary, next: PunchType, invalid: usize) -> Self {
        let detail = summary.detail();

        DayView {
            summary,
            next,
            worked: detail.worked,
            detail,
            invalid,
        }
    }

    pub fn is_working(&self) -> bool {
        self.next == PunchType::Exit
    }
}

#[derive(Debug, Clone)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DaySummary>,
    pub totals: MonthlyTotals,
    pub invalid: usize,
}

impl MonthlyReport {
    pub fn csv(&self, offset: FixedOffset) -> String {
        report::monthly_csv(&self.days, offset)
    }

    pub fn file_name(&self) -> String {
        report::report_file_name(self.year, self.month)
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PunchOutcome {
    /// Type computed from today's history and sent to the backend.
    pub requested: PunchType,
    /// The record as the backend reports it was stored. `None` when the
    /// receipt could not be normalized.
    pub committed: Option<AttendanceRecord>,
    pub message: Option<String>,
}

impl PunchOutcome {
    pub fn committed_type(&self) -> Option<PunchType> {
        self.committed.as_ref().map(|record| record.punch_type)
    }
}

/// The backend's "today" is a UTC day, so records from another local day are
/// left out of the summary. They still count for the next punch type, since
/// the backend sequences against the same window.
pub async fn today_summary<B: AttendanceBackend + ?Sized>(
    backend: &B,
    session: &Session,
    today: NaiveDate,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<DayView, ApiError> {
    let raw_records = backend.fetch_today(session).await?;
    let (records, invalid) = normalize_counted(&raw_records, fallback_for(today, offset, now));
    let next = sequencer::next_type(&records);

    let (local, other): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|record| local_date(record.timestamp, offset) == today);
    if !other.is_empty() {
        tracing::debug!("{} records from today's window fall outside {}", other.len(), today);
    }

    Ok(DayView::build(DaySummary::new(today, local), next, invalid))
}

pub async fn day_summary<B: AttendanceBackend + ?Sized>(
    backend: &B,
    session: &Session,
    date: NaiveDate,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<DayView, ApiError> {
    let raw_records = backend.fetch_day(session, date).await?;
    let (records, invalid) = normalize_counted(&raw_records, fallback_for(date, offset, now));
    let next = sequencer::next_type(&records);

    Ok(DayView::build(DaySummary::new(date, records), next, invalid))
}

/// Builds the month from the backend's day groups. Groups whose date cannot be
/// read are regrouped by the local day of their own records.
pub async fn monthly_report<B: AttendanceBackend + ?Sized>(
    backend: &B,
    session: &Session,
    year: i32,
    month: u32,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<MonthlyReport, ApiError> {
    let groups = backend.fetch_month(session, year, month).await?;

    let mut by_date: BTreeMap<NaiveDate, Vec<AttendanceRecord>> = BTreeMap::new();
    let mut ungrouped = Vec::new();
    let mut invalid = 0;

    for group in &groups {
        match group.day() {
            Some(date) => {
                let (records, dropped) =
                    normalize_counted(&group.records, fallback_for(date, offset, now));
                invalid += dropped;
                by_date.entry(date).or_default().extend(records);
            }
            None => {
                tracing::warn!("Unreadable day group date {:?}, regrouping its records", group.date);
                let (records, dropped) = normalize_counted(&group.records, now);
                invalid += dropped;
                ungrouped.extend(records);
            }
        }
    }

    for day in DaySummary::group_by_day(ungrouped, offset) {
        if day.date.year() == year && day.date.month() == month {
            by_date
                .entry(day.date)
                .or_default()
                .extend(day.records().iter().cloned());
        }
    }

    let days: Vec<DaySummary> = by_date
        .into_iter()
        .filter(|(_, records)| !records.is_empty())
        .map(|(date, records)| DaySummary::new(date, records))
        .collect();
    let totals = accumulator::accumulate_month(&days);

    tracing::debug!(
        "Monthly report {}/{}: {} days, {} worked",
        month,
        year,
        days.len(),
        totals.total
    );

    Ok(MonthlyReport {
        year,
        month,
        days,
        totals,
        invalid,
    })
}

/// Decides the next punch from today's history and submits it. The receipt
/// is authoritative for what was stored.
pub async fn punch<B: AttendanceBackend + ?Sized>(
    backend: &B,
    session: &Session,
    proof: &AuthProof,
    device: &str,
    now: DateTime<Utc>,
) -> Result<PunchOutcome, ApiError> {
    let history = normalizer::normalize_valid(&backend.fetch_today(session).await?, now);
    let requested = sequencer::next_type(&history);

    let request = PunchRequest::new(requested, proof, device);
    let receipt = backend.submit_punch(session, &request).await?;
    let message = receipt.message.clone();

    let committed = match normalizer::normalize_one(&receipt.into_raw(&request), now) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!("Punch receipt could not be normalized: {}", e);
            None
        }
    };

    if let Some(record) = &committed {
        if record.punch_type != requested {
            tracing::warn!(
                "Backend stored a {} punch but {} was requested",
                record.punch_type,
                requested
            );
        }
    }

    Ok(PunchOutcome {
        requested,
        committed,
        message,
    })
}

/// Stand-in instant for unreadable timestamps on `date`: now, or the last
/// second of that local day when the day is already over.
fn fallback_for(date: NaiveDate, offset: FixedOffset, now: DateTime<Utc>) -> DateTime<Utc> {
    let end_of_day = date
        .and_hms_opt(23, 59, 59)
        .and_then(|end| end.and_local_timezone(offset).single())
        .map(|end| end.with_timezone(&Utc));

    match end_of_day {
        Some(end) if end < now => end,
        _ => now,
    }
}

fn normalize_counted(
    raw_records: &[RawRecord],
    fallback: DateTime<Utc>,
) -> (Vec<AttendanceRecord>, usize) {
    let records = normalizer::normalize_valid(raw_records, fallback);
    let invalid = raw_records.len() - records.len();
    (records, invalid)
}
