use crate::domain::error::ErrorKind;
use crate::domain::models::{AttendanceRecord, DaySummary, PunchType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Non-negative worked time in whole minutes. Displays as `HH:MM`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WorkedDuration {
    minutes: u64,
}

impl WorkedDuration {
    pub const ZERO: WorkedDuration = WorkedDuration { minutes: 0 };

    pub fn from_minutes(minutes: u64) -> Self {
        Self { minutes }
    }

    /// Elapsed whole minutes between two instants, truncated toward zero and
    /// clamped at zero.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let minutes = end.signed_duration_since(start).num_minutes();
        Self::from_minutes(u64::try_from(minutes).unwrap_or(0))
    }

    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    pub fn is_zero(&self) -> bool {
        self.minutes == 0
    }
}

impl fmt::Display for WorkedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

impl Add for WorkedDuration {
    type Output = WorkedDuration;

    fn add(self, rhs: Self) -> Self::Output {
        WorkedDuration::from_minutes(self.minutes + rhs.minutes)
    }
}

impl AddAssign for WorkedDuration {
    fn add_assign(&mut self, rhs: Self) {
        self.minutes += rhs.minutes;
    }
}

impl Sum for WorkedDuration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(WorkedDuration::ZERO, Add::add)
    }
}

/// A matched entrance/exit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub entrance: DateTime<Utc>,
    pub exit: DateTime<Utc>,
    pub worked: WorkedDuration,
}

/// A punch that never found its counterpart: an entrance replaced by a later
/// entrance or left open at the end of the day, or an exit with nothing open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrphanedPunch {
    pub punch_type: PunchType,
    pub timestamp: DateTime<Utc>,
}

impl OrphanedPunch {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::OrphanedPunch
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulation {
    pub worked: WorkedDuration,
    pub intervals: Vec<Interval>,
    pub orphans: Vec<OrphanedPunch>,
    /// Entrance still waiting for its exit at the end of the sequence. It is
    /// also listed in `orphans`.
    pub open_since: Option<DateTime<Utc>>,
}

pub fn accumulate(history: &[AttendanceRecord]) -> WorkedDuration {
    accumulate_detailed(history).worked
}

pub fn accumulate_detailed(history: &[AttendanceRecord]) -> Accumulation {
    let mut accumulation = Accumulation::default();
    let mut open: Option<&AttendanceRecord> = None;

    for record in AttendanceRecord::chronological(history) {
        match record.punch_type {
            PunchType::Entrance => {
                if let Some(previous) = open.replace(record) {
                    tracing::warn!(
                        "Entrance at {} replaced by a later entrance at {} without an exit",
                        previous.timestamp,
                        record.timestamp
                    );
                    accumulation.orphans.push(OrphanedPunch {
                        punch_type: PunchType::Entrance,
                        timestamp: previous.timestamp,
                    });
                }
            }
            PunchType::Exit => match open.take() {
                Some(entrance) => {
                    let worked = WorkedDuration::between(entrance.timestamp, record.timestamp);
                    accumulation.worked += worked;
                    accumulation.intervals.push(Interval {
                        entrance: entrance.timestamp,
                        exit: record.timestamp,
                        worked,
                    });
                }
                None => {
                    tracing::warn!("Exit at {} without a matching entrance", record.timestamp);
                    accumulation.orphans.push(OrphanedPunch {
                        punch_type: PunchType::Exit,
                        timestamp: record.timestamp,
                    });
                }
            },
        }
    }

    if let Some(entrance) = open {
        tracing::debug!("Entrance at {} is still open", entrance.timestamp);
        accumulation.open_since = Some(entrance.timestamp);
        accumulation.orphans.push(OrphanedPunch {
            punch_type: PunchType::Entrance,
            timestamp: entrance.timestamp,
        });
    }

    accumulation
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub worked: WorkedDuration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyTotals {
    pub days: Vec<DayTotal>,
    pub total: WorkedDuration,
}

/// Per-day accumulation; pairs never span day boundaries and the grand total
/// is the sum of the day totals.
pub fn accumulate_month(days: &[DaySummary]) -> MonthlyTotals {
    let days: Vec<DayTotal> = days
        .iter()
        .map(|day| DayTotal {
            date: day.date,
            worked: day.worked(),
        })
        .collect();
    let total = days.iter().map(|day| day.worked).sum();

    MonthlyTotals { days, total }
}

#[cfg(test)]
mod accumulator_tests {
    use super::*;
    use chrono::{Duration, FixedOffset, TimeZone};
    use proptest::prelude::*;
    use rstest::rstest;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, hour, minute, 0).unwrap()
    }

    fn entrance(hour: u32, minute: u32) -> AttendanceRecord {
        AttendanceRecord::new(at(hour, minute), PunchType::Entrance)
    }

    fn exit(hour: u32, minute: u32) -> AttendanceRecord {
        AttendanceRecord::new(at(hour, minute), PunchType::Exit)
    }

    #[rstest]
    #[case(vec![], "00:00")]
    #[case(vec![entrance(9, 0)], "00:00")]
    #[case(vec![exit(9, 0)], "00:00")]
    #[case(vec![entrance(9, 0), exit(12, 0)], "03:00")]
    #[case(vec![entrance(9, 0), exit(12, 0), entrance(13, 0), exit(17, 30)], "07:30")]
    #[case(vec![exit(17, 30), entrance(13, 0), exit(12, 0), entrance(9, 0)], "07:30")]
    #[case(vec![entrance(8, 0), entrance(9, 0), exit(12, 0)], "03:00")]
    #[case(vec![entrance(9, 0), exit(12, 0), exit(12, 30)], "03:00")]
    #[case(vec![entrance(9, 0), exit(12, 0), entrance(13, 0)], "03:00")]
    fn it_should_accumulate_matched_pairs(
        #[case] history: Vec<AttendanceRecord>,
        #[case] expected: &str,
    ) {
        assert_eq!(accumulate(&history).to_string(), expected);
    }

    #[rstest]
    fn it_should_truncate_each_pair_to_whole_minutes() {
        let history = vec![
            AttendanceRecord::new(at(9, 0), PunchType::Entrance),
            AttendanceRecord::new(at(9, 0) + Duration::seconds(119), PunchType::Exit),
        ];

        assert_eq!(accumulate(&history).minutes(), 1);
    }

    #[rstest]
    fn it_should_report_orphaned_punches() {
        let history = vec![exit(8, 0), entrance(9, 0), entrance(10, 0), exit(11, 0), entrance(14, 0)];

        let accumulation = accumulate_detailed(&history);

        assert_eq!(accumulation.worked.minutes(), 60);
        assert_eq!(accumulation.intervals.len(), 1);
        assert_eq!(accumulation.intervals[0].entrance, at(10, 0));
        let orphans: Vec<(PunchType, DateTime<Utc>)> = accumulation
            .orphans
            .iter()
            .map(|o| (o.punch_type, o.timestamp))
            .collect();
        assert_eq!(
            orphans,
            vec![
                (PunchType::Exit, at(8, 0)),
                (PunchType::Entrance, at(9, 0)),
                (PunchType::Entrance, at(14, 0)),
            ]
        );
        assert!(accumulation.orphans.iter().all(|o| o.kind() == ErrorKind::OrphanedPunch));
        assert_eq!(accumulation.open_since, Some(at(14, 0)));
    }

    #[rstest]
    fn it_should_not_be_open_after_a_closed_day() {
        let accumulation = accumulate_detailed(&[entrance(8, 0), entrance(9, 0), exit(12, 0)]);

        assert_eq!(accumulation.open_since, None);
    }

    #[rstest]
    fn it_should_close_before_reopening_on_equal_timestamps() {
        let history = vec![entrance(9, 0), entrance(12, 0), exit(12, 0), exit(13, 0)];

        // 09:00-12:00 then 12:00-13:00
        assert_eq!(accumulate(&history).to_string(), "04:00");
    }

    #[rstest]
    #[case(0, "00:00")]
    #[case(59, "00:59")]
    #[case(60, "01:00")]
    #[case(450, "07:30")]
    #[case(6_000, "100:00")]
    fn it_should_format_hours_without_an_upper_bound(#[case] minutes: u64, #[case] expected: &str) {
        assert_eq!(WorkedDuration::from_minutes(minutes).to_string(), expected);
    }

    #[rstest]
    fn it_should_not_pair_across_midnight_in_monthly_totals() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let records = vec![
            AttendanceRecord::new(Utc.with_ymd_and_hms(2024, 5, 6, 22, 0, 0).unwrap(), PunchType::Entrance),
            AttendanceRecord::new(Utc.with_ymd_and_hms(2024, 5, 7, 2, 0, 0).unwrap(), PunchType::Exit),
            AttendanceRecord::new(Utc.with_ymd_and_hms(2024, 5, 7, 9, 0, 0).unwrap(), PunchType::Entrance),
            AttendanceRecord::new(Utc.with_ymd_and_hms(2024, 5, 7, 17, 0, 0).unwrap(), PunchType::Exit),
        ];
        let flat = accumulate(&records);
        let days = DaySummary::group_by_day(records, offset);

        let totals = accumulate_month(&days);

        assert_eq!(flat.to_string(), "12:00");
        assert_eq!(totals.days.len(), 2);
        assert_eq!(totals.days[0].worked, WorkedDuration::ZERO);
        assert_eq!(totals.days[1].worked.to_string(), "08:00");
        assert_eq!(totals.total.to_string(), "08:00");
    }

    fn arbitrary_history() -> impl Strategy<Value = Vec<AttendanceRecord>> {
        proptest::collection::vec((0i64..86_400, any::<bool>()), 0..16).prop_map(|punches| {
            punches
                .into_iter()
                .map(|(second, is_entrance)| {
                    let punch_type = if is_entrance { PunchType::Entrance } else { PunchType::Exit };
                    AttendanceRecord::new(at(0, 0) + Duration::seconds(second), punch_type)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn accumulate_is_invariant_under_permutation(
            history in arbitrary_history(),
            shuffled in arbitrary_history().prop_flat_map(|h| Just(h).prop_shuffle()),
        ) {
            let mut reversed = history.clone();
            reversed.reverse();
            prop_assert_eq!(accumulate(&history), accumulate(&reversed));

            let mut sorted = shuffled.clone();
            sorted.sort_by_key(|r| r.timestamp);
            prop_assert_eq!(accumulate(&shuffled), accumulate(&sorted));
        }

        #[test]
        fn monthly_total_is_the_sum_of_day_totals(
            offsets in proptest::collection::vec((0i64..(31 * 86_400), any::<bool>()), 0..40),
        ) {
            let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
            let records: Vec<AttendanceRecord> = offsets
                .into_iter()
                .map(|(second, is_entrance)| {
                    let punch_type = if is_entrance { PunchType::Entrance } else { PunchType::Exit };
                    AttendanceRecord::new(start + Duration::seconds(second), punch_type)
                })
                .collect();
            let days = DaySummary::group_by_day(records, FixedOffset::west_opt(3 * 3600).unwrap());

            let totals = accumulate_month(&days);
            let summed: WorkedDuration = days.iter().map(|day| accumulate(day.records())).sum();

            prop_assert_eq!(totals.total, summed);
            prop_assert_eq!(totals.days.len(), days.len());
        }
    }
}
