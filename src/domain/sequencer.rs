use crate::domain::error::ErrorKind;
use crate::domain::models::{AttendanceRecord, PunchType, chronological_order};

/// The punch the user is expected to register next, and the record that
/// decision was based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPunch<'a> {
    pub punch_type: PunchType,
    pub after: Option<&'a AttendanceRecord>,
}

impl NextPunch<'_> {
    /// `EmptyHistory` when there was nothing to flip from.
    pub fn signal(&self) -> Option<ErrorKind> {
        self.after.is_none().then_some(ErrorKind::EmptyHistory)
    }
}

pub fn inspect(history: &[AttendanceRecord]) -> NextPunch<'_> {
    // Arrival order from the backend is not chronological, so the last record
    // is picked by timestamp rather than by position.
    let last = history.iter().max_by(|a, b| chronological_order(a, b));

    NextPunch {
        punch_type: last.map_or(PunchType::Entrance, |record| record.punch_type.opposite()),
        after: last,
    }
}

/// Entrance for an empty history, otherwise the opposite of the
/// chronologically last record. History is never repaired: two consecutive
/// entrances still yield an exit.
pub fn next_type(history: &[AttendanceRecord]) -> PunchType {
    inspect(history).punch_type
}
