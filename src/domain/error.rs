use thiserror::Error;

/// Classification of the signals the attendance core can produce.
///
/// Only `InvalidRecord` is an actual failure. `EmptyHistory` and
/// `OrphanedPunch` describe defined behavior and never abort a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRecord,
    EmptyHistory,
    OrphanedPunch,
}

/// Per-record normalization failure. Surfaced alongside the other results of
/// a batch, never raised for the batch as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("invalid record: punch type is missing")]
    MissingType,

    #[error("invalid record: unknown punch type {0:?}")]
    UnknownType(String),
}

impl RecordError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidRecord
    }
}
