use crate::FieldKind;
use thiserror::Error;

/// Rejected cron text. Raised once at parse time, never during a search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected 5 fields, found {found} in {text:?}")]
    FieldCount { found: usize, text: String },

    #[error("unknown predefined schedule {0:?}")]
    UnknownMacro(String),

    #[error("{kind} field is empty")]
    Empty { kind: FieldKind },

    #[error("{kind} field: malformed item {item:?}")]
    Malformed { kind: FieldKind, item: String },

    #[error("{kind} field: unknown value {token:?}")]
    UnknownValue { kind: FieldKind, token: String },

    #[error("{kind} field: value {value} is outside {min}-{max}")]
    OutOfRange { kind: FieldKind, value: u32, min: u32, max: u32 },

    #[error("{kind} field: range {start}-{end} runs backwards")]
    InvalidRange { kind: FieldKind, start: u32, end: u32 },

    #[error("{kind} field: step must be at least 1 in {item:?}")]
    InvalidStep { kind: FieldKind, item: String },

    #[error("{kind} field: {item:?} cannot be combined with a list")]
    NotListable { kind: FieldKind, item: String },

    #[error("{kind} field: {token:?} is not allowed here")]
    UnsupportedToken { kind: FieldKind, token: String },

    #[error("weekday must be a value between 0 and 7, {0} given")]
    InvalidWeekday(u32),

    #[error("there are never more than 5 or less than 1 of a given weekday in a month, {0} given")]
    InvalidOccurrence(u32),

    #[error("unknown timezone {0:?}")]
    UnknownZone(String),
}

/// A search that ran out of iterations without finding a satisfying moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("no run date found within {iterations} iterations")]
    Exhausted { iterations: usize },
}
