//! DST-safe cron schedule evaluation.
//!
//! `cronwalk` answers one question for a classic 5-field cron expression: when
//! does it fire next (or when did it last fire) in a given IANA timezone? The
//! hard part is not the field grammar but walking wall-clock time across
//! daylight-saving gaps and folds without ever moving the underlying instant
//! the wrong way.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use chrono_tz::Europe::London;
//!
//! let schedule = cronwalk::parse("0 1 * * 0").unwrap();
//! let from = Utc.with_ymd_and_hms(2021, 3, 21, 2, 0, 0).unwrap();
//! let next = cronwalk::next_run_date(&schedule, &from, 0, true, London).unwrap();
//!
//! // 01:00 never happens in London on 2021-03-28; the run lands on the
//! // instant the clocks jumped to.
//! assert_eq!(next.to_rfc3339(), "2021-03-28T02:00:00+01:00");
//! ```

extern crate self as cronwalk;

#[macro_use]
mod macros;
mod api;
mod calendar;
mod cursor;
mod engine;
mod error;
mod field;
mod matcher;
mod parse;
mod schedule;
mod zone;

pub use api::{
    Options, is_due, multiple_run_dates, multiple_run_dates_with, next_run_date, next_run_date_with, parse,
    previous_run_date, previous_run_date_with, search_verbose, search_verbose_with,
};
pub use cursor::{CalendarMoment, Grain};
pub use engine::{Runs, SearchMetrics, SearchReport};
pub use error::{ParseError, SearchError};
pub use field::{FieldKind, FieldSpec, ValueSet};
pub use schedule::Schedule;
pub use zone::{Transition, parse_zone};

// --- Shared internal types ---------------------------------------------------

/// Which way a search walks through time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Towards later instants (next run).
    #[default]
    Forward,
    /// Towards earlier instants (previous run).
    Backward,
}

impl Direction {
    /// `1` for forward, `-1` for backward.
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    pub fn is_backward(self) -> bool {
        self == Direction::Backward
    }
}
