//! Search metrics.
//!
//! Counters collected while a search runs. Collection is always on; it costs
//! a handful of integer increments per iteration. Callers see them through
//! [`search_verbose_with`](crate::search_verbose_with).

use std::time::Duration;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::{Direction, FieldKind, SearchError};

// --- Metrics -----------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchMetrics {
    /// Loop iterations used, including the final matching evaluation.
    pub iterations: usize,
    /// Month increments.
    pub month_steps: usize,
    /// Day increments (day-of-month and day-of-week share the day step).
    pub day_steps: usize,
    /// Hour increments and hour targets.
    pub hour_steps: usize,
    /// Minute increments and minute targets, including forced and skip steps.
    pub minute_steps: usize,
    /// Mutations whose `last_offset_change` was non-zero.
    pub offset_changes: usize,
}

impl SearchMetrics {
    pub(crate) fn record(&mut self, kind: FieldKind, offset_change: i32) {
        match kind {
            FieldKind::Month => self.month_steps += 1,
            FieldKind::DayOfMonth | FieldKind::DayOfWeek => self.day_steps += 1,
            FieldKind::Hour => self.hour_steps += 1,
            FieldKind::Minute => self.minute_steps += 1,
        }
        if offset_change != 0 {
            self.offset_changes += 1;
        }
    }

    /// Total cursor mutations.
    pub fn mutations(&self) -> usize {
        self.month_steps + self.day_steps + self.hour_steps + self.minute_steps
    }
}

/// Search outcome bundled with what it took to get there.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// The cursor's starting point, after binding to the zone and dropping seconds.
    pub start: DateTime<Tz>,
    pub direction: Direction,
    /// The run date, or why there is none.
    pub result: Result<DateTime<Tz>, SearchError>,
    pub metrics: SearchMetrics,
    /// Wall time spent searching.
    pub elapsed: Duration,
}
