//! Per-field satisfaction tests and single-step increments.
//!
//! Matchers hold no state. Everything that changes during a search lives on
//! the [`CalendarMoment`]; the `&mut` borrow only feeds its transition cache.

use chrono::{Datelike, NaiveDate, Timelike};

use crate::calendar;
use crate::cursor::{CalendarMoment, Grain};
use crate::field::{FieldKind, FieldSpec, ValueSet};
use crate::{Direction, Schedule};

/// Does the cursor satisfy `spec` for the non-day field `kind`?
///
/// Day fields are judged together by [`day_satisfied`].
pub(crate) fn is_satisfied(kind: FieldKind, spec: &FieldSpec, cursor: &mut CalendarMoment) -> bool {
    let set = match spec {
        FieldSpec::Values(set) => set,
        FieldSpec::Wildcard | FieldSpec::Unconstrained => return true,
        _ => return false,
    };

    match kind {
        FieldKind::Month => set.contains(cursor.wall().month()),
        FieldKind::Hour => clock_matches(Grain::Hour, set, cursor, |wall| wall.hour()),
        FieldKind::Minute => clock_matches(Grain::Minute, set, cursor, |wall| wall.minute()),
        FieldKind::DayOfMonth => set.contains(cursor.wall().day()),
        FieldKind::DayOfWeek => set.contains(calendar::weekday_number(cursor.wall().date())),
    }
}

/// Hours and minutes also match through the gap shadow, so a run aimed at a
/// skipped local time fires on the instant the clock jumped to.
///
/// After a finer mutation that turned the clock back, the reading with that
/// offset change undone must match as well. Rolling 01:59 BST on to 01:00 GMT
/// logically crosses into hour 2, so `0 1 * * *` does not fire a second time
/// in the repeated hour, while `0 * * * *` fires in both.
fn clock_matches(
    grain: Grain,
    set: &ValueSet,
    cursor: &mut CalendarMoment,
    read: impl Fn(chrono::NaiveDateTime) -> u32,
) -> bool {
    let matches =
        set.contains(read(cursor.wall())) || cursor.gap_shadow().is_some_and(|shadow| set.contains(read(shadow)));
    matches && (!turned_back(grain, cursor) || set.contains(read(cursor.unshifted_wall())))
}

/// The last mutation worked below `grain` and set the clock back against
/// the travel direction.
fn turned_back(grain: Grain, cursor: &CalendarMoment) -> bool {
    let against_travel = i64::from(cursor.last_offset_change()) * cursor.direction().sign() < 0;
    against_travel && cursor.last_grain().is_some_and(|last| last < grain)
}

/// Day test with vixie-cron semantics.
///
/// `?` or `*` on one side defers to the other side; two restricted fields
/// match when either one does.
pub(crate) fn day_satisfied(day_of_month: &FieldSpec, day_of_week: &FieldSpec, date: NaiveDate) -> bool {
    match (day_of_month.is_restricted(), day_of_week.is_restricted()) {
        (false, false) => true,
        (true, false) => day_of_month_matches(day_of_month, date),
        (false, true) => day_of_week_matches(day_of_week, date),
        (true, true) => day_of_month_matches(day_of_month, date) || day_of_week_matches(day_of_week, date),
    }
}

pub(crate) fn day_of_month_matches(spec: &FieldSpec, date: NaiveDate) -> bool {
    match spec {
        FieldSpec::Wildcard | FieldSpec::Unconstrained => true,
        FieldSpec::Values(set) => set.contains(date.day()),
        FieldSpec::LastDayOfMonth => date.day() == calendar::days_in_month(date.year(), date.month()),
        FieldSpec::NearestWeekday(day) => calendar::nearest_weekday(date.year(), date.month(), *day) == Some(date.day()),
        FieldSpec::NthWeekday { .. } | FieldSpec::LastWeekday(_) => false,
    }
}

pub(crate) fn day_of_week_matches(spec: &FieldSpec, date: NaiveDate) -> bool {
    let weekday = calendar::weekday_number(date);
    match spec {
        FieldSpec::Wildcard | FieldSpec::Unconstrained => true,
        FieldSpec::Values(set) => set.contains(weekday),
        FieldSpec::NthWeekday { weekday: wanted, nth } => {
            weekday == *wanted && calendar::weekday_occurrence(date) == *nth
        }
        FieldSpec::LastWeekday(wanted) => weekday == *wanted && calendar::is_last_occurrence(date),
        FieldSpec::LastDayOfMonth | FieldSpec::NearestWeekday(_) => false,
    }
}

/// Every field of `schedule` holds at the cursor.
pub(crate) fn all_satisfied(schedule: &Schedule, cursor: &mut CalendarMoment) -> bool {
    is_satisfied(FieldKind::Month, schedule.field(FieldKind::Month), cursor)
        && day_satisfied(
            schedule.field(FieldKind::DayOfMonth),
            schedule.field(FieldKind::DayOfWeek),
            cursor.wall().date(),
        )
        && is_satisfied(FieldKind::Hour, schedule.field(FieldKind::Hour), cursor)
        && is_satisfied(FieldKind::Minute, schedule.field(FieldKind::Minute), cursor)
}

/// Advance the cursor one step for `kind`: one unit for wildcards, the next
/// listed value (wrapping into the next larger unit) otherwise.
pub(crate) fn increment(kind: FieldKind, spec: &FieldSpec, cursor: &mut CalendarMoment) {
    match (kind, spec) {
        (FieldKind::Month, _) => cursor.increment_month(),
        (FieldKind::DayOfMonth | FieldKind::DayOfWeek, _) => cursor.increment_day(),
        (FieldKind::Hour, FieldSpec::Values(set)) => {
            let hour = cursor.wall().hour();
            match neighbour(set, hour, cursor.direction()) {
                Some(target) => cursor.set_hour(target),
                None => cursor.increment_hour(),
            }
        }
        (FieldKind::Hour, _) => cursor.increment_hour(),
        (FieldKind::Minute, FieldSpec::Values(set)) => {
            let minute = cursor.wall().minute();
            match neighbour(set, minute, cursor.direction()) {
                Some(target) => cursor.set_minutes(target),
                None => cursor.increment_minute(),
            }
        }
        (FieldKind::Minute, _) => cursor.increment_minute(),
    }
}

/// The next value in travel order, wrapping around to the first (or last).
fn neighbour(set: &ValueSet, current: u32, direction: Direction) -> Option<u32> {
    match direction {
        Direction::Forward => set.next_after(current).or_else(|| set.first()),
        Direction::Backward => set.prev_before(current).or_else(|| set.last()),
    }
}
