//! Zone-free calendar arithmetic used by the day matchers and the cursor.

use chrono::{Datelike, Days, NaiveDate, Weekday};

pub(crate) fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Day-of-month a `dayW` directive fires on in the given month.
///
/// Saturdays move back to Friday and Sundays forward to Monday, except where
/// that would leave the month (1st on a Saturday fires Monday the 3rd; a
/// Sunday month end fires Friday). `None` when the month has no such day.
pub(crate) fn nearest_weekday(year: i32, month: u32, day: u32) -> Option<u32> {
    let last = days_in_month(year, month);
    if day == 0 || day > last {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let resolved = match date.weekday() {
        Weekday::Sat if day == 1 => day + 2,
        Weekday::Sat => day - 1,
        Weekday::Sun if day == last => day - 2,
        Weekday::Sun => day + 1,
        _ => day,
    };
    Some(resolved)
}

/// Sunday-based weekday number, 0..=6.
pub(crate) fn weekday_number(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// 1-based index of `date` among the days of the month sharing its weekday.
pub(crate) fn weekday_occurrence(date: NaiveDate) -> u32 {
    (date.day() - 1) / 7 + 1
}

/// True when no later day of the same month falls on the same weekday.
pub(crate) fn is_last_occurrence(date: NaiveDate) -> bool {
    date.day() + 7 > days_in_month(date.year(), date.month())
}

pub(crate) fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 { (date.year() + 1, 1) } else { (date.year(), date.month() + 1) };
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub(crate) fn last_of_previous_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?.checked_sub_days(Days::new(1))
}

/// Step a date one day in the direction given by `sign`.
pub(crate) fn step_day(date: NaiveDate, sign: i64) -> Option<NaiveDate> {
    if sign < 0 { date.checked_sub_days(Days::new(1)) } else { date.checked_add_days(Days::new(1)) }
}
