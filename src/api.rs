use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

use crate::cursor::CalendarMoment;
use crate::engine::{self, Request, SearchReport};
use crate::{Direction, ParseError, Schedule, SearchError, matcher};

/// Options that affect searching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Loop iterations a single search may use before giving up with
    /// [`SearchError::Exhausted`]. Each iteration is one cursor mutation.
    pub max_iterations: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self { max_iterations: 1000 }
    }
}

/// Parse a cron expression: five fields or an `@` macro.
///
/// # Example
/// ```
/// use cronwalk::{FieldKind, parse};
///
/// let schedule = parse("*/15 9-17 * * mon-fri").unwrap();
/// let quarters = parse("0,15,30,45 * * * *").unwrap();
/// assert_eq!(schedule.field(FieldKind::Minute), quarters.field(FieldKind::Minute));
/// ```
pub fn parse(text: &str) -> Result<Schedule, ParseError> {
    Schedule::parse(text)
}

/// Does `schedule` fire during the minute containing `at`, read in `zone`?
pub fn is_due<Z: TimeZone>(schedule: &Schedule, at: &DateTime<Z>, zone: Tz) -> bool {
    let mut cursor = CalendarMoment::new(at, zone, Direction::Forward);
    matcher::all_satisfied(schedule, &mut cursor)
}

/// The `nth` run (0 = first) strictly after `from`, or at `from` when
/// `allow_current` is set and `from` is a whole minute.
pub fn next_run_date<Z: TimeZone>(
    schedule: &Schedule,
    from: &DateTime<Z>,
    nth: usize,
    allow_current: bool,
    zone: Tz,
) -> Result<DateTime<Tz>, SearchError> {
    next_run_date_with(schedule, from, nth, allow_current, zone, &Options::default())
}

pub fn next_run_date_with<Z: TimeZone>(
    schedule: &Schedule,
    from: &DateTime<Z>,
    nth: usize,
    allow_current: bool,
    zone: Tz,
    options: &Options,
) -> Result<DateTime<Tz>, SearchError> {
    search_verbose_with(schedule, from, nth, allow_current, Direction::Forward, zone, options).result
}

/// The `nth` run (0 = latest) before `from`, or at `from` when `allow_current` is set.
pub fn previous_run_date<Z: TimeZone>(
    schedule: &Schedule,
    from: &DateTime<Z>,
    nth: usize,
    allow_current: bool,
    zone: Tz,
) -> Result<DateTime<Tz>, SearchError> {
    previous_run_date_with(schedule, from, nth, allow_current, zone, &Options::default())
}

pub fn previous_run_date_with<Z: TimeZone>(
    schedule: &Schedule,
    from: &DateTime<Z>,
    nth: usize,
    allow_current: bool,
    zone: Tz,
    options: &Options,
) -> Result<DateTime<Tz>, SearchError> {
    search_verbose_with(schedule, from, nth, allow_current, Direction::Backward, zone, options).result
}

/// Up to `total` consecutive runs from `from`.
///
/// `allow_current` applies to the first run only. The list stops short when a
/// search exhausts its iterations.
pub fn multiple_run_dates<Z: TimeZone>(
    schedule: &Schedule,
    from: &DateTime<Z>,
    total: usize,
    direction: Direction,
    allow_current: bool,
    zone: Tz,
) -> Vec<DateTime<Tz>> {
    multiple_run_dates_with(schedule, from, total, direction, allow_current, zone, &Options::default())
}

pub fn multiple_run_dates_with<Z: TimeZone>(
    schedule: &Schedule,
    from: &DateTime<Z>,
    total: usize,
    direction: Direction,
    allow_current: bool,
    zone: Tz,
    options: &Options,
) -> Vec<DateTime<Tz>> {
    let mut runs = Vec::with_capacity(total);
    let mut cursor = from.with_timezone(&zone);

    for index in 0..total {
        let request = Request { nth: 0, allow_current: allow_current && index == 0, direction };
        match engine::search(schedule, &cursor, zone, request, options).result {
            Ok(found) => {
                runs.push(found);
                cursor = found;
            }
            Err(_) => break,
        }
    }

    runs
}

/// [`search_verbose_with`] with default [`Options`].
pub fn search_verbose<Z: TimeZone>(
    schedule: &Schedule,
    from: &DateTime<Z>,
    nth: usize,
    allow_current: bool,
    direction: Direction,
    zone: Tz,
) -> SearchReport {
    search_verbose_with(schedule, from, nth, allow_current, direction, zone, &Options::default())
}

/// Run one search and return it with its metrics.
///
/// This is the path the other search functions take; the report is what the
/// `cronwalk --report` output prints.
pub fn search_verbose_with<Z: TimeZone>(
    schedule: &Schedule,
    from: &DateTime<Z>,
    nth: usize,
    allow_current: bool,
    direction: Direction,
    zone: Tz,
    options: &Options,
) -> SearchReport {
    engine::search(schedule, from, zone, Request { nth, allow_current, direction }, options)
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};
    use chrono_tz::Europe::London;
    use yare::parameterized;

    use super::*;

    fn at(text: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_str(text, "%Y-%m-%d %H:%M%:z").unwrap()
    }

    #[test]
    fn next_and_previous_in_utc() {
        let schedule = parse("0 12 * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap();

        assert_eq!(next_run_date(&schedule, &from, 0, true, chrono_tz::UTC), Ok(from.with_timezone(&chrono_tz::UTC)));
        assert_eq!(
            next_run_date(&schedule, &from, 0, false, chrono_tz::UTC).map(|d| d.with_timezone(&Utc)),
            Ok(Utc.with_ymd_and_hms(2021, 6, 2, 12, 0, 0).unwrap())
        );
        assert_eq!(
            previous_run_date(&schedule, &from, 1, false, chrono_tz::UTC).map(|d| d.with_timezone(&Utc)),
            Ok(Utc.with_ymd_and_hms(2021, 5, 30, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn fold_scenarios() {
        let schedule = parse("0 1 * * 0").unwrap();
        let fold = at("2020-10-25 01:00+01:00");

        let from = at("2020-10-18 01:05+01:00");
        assert_eq!(next_run_date(&schedule, &from, 0, false, London).unwrap().fixed_offset(), at("2020-10-25 01:00+00:00"));
        assert_eq!(next_run_date(&schedule, &fold, 0, true, London).unwrap().fixed_offset(), fold);
        assert_eq!(next_run_date(&schedule, &fold, 0, false, London).unwrap().fixed_offset(), at("2020-11-01 01:00+00:00"));
    }

    #[test]
    fn is_due_ignores_seconds() {
        let schedule = parse("0 1 * * 0").unwrap();
        assert!(is_due(&schedule, &at("2020-10-25 01:00+00:00"), London));
        assert!(is_due(&schedule, &Utc.with_ymd_and_hms(2020, 10, 25, 1, 0, 42).unwrap(), London));
        assert!(!is_due(&schedule, &at("2020-10-25 01:01+00:00"), London));
    }

    #[test]
    fn is_due_on_the_jumped_to_instant() {
        let schedule = parse("0 1 * * 0").unwrap();
        assert!(is_due(&schedule, &at("2021-03-28 02:00+01:00"), London));
        assert!(!is_due(&schedule, &at("2021-03-28 03:00+01:00"), London));
    }

    #[test]
    fn day_fields_are_ored() {
        let schedule = parse("0 0 1 * MON").unwrap();
        // 2021-06-01 is a Tuesday.
        let from = Utc.with_ymd_and_hms(2021, 5, 31, 12, 0, 0).unwrap();
        let runs = multiple_run_dates(&schedule, &from, 3, Direction::Forward, false, chrono_tz::UTC);
        let days: Vec<u32> = runs.iter().map(|d| chrono::Datelike::day(d)).collect();
        assert_eq!(days, vec![1, 7, 14]);
    }

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[parameterized(
        last_day_of_february = { "0 0 L 2 *", utc(2023, 1, 1), utc(2023, 2, 28) },
        last_day_of_leap_february = { "0 0 L 2 *", utc(2024, 1, 1), utc(2024, 2, 29) },
        last_friday = { "0 0 ? * 5L", utc(2018, 12, 1), utc(2018, 12, 28) },
        saturday_first_moves_to_monday = { "0 0 1W * ?", utc(2022, 9, 15), utc(2022, 10, 3) },
        third_sunday = { "0 0 * * SUN#3", utc(2014, 4, 1), utc(2014, 4, 20) },
    )]
    fn next_run_with_day_directives(expr: &str, from: DateTime<Utc>, expected: DateTime<Utc>) {
        let schedule = parse(expr).unwrap();
        let found = next_run_date(&schedule, &from, 0, false, chrono_tz::UTC).unwrap();
        assert_eq!(found.with_timezone(&Utc), expected);
        assert!(is_due(&schedule, &found, chrono_tz::UTC));
    }

    #[parameterized(
        third_sunday = { "0 0 * * 0#3", utc(2014, 4, 30), utc(2014, 4, 20) },
        last_day_of_leap_february = { "0 0 L 2 *", utc(2024, 3, 15), utc(2024, 2, 29) },
        last_friday = { "0 0 ? * FRIL", utc(2019, 1, 15), utc(2018, 12, 28) },
    )]
    fn previous_run_with_day_directives(expr: &str, from: DateTime<Utc>, expected: DateTime<Utc>) {
        let schedule = parse(expr).unwrap();
        let found = previous_run_date(&schedule, &from, 0, false, chrono_tz::UTC).unwrap();
        assert_eq!(found.with_timezone(&Utc), expected);
    }

    #[test]
    fn hourly_runs_cover_the_repeated_hour() {
        let schedule = parse("0 * * * *").unwrap();
        let runs = multiple_run_dates(&schedule, &at("2020-10-25 00:00+01:00"), 3, Direction::Forward, true, London);
        let runs: Vec<_> = runs.iter().map(|d| d.fixed_offset()).collect();
        assert_eq!(runs, vec![at("2020-10-25 00:00+01:00"), at("2020-10-25 01:00+01:00"), at("2020-10-25 01:00+00:00")]);
        assert!(is_due(&schedule, &at("2020-10-25 01:00+01:00"), London));
    }

    #[test]
    fn multiple_run_dates_only_allows_current_first() {
        let schedule = parse("*/30 * * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2021, 6, 1, 10, 0, 0).unwrap();
        let runs = multiple_run_dates(&schedule, &from, 3, Direction::Forward, true, chrono_tz::UTC);
        let minutes: Vec<_> = runs.iter().map(|d| d.with_timezone(&Utc)).collect();
        assert_eq!(
            minutes,
            vec![
                Utc.with_ymd_and_hms(2021, 6, 1, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2021, 6, 1, 10, 30, 0).unwrap(),
                Utc.with_ymd_and_hms(2021, 6, 1, 11, 0, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn unsatisfiable_schedule_is_exhausted() {
        let schedule = parse("0 0 31 2 *").unwrap();
        let from = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            next_run_date(&schedule, &from, 0, false, chrono_tz::UTC),
            Err(SearchError::Exhausted { iterations: 1000 })
        );
        assert!(multiple_run_dates(&schedule, &from, 2, Direction::Forward, false, chrono_tz::UTC).is_empty());
    }

    #[test]
    fn verbose_search_reports_its_work() {
        let schedule = parse("30 9 * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap();
        let report = search_verbose(&schedule, &from, 0, false, Direction::Forward, chrono_tz::UTC);

        assert_eq!(report.result.map(|d| d.with_timezone(&Utc)), Ok(Utc.with_ymd_and_hms(2021, 6, 2, 9, 30, 0).unwrap()));
        assert_eq!(report.metrics.hour_steps, 1);
        assert!(report.metrics.minute_steps >= 1);
        assert_eq!(report.start.with_timezone(&Utc), from);
    }
}
