use std::time::Instant;

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

use super::metrics::{SearchMetrics, SearchReport};
use crate::cursor::CalendarMoment;
use crate::matcher;
use crate::{Direction, FieldKind, Options, Schedule, SearchError};

/// One search request. `nth` matches are skipped before one is returned.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Request {
    pub nth: usize,
    pub allow_current: bool,
    pub direction: Direction,
}

/// Find the `nth` run date from `from` in `zone`.
pub(crate) fn search<Z: TimeZone>(
    schedule: &Schedule,
    from: &DateTime<Z>,
    zone: Tz,
    request: Request,
    options: &Options,
) -> SearchReport {
    let started = Instant::now();
    let mut cursor = CalendarMoment::new(from, zone, request.direction);
    let start = cursor.instant();
    let mut metrics = SearchMetrics::default();

    let _span = tracing::debug_span!(
        target: "cronwalk::search",
        "search",
        schedule = schedule.source(),
        %start,
        direction = ?request.direction,
        nth = request.nth
    )
    .entered();

    // A start with seconds already lies past its own minute going forward.
    let forced = !request.allow_current || (cursor.was_truncated() && request.direction == Direction::Forward);
    if forced {
        step_minute(&mut cursor, &mut metrics);
    }

    let result = run(schedule, &mut cursor, request.nth, options, &mut metrics);
    match &result {
        Ok(found) => tracing::debug!(target: "cronwalk::search", %found, iterations = metrics.iterations, "run date found"),
        Err(err) => tracing::warn!(target: "cronwalk::search", %err, "search exhausted"),
    }

    SearchReport { start, direction: request.direction, result, metrics, elapsed: started.elapsed() }
}

fn run(
    schedule: &Schedule,
    cursor: &mut CalendarMoment,
    nth: usize,
    options: &Options,
    metrics: &mut SearchMetrics,
) -> Result<DateTime<Tz>, SearchError> {
    let mut skip = nth;

    for iteration in 1..=options.max_iterations {
        metrics.iterations = iteration;
        match first_unsatisfied(schedule, cursor) {
            Some(kind) => {
                matcher::increment(kind, schedule.field(kind), cursor);
                metrics.record(kind, cursor.last_offset_change());
                tracing::trace!(target: "cronwalk::search", field = %kind, moment = %cursor.instant(), "advanced");
            }
            None if skip > 0 => {
                skip -= 1;
                tracing::trace!(target: "cronwalk::search", moment = %cursor.instant(), remaining = skip, "skipping match");
                step_minute(cursor, metrics);
            }
            None => return Ok(cursor.instant()),
        }
    }

    Err(SearchError::Exhausted { iterations: options.max_iterations })
}

/// Coarsest field the cursor does not satisfy.
fn first_unsatisfied(schedule: &Schedule, cursor: &mut CalendarMoment) -> Option<FieldKind> {
    if !matcher::is_satisfied(FieldKind::Month, schedule.field(FieldKind::Month), cursor) {
        return Some(FieldKind::Month);
    }
    let date = cursor.wall().date();
    if !matcher::day_satisfied(schedule.field(FieldKind::DayOfMonth), schedule.field(FieldKind::DayOfWeek), date) {
        return Some(FieldKind::DayOfMonth);
    }
    [FieldKind::Hour, FieldKind::Minute].into_iter().find(|kind| !matcher::is_satisfied(*kind, schedule.field(*kind), cursor))
}

fn step_minute(cursor: &mut CalendarMoment, metrics: &mut SearchMetrics) {
    cursor.increment_minute();
    metrics.record(FieldKind::Minute, cursor.last_offset_change());
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};
    use chrono_tz::Europe::London;

    use super::*;

    fn at(text: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_str(text, "%Y-%m-%d %H:%M%:z").unwrap()
    }

    fn find(expr: &str, from: &str, direction: Direction, allow_current: bool) -> Result<DateTime<Tz>, SearchError> {
        let schedule = Schedule::parse(expr).unwrap();
        let request = Request { nth: 0, allow_current, direction };
        search(&schedule, &at(from), London, request, &Options::default()).result
    }

    fn next(from: &str, allow_current: bool) -> DateTime<FixedOffset> {
        find("0 1 * * 0", from, Direction::Forward, allow_current).unwrap().fixed_offset()
    }

    fn previous(from: &str) -> DateTime<FixedOffset> {
        find("0 1 * * 0", from, Direction::Backward, false).unwrap().fixed_offset()
    }

    #[test]
    fn spring_forward_next() {
        assert_eq!(next("2021-03-21 00:00+00:00", true), at("2021-03-21 01:00+00:00"));
        assert_eq!(next("2021-03-21 02:00+00:00", true), at("2021-03-28 02:00+01:00"));
        assert_eq!(next("2021-03-28 00:00+00:00", true), at("2021-03-28 02:00+01:00"));
        assert_eq!(next("2021-03-28 02:00+01:00", true), at("2021-03-28 02:00+01:00"));
        assert_eq!(next("2021-03-28 02:05+01:00", true), at("2021-04-04 01:00+01:00"));
    }

    #[test]
    fn spring_forward_previous() {
        assert_eq!(previous("2021-04-04 02:00+01:00"), at("2021-04-04 01:00+01:00"));
        assert_eq!(previous("2021-04-04 00:00+01:00"), at("2021-03-28 02:00+01:00"));
        assert_eq!(previous("2021-03-28 03:00+01:00"), at("2021-03-28 02:00+01:00"));
        assert_eq!(previous("2021-03-28 00:00+00:00"), at("2021-03-21 01:00+00:00"));
    }

    #[test]
    fn fall_back_next_allowing_current() {
        let cases = [
            ("2020-10-18 00:00+01:00", "2020-10-18 01:00+01:00"),
            ("2020-10-18 01:05+01:00", "2020-10-25 01:00+00:00"),
            ("2020-10-25 00:00+01:00", "2020-10-25 01:00+00:00"),
            ("2020-10-25 01:00+01:00", "2020-10-25 01:00+01:00"),
            ("2020-10-25 01:05+01:00", "2020-11-01 01:00+00:00"),
            ("2020-10-25 01:00+00:00", "2020-10-25 01:00+00:00"),
            ("2020-10-25 01:05+00:00", "2020-11-01 01:00+00:00"),
            // The same instants written in UTC.
            ("2020-10-17 23:00+00:00", "2020-10-18 01:00+01:00"),
            ("2020-10-25 00:00+00:00", "2020-10-25 01:00+01:00"),
            ("2020-10-25 00:05+00:00", "2020-11-01 01:00+00:00"),
        ];
        for (from, expected) in cases {
            assert_eq!(next(from, true), at(expected), "from {from}");
        }
    }

    #[test]
    fn fall_back_next_disallowing_current() {
        let cases = [
            ("2020-10-18 00:00+01:00", "2020-10-18 01:00+01:00"),
            ("2020-10-25 00:00+01:00", "2020-10-25 01:00+00:00"),
            ("2020-10-25 01:00+01:00", "2020-11-01 01:00+00:00"),
            ("2020-10-25 01:05+01:00", "2020-11-01 01:00+00:00"),
            ("2020-10-25 01:00+00:00", "2020-11-01 01:00+00:00"),
            ("2020-10-25 01:05+00:00", "2020-11-01 01:00+00:00"),
        ];
        for (from, expected) in cases {
            assert_eq!(next(from, false), at(expected), "from {from}");
        }
    }

    /// `count` consecutive runs in London, the first allowed to be `from` itself.
    fn chain(expr: &str, from: &str, direction: Direction, count: usize) -> Vec<DateTime<FixedOffset>> {
        let schedule = Schedule::parse(expr).unwrap();
        let mut cursor = at(from).with_timezone(&London);
        let mut found = Vec::with_capacity(count);
        for index in 0..count {
            let request = Request { nth: 0, allow_current: index == 0, direction };
            cursor = search(&schedule, &cursor, London, request, &Options::default()).result.unwrap();
            found.push(cursor.fixed_offset());
        }
        found
    }

    fn all_at(texts: &[&str]) -> Vec<DateTime<FixedOffset>> {
        texts.iter().map(|text| at(text)).collect()
    }

    #[test]
    fn wildcard_hours_fire_in_both_occurrences_of_the_repeated_hour() {
        assert_eq!(
            chain("0 * * * *", "2020-10-25 00:00+01:00", Direction::Forward, 4),
            all_at(&["2020-10-25 00:00+01:00", "2020-10-25 01:00+01:00", "2020-10-25 01:00+00:00", "2020-10-25 02:00+00:00"])
        );
        assert_eq!(
            chain("*/15 * * * *", "2020-10-25 01:30+01:00", Direction::Forward, 4),
            all_at(&["2020-10-25 01:30+01:00", "2020-10-25 01:45+01:00", "2020-10-25 01:00+00:00", "2020-10-25 01:15+00:00"])
        );
        assert_eq!(
            chain("0 * * * *", "2020-10-25 02:30+00:00", Direction::Backward, 3),
            all_at(&["2020-10-25 02:00+00:00", "2020-10-25 01:00+00:00", "2020-10-25 01:00+01:00"])
        );
    }

    #[test]
    fn fixed_hour_fires_once_in_the_repeated_hour_going_backward() {
        assert_eq!(previous("2020-10-25 03:00+00:00"), at("2020-10-25 01:00+00:00"));
        assert_eq!(previous("2020-10-25 01:00+00:00"), at("2020-10-18 01:00+01:00"));
    }

    #[test]
    fn minute_target_inside_the_skipped_hour_fires_after_the_jump() {
        let found = find("30 1 * * *", "2021-03-27 12:00+00:00", Direction::Forward, false).unwrap();
        assert_eq!(found.fixed_offset(), at("2021-03-28 02:30+01:00"));
        let found = find("30 1 * * *", "2021-03-28 12:00+01:00", Direction::Backward, false).unwrap();
        assert_eq!(found.fixed_offset(), at("2021-03-28 02:30+01:00"));
    }

    #[test]
    fn sub_minute_start_never_returns_its_own_minute() {
        let schedule = Schedule::parse("* * * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2021, 6, 1, 10, 0, 30).unwrap();
        let request = Request { nth: 0, allow_current: true, direction: Direction::Forward };
        let found = search(&schedule, &from, chrono_tz::UTC, request, &Options::default()).result.unwrap();
        assert_eq!(found, Utc.with_ymd_and_hms(2021, 6, 1, 10, 1, 0).unwrap());
    }

    #[test]
    fn previous_from_a_sub_minute_start_is_found() {
        let schedule = Schedule::parse("0 * * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2021, 3, 28, 14, 55, 3).unwrap();
        let request = Request { nth: 0, allow_current: false, direction: Direction::Backward };
        let found = search(&schedule, &from, London, request, &Options::default()).result.unwrap();
        assert_eq!(found.fixed_offset(), at("2021-03-28 15:00+01:00"));
    }

    #[test]
    fn nth_skips_matches() {
        let schedule = Schedule::parse("0 */6 * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2021, 6, 1, 1, 0, 0).unwrap();
        let request = Request { nth: 2, allow_current: false, direction: Direction::Forward };
        let found = search(&schedule, &from, chrono_tz::UTC, request, &Options::default()).result.unwrap();
        assert_eq!(found, Utc.with_ymd_and_hms(2021, 6, 1, 18, 0, 0).unwrap());
    }

    #[test]
    fn impossible_schedule_exhausts() {
        let schedule = Schedule::parse("0 0 31 2 *").unwrap();
        let from = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let request = Request { nth: 0, allow_current: false, direction: Direction::Forward };
        let options = Options { max_iterations: 200 };
        let report = search(&schedule, &from, chrono_tz::UTC, request, &options);
        assert_eq!(report.result, Err(SearchError::Exhausted { iterations: 200 }));
        assert_eq!(report.metrics.iterations, 200);
        assert!(report.metrics.month_steps > 0);
    }

    #[test]
    fn metrics_count_offset_changes() {
        let schedule = Schedule::parse("0 1 * * 0").unwrap();
        let request = Request { nth: 0, allow_current: true, direction: Direction::Forward };
        let report = search(&schedule, &at("2021-03-21 02:00+00:00"), London, request, &Options::default());
        assert_eq!(report.metrics.offset_changes, 1);
        assert_eq!(report.metrics.iterations, report.metrics.mutations() + 1);
    }
}
