use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

use super::{Request, search};
use crate::{Direction, Options, Schedule};

/// Successive run dates of a schedule, each search starting from the last hit.
///
/// The iterator ends when a search exhausts its iteration bound.
#[derive(Debug, Clone)]
pub struct Runs<'a> {
    schedule: &'a Schedule,
    zone: Tz,
    direction: Direction,
    options: Options,
    from: Option<DateTime<Tz>>,
}

impl<'a> Runs<'a> {
    pub(crate) fn new<Z: TimeZone>(
        schedule: &'a Schedule,
        from: &DateTime<Z>,
        zone: Tz,
        direction: Direction,
        options: Options,
    ) -> Self {
        Runs { schedule, zone, direction, options, from: Some(from.with_timezone(&zone)) }
    }
}

impl Iterator for Runs<'_> {
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        let from = self.from.take()?;
        let request = Request { nth: 0, allow_current: false, direction: self.direction };
        let found = search(self.schedule, &from, self.zone, request, &self.options).result.ok()?;
        self.from = Some(found);
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn walks_forward_and_backward() {
        let schedule = Schedule::parse("30 9 * * MON-FRI").unwrap();
        // 2021-06-04 is a Friday.
        let from = Utc.with_ymd_and_hms(2021, 6, 4, 12, 0, 0).unwrap();

        let ahead: Vec<_> = schedule.runs(&from, chrono_tz::UTC, Direction::Forward).take(2).collect();
        assert_eq!(
            ahead,
            vec![Utc.with_ymd_and_hms(2021, 6, 7, 9, 30, 0).unwrap(), Utc.with_ymd_and_hms(2021, 6, 8, 9, 30, 0).unwrap()]
        );

        let behind: Vec<_> = schedule.runs(&from, chrono_tz::UTC, Direction::Backward).take(2).collect();
        assert_eq!(
            behind,
            vec![Utc.with_ymd_and_hms(2021, 6, 4, 9, 30, 0).unwrap(), Utc.with_ymd_and_hms(2021, 6, 3, 9, 30, 0).unwrap()]
        );
    }

    #[test]
    fn stops_on_an_impossible_schedule() {
        let schedule = Schedule::parse("0 0 30 2 *").unwrap();
        let from = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(schedule.runs(&from, chrono_tz::UTC, Direction::Forward).count(), 0);
    }
}
