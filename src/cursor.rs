//! The DST-safe calendar cursor.
//!
//! A [`CalendarMoment`] is one wall-clock minute bound to a zone and a travel
//! direction. Every mutation moves the underlying instant strictly in that
//! direction, whatever the local clock does around a transition:
//!
//! ```text
//!   relative steps  (±1 minute, ±1 hour, "N minutes on")
//!       └─ instant arithmetic, the wall clock follows
//!   absolute targets (a given hour, the next day at 00:00, ...)
//!       └─ resolve the wall time in the zone
//!            gap   → read with the offset in force before the jump
//!            fold  → the later reading if it lies ahead, else the earlier
//!       └─ progress guard: strictly beyond the origin, or retry one unit on
//! ```
//!
//! Each mutation records `last_offset_change`, the UTC offset after minus the
//! offset before, and the [`Grain`] it worked in, so matchers can tell a
//! mutation crossed a transition and whether it aimed at their own field.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::Direction;
use crate::calendar;
use crate::zone::{self, Transition};

const DAY_SECONDS: i64 = 86_400;
/// How far the cached transition window reaches in the travel direction.
const WINDOW_AHEAD: i64 = 365 * DAY_SECONDS;
/// How far it reaches against the travel direction.
const WINDOW_BEHIND: i64 = 2 * DAY_SECONDS;
/// Recompute the window once the cursor gets this close to an edge.
const WINDOW_MARGIN: i64 = DAY_SECONDS;

#[derive(Debug, Clone)]
struct TransitionWindow {
    from: i64,
    to: i64,
    transitions: Vec<Transition>,
}

/// Calendar unit a cursor mutation worked in, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grain {
    Minute,
    Hour,
    Day,
    Month,
}

/// Mutable search position. Owned by exactly one search.
#[derive(Debug, Clone)]
pub struct CalendarMoment {
    moment: DateTime<Tz>,
    direction: Direction,
    last_offset_change: i32,
    last_grain: Option<Grain>,
    truncated: bool,
    window: Option<TransitionWindow>,
}

impl CalendarMoment {
    /// Bind `from` to `zone`, truncated to the start of its minute.
    pub fn new<Z: TimeZone>(from: &DateTime<Z>, zone: Tz, direction: Direction) -> Self {
        let utc = from.with_timezone(&Utc);
        let seconds = utc.timestamp();
        let whole_minute = seconds - seconds.rem_euclid(60);
        let truncated = whole_minute != seconds || utc.timestamp_subsec_nanos() != 0;
        let start = DateTime::from_timestamp(whole_minute, 0).unwrap_or(utc);

        CalendarMoment {
            moment: start.with_timezone(&zone),
            direction,
            last_offset_change: 0,
            last_grain: None,
            truncated,
            window: None,
        }
    }

    /// The current position as a zoned instant.
    pub fn instant(&self) -> DateTime<Tz> {
        self.moment
    }

    /// Local wall-clock reading of the current position.
    pub fn wall(&self) -> NaiveDateTime {
        self.moment.naive_local()
    }

    pub fn zone(&self) -> Tz {
        self.moment.timezone()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// UTC offset in seconds at the current position.
    pub fn offset_seconds(&self) -> i32 {
        self.moment.offset().fix().local_minus_utc()
    }

    /// Offset after minus offset before, for the most recent mutation.
    pub fn last_offset_change(&self) -> i32 {
        self.last_offset_change
    }

    /// Unit of the most recent mutation; `None` until the cursor first moves.
    pub fn last_grain(&self) -> Option<Grain> {
        self.last_grain
    }

    /// The wall time with the most recent offset change undone: what the
    /// clock would read had the last mutation not crossed a transition.
    ///
    /// One minute after 01:59 BST on a fall-back day the clock reads 01:00
    /// GMT; this reads 02:00.
    pub fn unshifted_wall(&self) -> NaiveDateTime {
        self.wall() - Duration::seconds(i64::from(self.last_offset_change))
    }

    /// True when the starting instant carried seconds that were dropped.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    /// The latest transition at or before the current position, if one falls
    /// inside the cached window.
    ///
    /// The window is lopsided: it reaches a year in the travel direction but
    /// only two days against it, recomputed once the cursor comes within a
    /// day of either edge. A forward cursor therefore sees transitions it
    /// has just walked over, not ones from months before its start; a
    /// backward cursor sees the year behind it.
    pub fn past_transition(&mut self) -> Option<Transition> {
        let now = self.moment.timestamp();
        let stale = match &self.window {
            Some(window) => now < window.from + WINDOW_MARGIN || now > window.to - WINDOW_MARGIN,
            None => true,
        };
        if stale {
            let (from, to) = match self.direction {
                Direction::Forward => (now - WINDOW_BEHIND, now + WINDOW_AHEAD),
                Direction::Backward => (now - WINDOW_AHEAD, now + WINDOW_BEHIND),
            };
            tracing::trace!(target: "cronwalk::cursor", from, to, "refreshing transition window");
            self.window = Some(TransitionWindow { from, to, transitions: zone::transitions(self.zone(), from, to) });
        }

        self.window.as_ref()?.transitions.iter().rev().find(|t| t.at <= now).copied()
    }

    /// The wall time that a clock which did not jump forward would show.
    ///
    /// Inside the first `delta` seconds after a gap the wall clock reads
    /// ahead of the skipped local times; the shadow reads them instead, so a
    /// schedule aimed at a skipped hour still matches the instant it moved to.
    pub fn gap_shadow(&mut self) -> Option<NaiveDateTime> {
        let now = self.moment.timestamp();
        let transition = self.past_transition()?;
        let delta = i64::from(transition.delta());
        (delta > 0 && now < transition.at + delta).then(|| self.wall() - Duration::seconds(delta))
    }

    // --- Relative steps ------------------------------------------------------

    pub fn increment_minute(&mut self) {
        let next = self.moment + Duration::minutes(self.direction.sign());
        self.commit(next, Grain::Minute);
    }

    /// One hour on, snapped to minute 0 (forward) or 59 (backward).
    pub fn increment_hour(&mut self) {
        let origin = self.moment;
        let next = match self.direction {
            Direction::Forward => {
                let stepped = origin + Duration::hours(1);
                let snapped = stepped - Duration::minutes(i64::from(stepped.minute()));
                if snapped > origin { snapped } else { snapped + Duration::hours(1) }
            }
            Direction::Backward => {
                let stepped = origin - Duration::hours(1);
                let snapped = stepped + Duration::minutes(59 - i64::from(stepped.minute()));
                if snapped < origin { snapped } else { snapped - Duration::hours(1) }
            }
        };
        self.commit(next, Grain::Hour);
    }

    /// Next day at 00:00 (forward) or previous day at 23:59 (backward).
    pub fn increment_day(&mut self) {
        let date = self.wall().date();
        match calendar::step_day(date, self.direction.sign()) {
            Some(day) => self.land(day.and_time(self.day_edge()), Duration::days(1), Grain::Day),
            None => self.stall("day"),
        }
    }

    /// First of the next month at 00:00, or last of the previous at 23:59.
    pub fn increment_month(&mut self) {
        let date = self.wall().date();
        let target = match self.direction {
            Direction::Forward => calendar::first_of_next_month(date),
            Direction::Backward => calendar::last_of_previous_month(date),
        };
        match target {
            Some(day) => self.land(day.and_time(self.day_edge()), Duration::days(1), Grain::Month),
            None => self.stall("month"),
        }
    }

    // --- Absolute targets ----------------------------------------------------

    /// Move to wall hour `hour`, rolling the day when the target is not
    /// ahead of the current hour in the travel direction.
    pub fn set_hour(&mut self, hour: u32) {
        let wall = self.wall();
        let roll = match self.direction {
            Direction::Forward => wall.hour() >= hour,
            Direction::Backward => wall.hour() <= hour,
        };
        let date = if roll { calendar::step_day(wall.date(), self.direction.sign()) } else { Some(wall.date()) };
        let minute = if self.direction.is_backward() { 59 } else { 0 };

        match (date, NaiveTime::from_hms_opt(hour, minute, 0)) {
            (Some(date), Some(time)) => self.land(date.and_time(time), Duration::days(1), Grain::Hour),
            _ => self.stall("hour"),
        }
    }

    /// Move to the next wall minute `minute`, rolling the hour when needed.
    ///
    /// The distance is walked on the instant, so a repeated hour is entered
    /// rather than jumped: 01:45 BST on a fall-back day rolls to 01:00 GMT.
    pub fn set_minutes(&mut self, minute: u32) {
        let current = i64::from(self.wall().minute());
        let target = i64::from(minute);
        let distance = match self.direction {
            Direction::Forward => (target - current).rem_euclid(60),
            Direction::Backward => (current - target).rem_euclid(60),
        };
        let distance = if distance == 0 { 60 } else { distance };
        let next = self.moment + Duration::minutes(distance * self.direction.sign());
        self.commit(next, Grain::Minute);
    }

    // --- Internals -----------------------------------------------------------

    fn day_edge(&self) -> NaiveTime {
        match self.direction {
            Direction::Forward => NaiveTime::default(),
            Direction::Backward => NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default(),
        }
    }

    fn beyond(&self, candidate: &DateTime<Tz>, origin: &DateTime<Tz>) -> bool {
        match self.direction {
            Direction::Forward => candidate > origin,
            Direction::Backward => candidate < origin,
        }
    }

    /// Resolve a wall time in the bound zone against `origin`.
    fn resolve(&self, wall: NaiveDateTime, origin: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let zone = self.zone();
        match zone.from_local_datetime(&wall) {
            LocalResult::Single(at) => Some(at),
            LocalResult::Ambiguous(early, late) => Some(if self.beyond(&late, origin) { late } else { early }),
            LocalResult::None => {
                let naive_seconds = wall.and_utc().timestamp();
                let before = zone::offset_at(zone, naive_seconds - DAY_SECONDS);
                let at = DateTime::from_timestamp(naive_seconds - i64::from(before), 0)?;
                Some(at.with_timezone(&zone))
            }
        }
    }

    /// Land on a wall-clock target, keeping the instant moving.
    ///
    /// A target that resolves at or behind the origin is retried once,
    /// `retreat` further along; past that the cursor creeps one minute.
    fn land(&mut self, target: NaiveDateTime, retreat: Duration, grain: Grain) {
        let origin = self.moment;
        let retry = target + retreat * self.direction.sign() as i32;

        let landed = self
            .resolve(target, &origin)
            .filter(|at| self.beyond(at, &origin))
            .or_else(|| self.resolve(retry, &origin).filter(|at| self.beyond(at, &origin)));

        match landed {
            Some(at) => self.commit(at, grain),
            None => {
                tracing::warn!(
                    target: "cronwalk::cursor",
                    %origin,
                    wall = %target,
                    "wall-clock target made no progress, stepping one minute"
                );
                self.commit(origin + Duration::minutes(self.direction.sign()), Grain::Minute);
            }
        }
    }

    fn stall(&mut self, unit: &str) {
        tracing::warn!(target: "cronwalk::cursor", unit, moment = %self.moment, "calendar overflow, stepping one minute");
        let next = self.moment + Duration::minutes(self.direction.sign());
        self.commit(next, Grain::Minute);
    }

    /// Move to `next` and record the offset change the move produced.
    fn commit(&mut self, next: DateTime<Tz>, grain: Grain) {
        self.last_offset_change = 0;
        let before = self.offset_seconds();
        self.moment = next;
        self.last_grain = Some(grain);
        self.last_offset_change = self.offset_seconds() - before;
        tracing::trace!(
            target: "cronwalk::cursor",
            moment = %self.moment,
            offset_change = self.last_offset_change,
            grain = ?grain,
            "cursor moved"
        );
    }
}
