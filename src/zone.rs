//! Timezone lookups: names, offsets and the transition table.
//!
//! chrono-tz does not expose its transition list, so transitions are found
//! by sampling the UTC offset and bisecting every change down to the second.

use chrono::{DateTime, Offset, TimeZone};
use chrono_tz::Tz;

use crate::ParseError;

/// Sampling stride for the transition scan. Every zone in the IANA database
/// keeps an offset for longer than this between changes.
const SAMPLE_SECONDS: i64 = 6 * 3600;

/// A change of UTC offset in a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Unix timestamp of the first second on the new offset.
    pub at: i64,
    /// Offset from UTC in seconds before `at`.
    pub offset_before: i32,
    /// Offset from UTC in seconds from `at` on.
    pub offset_after: i32,
}

impl Transition {
    /// Signed size of the jump: positive for a gap, negative for a fold.
    pub fn delta(&self) -> i32 {
        self.offset_after - self.offset_before
    }

    pub fn is_gap(&self) -> bool {
        self.delta() > 0
    }
}

/// Look up an IANA zone name such as `Europe/London`.
pub fn parse_zone(name: &str) -> Result<Tz, ParseError> {
    name.trim().parse::<Tz>().map_err(|_| ParseError::UnknownZone(name.to_string()))
}

/// UTC offset in seconds in effect at a Unix timestamp.
pub(crate) fn offset_at(zone: Tz, timestamp: i64) -> i32 {
    let utc = DateTime::from_timestamp(timestamp, 0).unwrap_or_default();
    zone.offset_from_utc_datetime(&utc.naive_utc()).fix().local_minus_utc()
}

/// All transitions with `from < at <= to`, in ascending order.
pub(crate) fn transitions(zone: Tz, from: i64, to: i64) -> Vec<Transition> {
    let mut found = Vec::new();
    let mut cursor = from;
    let mut current = offset_at(zone, cursor);

    while cursor < to {
        let next = (cursor + SAMPLE_SECONDS).min(to);
        let offset = offset_at(zone, next);
        if offset != current {
            let (mut lo, mut hi) = (cursor, next);
            while hi - lo > 1 {
                let mid = lo + (hi - lo) / 2;
                if offset_at(zone, mid) == current {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            found.push(Transition { at: hi, offset_before: current, offset_after: offset_at(zone, hi) });
        }
        current = offset;
        cursor = next;
    }

    found
}
