//! Field kinds and the parsed per-field value model.

use std::fmt;

/// The five positions of a cron expression, coarsest last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

bitflags::bitflags! {
    /// Special tokens a field kind accepts on top of the common grammar.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Tokens: u8 {
        /// `L` (day-of-month) or `NL` (day-of-week).
        const LAST            = 1 << 0;
        /// `NW`, nearest weekday to day N.
        const NEAREST_WEEKDAY = 1 << 1;
        /// `N#M`, Mth occurrence of weekday N.
        const NTH             = 1 << 2;
        /// `?`, defer to the other day field.
        const UNCONSTRAINED   = 1 << 3;
    }
}

const MONTH_ALIASES: [&str; 12] = ["JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC"];
const WEEKDAY_ALIASES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

impl FieldKind {
    /// Positional order of an expression.
    pub const ALL: [FieldKind; 5] =
        [FieldKind::Minute, FieldKind::Hour, FieldKind::DayOfMonth, FieldKind::Month, FieldKind::DayOfWeek];

    /// Inclusive `(rangeStart, rangeEnd)` accepted by the parser.
    ///
    /// Day-of-week accepts 7 as an alias of Sunday (0).
    pub fn range(self) -> (u32, u32) {
        match self {
            FieldKind::Minute => (0, 59),
            FieldKind::Hour => (0, 23),
            FieldKind::DayOfMonth => (1, 31),
            FieldKind::Month => (1, 12),
            FieldKind::DayOfWeek => (0, 7),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Minute => "minute",
            FieldKind::Hour => "hour",
            FieldKind::DayOfMonth => "day-of-month",
            FieldKind::Month => "month",
            FieldKind::DayOfWeek => "day-of-week",
        }
    }

    pub(crate) fn tokens(self) -> Tokens {
        match self {
            FieldKind::DayOfMonth => Tokens::LAST | Tokens::NEAREST_WEEKDAY | Tokens::UNCONSTRAINED,
            FieldKind::DayOfWeek => Tokens::LAST | Tokens::NTH | Tokens::UNCONSTRAINED,
            FieldKind::Minute | FieldKind::Hour | FieldKind::Month => Tokens::empty(),
        }
    }

    /// Resolve a case-insensitive three-letter alias (`JAN`, `mon`, ...).
    pub(crate) fn alias(self, token: &str) -> Option<u32> {
        let (table, first): (&[&str], u32) = match self {
            FieldKind::Month => (&MONTH_ALIASES, 1),
            FieldKind::DayOfWeek => (&WEEKDAY_ALIASES, 0),
            _ => return None,
        };
        table.iter().position(|a| a.eq_ignore_ascii_case(token)).map(|idx| idx as u32 + first)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// --- Value sets -----------------------------------------------------------------

/// Ascending set of field values, stored as a bitmask (every range fits in 64 bits).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ValueSet(u64);

impl ValueSet {
    pub fn empty() -> Self {
        ValueSet(0)
    }

    pub(crate) fn insert(&mut self, value: u32) {
        if value < 64 {
            self.0 |= 1 << value;
        }
    }

    pub fn contains(&self, value: u32) -> bool {
        value < 64 && self.0 & (1 << value) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn first(&self) -> Option<u32> {
        (!self.is_empty()).then(|| self.0.trailing_zeros())
    }

    pub fn last(&self) -> Option<u32> {
        (!self.is_empty()).then(|| 63 - self.0.leading_zeros())
    }

    /// Smallest member strictly greater than `value`.
    pub fn next_after(&self, value: u32) -> Option<u32> {
        if value >= 63 {
            return None;
        }
        ValueSet(self.0 >> (value + 1) << (value + 1)).first()
    }

    /// Largest member strictly smaller than `value`.
    pub fn prev_before(&self, value: u32) -> Option<u32> {
        let mask = if value >= 64 { u64::MAX } else { (1u64 << value) - 1 };
        ValueSet(self.0 & mask).last()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..64).filter(move |v| self.contains(*v))
    }
}

impl FromIterator<u32> for ValueSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = ValueSet::empty();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl fmt::Debug for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

// --- Field specs ----------------------------------------------------------------

/// One parsed cron field.
///
/// Weekdays are numbered from Sunday = 0; a parsed `7` is already folded into 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// `*`: every value in range.
    Wildcard,
    /// Concrete values from numbers, ranges, steps and lists.
    Values(ValueSet),
    /// `L` in day-of-month: the last calendar day.
    LastDayOfMonth,
    /// `NW`: the weekday (Mon–Fri) nearest to day N, without leaving the month.
    NearestWeekday(u32),
    /// `N#M`: the Mth occurrence of weekday N in the month.
    NthWeekday { weekday: u32, nth: u32 },
    /// `NL` in day-of-week: the last occurrence of weekday N in the month.
    LastWeekday(u32),
    /// `?`: no constraint, defer to the other day field.
    Unconstrained,
}

impl FieldSpec {
    /// True when the field narrows the day set (used for vixie-cron OR semantics).
    pub fn is_restricted(&self) -> bool {
        !matches!(self, FieldSpec::Wildcard | FieldSpec::Unconstrained)
    }
}
