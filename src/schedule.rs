use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

use crate::engine::Runs;
use crate::field::{FieldKind, FieldSpec};
use crate::parse::parse_field;
use crate::{Direction, Options, ParseError};

/// Predefined schedules accepted in place of the five fields.
const MACROS: [(&str, &str); 7] = [
    ("@yearly", "0 0 1 1 *"),
    ("@annually", "0 0 1 1 *"),
    ("@monthly", "0 0 1 * *"),
    ("@weekly", "0 0 * * 0"),
    ("@daily", "0 0 * * *"),
    ("@midnight", "0 0 * * *"),
    ("@hourly", "0 * * * *"),
];

/// A parsed cron expression. Immutable and cheap to share between searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    fields: [FieldSpec; 5],
    source: String,
}

impl Schedule {
    /// Parse five whitespace-separated fields, or one of the `@` macros.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let source = text.trim();
        let expanded = if source.starts_with('@') {
            MACROS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(source))
                .map(|(_, expr)| *expr)
                .ok_or_else(|| ParseError::UnknownMacro(source.to_string()))?
        } else {
            source
        };

        let parts: Vec<&str> = expanded.split_whitespace().collect();
        if parts.len() != FieldKind::ALL.len() {
            return Err(ParseError::FieldCount { found: parts.len(), text: source.to_string() });
        }

        let [minute, hour, day_of_month, month, day_of_week] = [0, 1, 2, 3, 4].map(|i| parse_field(FieldKind::ALL[i], parts[i]));
        Ok(Schedule { fields: [minute?, hour?, day_of_month?, month?, day_of_week?], source: source.to_string() })
    }

    /// True when `text` parses.
    pub fn is_valid(text: &str) -> bool {
        Self::parse(text).is_ok()
    }

    pub fn field(&self, kind: FieldKind) -> &FieldSpec {
        &self.fields[position(kind)]
    }

    /// The text this schedule was parsed from, trimmed.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Lazily walk successive run dates from `from`, exclusive, in `direction`.
    pub fn runs<Z: TimeZone>(&self, from: &DateTime<Z>, zone: Tz, direction: Direction) -> Runs<'_> {
        Runs::new(self, from, zone, direction, Options::default())
    }
}

fn position(kind: FieldKind) -> usize {
    match kind {
        FieldKind::Minute => 0,
        FieldKind::Hour => 1,
        FieldKind::DayOfMonth => 2,
        FieldKind::Month => 3,
        FieldKind::DayOfWeek => 4,
    }
}

impl FromStr for Schedule {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Schedule::parse(s)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
