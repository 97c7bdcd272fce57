//! Cron field parser.
//!
//! Turns the text of one cron field into a [`FieldSpec`]. All validation
//! happens here so the search never sees an out-of-range or contradictory
//! value.
//!
//! ```text
//! item   := "*" ["/" step]
//!         | value ["-" value] ["/" step]
//! value  := digits | alias            (JAN..DEC, SUN..SAT, any case)
//! field  := item ("," item)*
//!         | "?" | "L" | value "W"     (day-of-month)
//!         | "?" | value "#" n | value "L"  (day-of-week)
//! ```
//!
//! `N/S` runs from N to the end of the field's range. Wildcards and the
//! special day tokens stand alone; they are rejected inside a list.

use crate::ParseError;
use crate::field::{FieldKind, FieldSpec, Tokens, ValueSet};

/// Parse the text of a single field.
pub(crate) fn parse_field(kind: FieldKind, text: &str) -> Result<FieldSpec, ParseError> {
    if text.is_empty() {
        return Err(ParseError::Empty { kind });
    }

    let upper = text.to_ascii_uppercase();
    match upper.as_str() {
        "*" => return Ok(FieldSpec::Wildcard),
        "?" if kind.tokens().contains(Tokens::UNCONSTRAINED) => return Ok(FieldSpec::Unconstrained),
        "?" => return Err(ParseError::UnsupportedToken { kind, token: text.to_string() }),
        _ => {}
    }

    if upper.contains(',') {
        let mut set = ValueSet::empty();
        for item in upper.split(',') {
            if item.is_empty() {
                return Err(ParseError::Malformed { kind, item: text.to_string() });
            }
            if item.starts_with('*') || item == "?" || special(kind, item)?.is_some() {
                return Err(ParseError::NotListable { kind, item: item.to_string() });
            }
            for value in parse_item(kind, item)?.iter() {
                set.insert(value);
            }
        }
        return Ok(FieldSpec::Values(set));
    }

    if let Some(spec) = special(kind, &upper)? {
        return Ok(spec);
    }

    Ok(FieldSpec::Values(parse_item(kind, &upper)?))
}

/// Recognise the day-field directives (`L`, `NW`, `N#M`, `NL`).
///
/// Returns `Ok(None)` when `item` is not a directive this kind accepts.
fn special(kind: FieldKind, item: &str) -> Result<Option<FieldSpec>, ParseError> {
    let tokens = kind.tokens();

    if kind == FieldKind::DayOfMonth {
        if tokens.contains(Tokens::LAST) && item == "L" {
            return Ok(Some(FieldSpec::LastDayOfMonth));
        }
        if tokens.contains(Tokens::NEAREST_WEEKDAY) {
            if let Some(caps) = regex!(r"^([0-9]+)W$").captures(item) {
                return Ok(Some(FieldSpec::NearestWeekday(value(kind, &caps[1])?)));
            }
        }
    }

    if kind == FieldKind::DayOfWeek {
        if tokens.contains(Tokens::NTH) {
            if let Some(caps) = regex!(r"^([0-9A-Z]+)#([0-9]+)$").captures(item) {
                let weekday = weekday(&caps[1])?;
                let nth = caps[2].parse::<u32>().map_err(|_| ParseError::Malformed { kind, item: item.to_string() })?;
                if !(1..=5).contains(&nth) {
                    return Err(ParseError::InvalidOccurrence(nth));
                }
                return Ok(Some(FieldSpec::NthWeekday { weekday, nth }));
            }
        }
        if tokens.contains(Tokens::LAST) {
            if let Some(caps) = regex!(r"^([0-9A-Z]+)L$").captures(item) {
                return Ok(Some(FieldSpec::LastWeekday(weekday(&caps[1])?)));
            }
        }
    }

    Ok(None)
}

/// Expand one list item (`*`, `*/S`, `N`, `N-M`, `N-M/S`, `N/S`).
fn parse_item(kind: FieldKind, item: &str) -> Result<ValueSet, ParseError> {
    let malformed = || ParseError::Malformed { kind, item: item.to_string() };
    let caps = regex!(r"^(?:(\*)|([0-9A-Z]+)(?:-([0-9A-Z]+))?)(?:/([0-9]+))?$").captures(item).ok_or_else(malformed)?;
    let (min, max) = kind.range();

    let step = match caps.get(4) {
        Some(m) => match m.as_str().parse::<u32>() {
            Ok(step) if step > 0 => Some(step),
            _ => return Err(ParseError::InvalidStep { kind, item: item.to_string() }),
        },
        None => None,
    };

    let (start, end) = if caps.get(1).is_some() {
        (min, max)
    } else {
        let start = value(kind, &caps[2])?;
        match caps.get(3) {
            Some(m) => {
                let mut end = value(kind, m.as_str())?;
                // `6-0`: Sunday written as the end of a weekday range.
                if kind == FieldKind::DayOfWeek && end == 0 && start > 0 {
                    end = 7;
                }
                if end < start {
                    return Err(ParseError::InvalidRange { kind, start, end });
                }
                (start, end)
            }
            None if step.is_some() => (start, max),
            None => (start, start),
        }
    };

    let fold = |v: u32| if kind == FieldKind::DayOfWeek { v % 7 } else { v };
    Ok((start..=end).step_by(step.unwrap_or(1) as usize).map(fold).collect())
}

/// Resolve a number or alias and check it against the field's range.
fn value(kind: FieldKind, token: &str) -> Result<u32, ParseError> {
    let (min, max) = kind.range();
    let value = if token.bytes().all(|b| b.is_ascii_digit()) {
        numeral(kind, token)?
    } else {
        kind.alias(token).ok_or_else(|| ParseError::UnknownValue { kind, token: token.to_string() })?
    };

    if value < min || value > max {
        return Err(ParseError::OutOfRange { kind, value, min, max });
    }
    Ok(value)
}

/// Weekday operand of `#` and `L`: 0-7 (7 is Sunday) or an alias.
fn weekday(token: &str) -> Result<u32, ParseError> {
    if token.bytes().all(|b| b.is_ascii_digit()) {
        let value = numeral(FieldKind::DayOfWeek, token)?;
        if value > 7 {
            return Err(ParseError::InvalidWeekday(value));
        }
        return Ok(value % 7);
    }
    FieldKind::DayOfWeek
        .alias(token)
        .ok_or_else(|| ParseError::UnknownValue { kind: FieldKind::DayOfWeek, token: token.to_string() })
}

/// Digits too long for a `u32` are reported as written.
fn numeral(kind: FieldKind, token: &str) -> Result<u32, ParseError> {
    token.parse::<u32>().map_err(|_| ParseError::Malformed { kind, item: token.to_string() })
}
