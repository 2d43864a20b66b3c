//! Structured literal recognition.
//!
//! The parser hands every word (or `.`/`:`-joined compound word) to
//! [`recognize`], which tries, in order:
//!
//! | Literal | Examples | Result |
//! |---------|----------|--------|
//! | clock time | `7:30`, `07:30`, `23:59:05` | [`Value::Clock`] in the evaluation offset |
//! | duration | `90s`, `5m`, `1h30m`, `250ms`, `2d` | [`Value::Duration`] |
//! | float | `42`, `1_000.5`, `2.5e3` | [`Value::Float`] |
//!
//! Anything else is an opaque label and comes back as [`Value::Str`].

use std::sync::OnceLock;

use chrono::{FixedOffset, NaiveTime, TimeDelta};
use regex::Regex;

use super::value::{ClockTime, Value};

fn clock_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([01]?[0-9]|2[0-3]):([0-5][0-9])(?::([0-5][0-9]))?$")
            .expect("clock-time pattern is valid")
    })
}

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[0-9]+(?:_[0-9]+)*(?:ms|s|m|h|d))+$").expect("duration pattern is valid")
    })
}

fn duration_segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([0-9]+(?:_[0-9]+)*)(ms|s|m|h|d)").expect("duration segment pattern is valid")
    })
}

fn float_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9]+(?:_[0-9]+)*(?:\.[0-9]+(?:_[0-9]+)*)?(?:[eE][+-]?[0-9]+)?$")
            .expect("float pattern is valid")
    })
}

/// Parse a 24-hour `H:MM[:SS]` time of day.
pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    let caps = clock_re().captures(text)?;
    let hour = caps[1].parse().ok()?;
    let minute = caps[2].parse().ok()?;
    let second = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Parse a duration made of one or more `<number><unit>` segments.
///
/// Units are `ms`, `s`, `m`, `h` and `d`.  Returns `None` on overflow.
pub fn parse_duration(text: &str) -> Option<TimeDelta> {
    if !duration_re().is_match(text) {
        return None;
    }
    let mut total = TimeDelta::zero();
    for caps in duration_segment_re().captures_iter(text) {
        let amount: i64 = caps[1].replace('_', "").parse().ok()?;
        let unit_ms: i64 = match &caps[2] {
            "ms" => 1,
            "s" => 1_000,
            "m" => 60_000,
            "h" => 3_600_000,
            _ => 86_400_000,
        };
        let segment = TimeDelta::try_milliseconds(amount.checked_mul(unit_ms)?)?;
        total = total.checked_add(&segment)?;
    }
    Some(total)
}

/// Parse a float, allowing `_` between digit groups.  Literals too large
/// for an `f64` are rejected.
pub fn parse_float(text: &str) -> Option<f64> {
    if !float_re().is_match(text) {
        return None;
    }
    text.replace('_', "")
        .parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
}

/// Whether a single lexer word is a numeric or duration literal.
pub fn is_value_word(text: &str) -> bool {
    parse_float(text).is_some() || parse_duration(text).is_some()
}

/// Recognize a literal, falling back to a string.
pub fn recognize(text: &str, offset: FixedOffset) -> Value {
    if let Some(time) = parse_clock(text) {
        return Value::Clock(ClockTime::new(time, offset));
    }
    if let Some(d) = parse_duration(text) {
        return Value::Duration(d);
    }
    if let Some(x) = parse_float(text) {
        return Value::Float(x);
    }
    Value::Str(text.to_owned())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn clock_times() {
        assert_eq!(parse_clock("07:30"), NaiveTime::from_hms_opt(7, 30, 0));
        assert_eq!(parse_clock("7:30"), NaiveTime::from_hms_opt(7, 30, 0));
        assert_eq!(parse_clock("23:59:05"), NaiveTime::from_hms_opt(23, 59, 5));
        assert_eq!(parse_clock("24:00"), None);
        assert_eq!(parse_clock("12:60"), None);
        assert_eq!(parse_clock("12"), None);
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("90s"), Some(TimeDelta::seconds(90)));
        assert_eq!(parse_duration("5m"), Some(TimeDelta::minutes(5)));
        assert_eq!(parse_duration("1h30m"), Some(TimeDelta::minutes(90)));
        assert_eq!(parse_duration("250ms"), Some(TimeDelta::milliseconds(250)));
        assert_eq!(parse_duration("2d"), Some(TimeDelta::days(2)));
        assert_eq!(parse_duration("1_000s"), Some(TimeDelta::seconds(1000)));
        assert_eq!(parse_duration("5"), None);
        assert_eq!(parse_duration("m5"), None);
        assert_eq!(parse_duration("5x"), None);
        assert_eq!(parse_duration("99999999999999999999d"), None);
    }

    #[test]
    fn floats() {
        assert_eq!(parse_float("42"), Some(42.0));
        assert_eq!(parse_float("1_000.5"), Some(1000.5));
        assert_eq!(parse_float("2.5e3"), Some(2500.0));
        assert_eq!(parse_float("1__0"), None);
        assert_eq!(parse_float("_1"), None);
        assert_eq!(parse_float("1_"), None);
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("nan"), None);
        assert_eq!(parse_float("1e999"), None);
        assert_eq!(parse_float("1e308"), Some(1e308));
    }

    #[test]
    fn recognize_order() {
        assert!(matches!(recognize("07:30", utc()), Value::Clock(_)));
        assert_eq!(recognize("5m", utc()), Value::Duration(TimeDelta::minutes(5)));
        assert_eq!(recognize("1_000.5", utc()), Value::Float(1000.5));
        assert_eq!(recognize("sensor.temp", utc()), Value::from("sensor.temp"));
    }

    #[test]
    fn clock_carries_offset() {
        let plus_one = FixedOffset::east_opt(3600).unwrap();
        let v = recognize("08:00", plus_one);
        assert_eq!(v.as_clock().map(|t| t.offset()), Some(plus_one));
    }

    #[test]
    fn value_words() {
        assert!(is_value_word("1_000"));
        assert!(is_value_word("1h30m"));
        assert!(!is_value_word("abc"));
        assert!(!is_value_word("2nd"));
        assert!(!is_value_word("1e999"));
    }
}
