//! Runtime value type for confex scripts.
//!
//! Scripts produce numbers, durations, times of day and strings.  Lookups
//! into the evaluation context can additionally yield nested maps or the
//! absent value.  Arithmetic is strict: only the combinations listed on
//! [`Value::apply`] are defined, everything else is a runtime error.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{FixedOffset, NaiveTime, TimeDelta, Timelike};

use crate::error::RuntimeError;
use super::parser::ArithOp;

// ── ClockTime ─────────────────────────────────────────────────────────────────

/// A time of day written in a particular UTC offset.
///
/// `min`/`max` order clock times by the instant they denote, so `07:30`
/// written at `+02:00` ties with `05:30` written at UTC.  Equality is
/// field-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockTime {
    time: NaiveTime,
    offset: FixedOffset,
}

impl ClockTime {
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        ClockTime { time, offset }
    }

    /// Build from wall-clock fields; `None` if any field is out of range.
    pub fn from_hms(hour: u32, minute: u32, second: u32, offset: FixedOffset) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, second).map(|time| ClockTime { time, offset })
    }

    /// Local wall-clock time.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The same instant expressed as a UTC time of day (wraps around midnight).
    pub fn to_utc(&self) -> NaiveTime {
        self.time - TimeDelta::seconds(i64::from(self.offset.local_minus_utc()))
    }

    /// Shift by `delta`, wrapping around midnight.
    pub fn shifted(&self, delta: TimeDelta) -> Self {
        let (time, _) = self.time.overflowing_add_signed(delta);
        ClockTime { time, ..*self }
    }

    /// Signed distance from `earlier` to `self`, offsets taken into account.
    pub fn since(&self, earlier: &ClockTime) -> TimeDelta {
        self.to_utc().signed_duration_since(earlier.to_utc())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.time.second() == 0 {
            write!(f, "{:02}:{:02}", self.time.hour(), self.time.minute())
        } else {
            write!(
                f,
                "{:02}:{:02}:{:02}",
                self.time.hour(),
                self.time.minute(),
                self.time.second()
            )
        }
    }
}

// ── Value ─────────────────────────────────────────────────────────────────────

/// A confex runtime value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Result of a `lookup` that found nothing.
    #[default]
    Null,
    Float(f64),
    Duration(TimeDelta),
    Clock(ClockTime),
    Str(String),
    Map(BTreeMap<String, Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Float(x) => {
                // Integral values print without a fractional part.
                if x.fract() == 0.0 && x.abs() < 1e15 {
                    write!(f, "{x:.0}")
                } else {
                    write!(f, "{x}")
                }
            }
            Value::Duration(d) => fmt_duration(f, *d),
            Value::Clock(t) => write!(f, "{t}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// `1h30m`, `250ms`, `-5s`; zero prints as `0s`.
fn fmt_duration(f: &mut fmt::Formatter<'_>, d: TimeDelta) -> fmt::Result {
    if d.is_zero() {
        return write!(f, "0s");
    }
    if d < TimeDelta::zero() {
        write!(f, "-")?;
    }
    let total_ms = d.num_milliseconds().unsigned_abs();
    let parts = [
        (total_ms / 86_400_000, "d"),
        (total_ms / 3_600_000 % 24, "h"),
        (total_ms / 60_000 % 60, "m"),
        (total_ms / 1_000 % 60, "s"),
        (total_ms % 1_000, "ms"),
    ];
    for (n, unit) in parts {
        if n > 0 {
            write!(f, "{n}{unit}")?;
        }
    }
    Ok(())
}

impl Value {
    /// Name of the type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Float(_) => "float",
            Value::Duration(_) => "duration",
            Value::Clock(_) => "time",
            Value::Str(_) => "string",
            Value::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<TimeDelta> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_clock(&self) -> Option<ClockTime> {
        match self {
            Value::Clock(t) => Some(*t),
            _ => None,
        }
    }

    /// Member of a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Convert a JSON document into a value.
    ///
    /// Booleans become `1`/`0` and arrays become maps keyed by index, since
    /// the language has neither type.
    pub fn from_json(json: &serde_json::Value) -> Value {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Float(if *b { 1.0 } else { 0.0 }),
            Json::Number(n) => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::Str(s.clone()),
            Json::Array(items) => Value::Map(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), Value::from_json(v)))
                    .collect(),
            ),
            Json::Object(obj) => Value::Map(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    // ── Arithmetic helpers ────────────────────────────────────────────────────

    fn mismatch(&self, op: ArithOp, rhs: &Value) -> RuntimeError {
        RuntimeError::TypeMismatch {
            op: op.symbol().to_string(),
            left: self.type_name(),
            right: rhs.type_name(),
        }
    }

    /// Apply a binary operator.
    ///
    /// | left | op | right | result |
    /// |------|----|-------|--------|
    /// | float | `+ - * /` | float | float |
    /// | string | `+` | string | string |
    /// | duration | `+ -` | duration | duration |
    /// | duration | `* /` | float | duration |
    /// | float | `*` | duration | duration |
    /// | duration | `/` | duration | float |
    /// | time | `+ -` | duration | time |
    /// | time | `-` | time | duration |
    pub fn apply(&self, op: ArithOp, rhs: &Value) -> Result<Value, RuntimeError> {
        match op {
            ArithOp::Add => self.arith_add(rhs),
            ArithOp::Sub => self.arith_sub(rhs),
            ArithOp::Mul => self.arith_mul(rhs),
            ArithOp::Div => self.arith_div(rhs),
        }
    }

    pub fn arith_add(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        let op = ArithOp::Add;
        match (self, rhs) {
            (Value::Float(a), Value::Float(b)) => finite(a + b, op),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            (Value::Duration(a), Value::Duration(b)) => a
                .checked_add(b)
                .map(Value::Duration)
                .ok_or(RuntimeError::OutOfRange(op.symbol())),
            (Value::Clock(t), Value::Duration(d)) => Ok(Value::Clock(t.shifted(*d))),
            _ => Err(self.mismatch(op, rhs)),
        }
    }

    pub fn arith_sub(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        let op = ArithOp::Sub;
        match (self, rhs) {
            (Value::Float(a), Value::Float(b)) => finite(a - b, op),
            (Value::Duration(a), Value::Duration(b)) => a
                .checked_sub(b)
                .map(Value::Duration)
                .ok_or(RuntimeError::OutOfRange(op.symbol())),
            (Value::Clock(t), Value::Duration(d)) => Ok(Value::Clock(t.shifted(-*d))),
            (Value::Clock(a), Value::Clock(b)) => Ok(Value::Duration(a.since(b))),
            _ => Err(self.mismatch(op, rhs)),
        }
    }

    pub fn arith_mul(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        let op = ArithOp::Mul;
        match (self, rhs) {
            (Value::Float(a), Value::Float(b)) => finite(a * b, op),
            (Value::Duration(d), Value::Float(x)) | (Value::Float(x), Value::Duration(d)) => {
                scale_duration(*d, *x, op).map(Value::Duration)
            }
            _ => Err(self.mismatch(op, rhs)),
        }
    }

    pub fn arith_div(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        let op = ArithOp::Div;
        match (self, rhs) {
            (Value::Float(a), Value::Float(b)) => {
                if *b == 0.0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                finite(a / b, op)
            }
            (Value::Duration(d), Value::Float(x)) => {
                if *x == 0.0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                scale_duration(*d, 1.0 / x, op).map(Value::Duration)
            }
            (Value::Duration(a), Value::Duration(b)) => {
                if b.is_zero() {
                    return Err(RuntimeError::DivisionByZero);
                }
                Ok(Value::Float(
                    a.num_milliseconds() as f64 / b.num_milliseconds() as f64,
                ))
            }
            _ => Err(self.mismatch(op, rhs)),
        }
    }

    /// Ordering used by `min`/`max`.
    ///
    /// Only values of the same kind compare; NaN compares with nothing.
    pub fn cmp_value(&self, rhs: &Value) -> Result<Ordering, RuntimeError> {
        let ordering = match (self, rhs) {
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Duration(a), Value::Duration(b)) => Some(a.cmp(b)),
            (Value::Clock(a), Value::Clock(b)) => Some(a.to_utc().cmp(&b.to_utc())),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => None,
        };
        ordering.ok_or(RuntimeError::IncomparableTypes {
            left: self.type_name(),
            right: rhs.type_name(),
        })
    }
}

/// Float results must stay finite.
fn finite(x: f64, op: ArithOp) -> Result<Value, RuntimeError> {
    if x.is_finite() {
        Ok(Value::Float(x))
    } else {
        Err(RuntimeError::OutOfRange(op.symbol()))
    }
}

/// Multiply a duration by a float factor at millisecond precision.
fn scale_duration(d: TimeDelta, factor: f64, op: ArithOp) -> Result<TimeDelta, RuntimeError> {
    let ms = (d.num_milliseconds() as f64 * factor).round();
    if !ms.is_finite() || ms.abs() >= i64::MAX as f64 {
        return Err(RuntimeError::OutOfRange(op.symbol()));
    }
    TimeDelta::try_milliseconds(ms as i64).ok_or(RuntimeError::OutOfRange(op.symbol()))
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Float(n as f64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<TimeDelta> for Value {
    fn from(d: TimeDelta) -> Self {
        Value::Duration(d)
    }
}

impl From<ClockTime> for Value {
    fn from(t: ClockTime) -> Self {
        Value::Clock(t)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
