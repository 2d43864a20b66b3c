//! Evaluation options.
//!
//! | Option | Default | Meaning |
//! |--------|---------|---------|
//! | `timezone` | `UTC` | offset stamped on clock-time literals |
//! | `max_depth` | `64` | deepest allowed nesting of function calls |
//!
//! [`parse_timezone`] reads the textual offsets accepted by the `-z` flag.

use chrono::{FixedOffset, Offset, Utc};

/// Deepest function-call nesting accepted by default.
pub const DEFAULT_MAX_DEPTH: usize = 64;

// ── Public API ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    pub timezone: FixedOffset,
    pub max_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            timezone: Utc.fix(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EvalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timezone(mut self, timezone: FixedOffset) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Parse a UTC offset: `UTC`, `Z`, `+HH:MM`, `-HHMM` or `+HH`.
pub fn parse_timezone(s: &str) -> Result<FixedOffset, String> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("utc") || s.eq_ignore_ascii_case("z") {
        return Ok(Utc.fix());
    }

    let invalid = || format!("invalid timezone offset: {s:?}");
    if !s.starts_with(['+', '-']) || !s[1..].bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return Err(invalid());
    }
    // chrono wants minutes; `+HH` is shorthand for `+HH:00`.
    let full = if s.len() == 3 { format!("{s}:00") } else { s.to_owned() };
    if !matches!(full.len(), 5 | 6) {
        return Err(invalid());
    }
    full.parse::<FixedOffset>().map_err(|_| invalid())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn offset(secs: i32) -> FixedOffset {
        FixedOffset::east_opt(secs).unwrap()
    }

    #[test]
    fn defaults() {
        let opts = EvalOptions::default();
        assert_eq!(opts.timezone, offset(0));
        assert_eq!(opts.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn builders() {
        let opts = EvalOptions::new()
            .with_timezone(offset(3600))
            .with_max_depth(4);
        assert_eq!(opts.timezone, offset(3600));
        assert_eq!(opts.max_depth, 4);
    }

    #[test]
    fn utc_names() {
        assert_eq!(parse_timezone("UTC"), Ok(offset(0)));
        assert_eq!(parse_timezone("utc"), Ok(offset(0)));
        assert_eq!(parse_timezone("Z"), Ok(offset(0)));
    }

    #[test]
    fn numeric_offsets() {
        assert_eq!(parse_timezone("+02:00"), Ok(offset(7200)));
        assert_eq!(parse_timezone("-0530"), Ok(offset(-19800)));
        assert_eq!(parse_timezone("+01"), Ok(offset(3600)));
        assert_eq!(parse_timezone(" +00:30 "), Ok(offset(1800)));
    }

    #[test]
    fn rejects_garbage() {
        for bad in [
            "", "02:00", "+2", "+02:0", "+02:60", "+24:00", "+ab:cd", "+aé1", "EST", "+02:00:00",
            "+0200x",
        ] {
            assert!(parse_timezone(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
