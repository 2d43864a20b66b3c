//! confex: a small expression language for configuration values.
//!
//! Scripts are evaluated against a read-only [`Context`] and produce a single
//! [`Value`]:
//!
//! ```rust
//! use chrono::FixedOffset;
//! use confex::{evaluate, Context, Value};
//!
//! let ctx = Context::from_json_str(r#"{"sensor": {"temp": 21.5}}"#).unwrap();
//! let utc = FixedOffset::east_opt(0).unwrap();
//! let v = evaluate("max(lookup(sensor.temp), 18) + 1", &ctx, utc).unwrap();
//! assert_eq!(v, Value::Float(22.5));
//! ```
//!
//! Arithmetic has no precedence and runs left to right, so `2 + 3 * 4` is
//! `20`.  See [`script`] for the pipeline.

pub mod cli;
pub mod config;
pub mod error;
pub mod script;

use chrono::FixedOffset;

pub use config::EvalOptions;
pub use error::{Error, RuntimeError, SyntaxError, SyntaxErrorKind};
pub use script::{ClockTime, Context, ContextError, Program, Value};

/// Compile and run `script` in one step, with clock times in `timezone` and
/// the default nesting limit.
pub fn evaluate(script: &str, context: &Context, timezone: FixedOffset) -> Result<Value, Error> {
    evaluate_with(script, context, &EvalOptions::default().with_timezone(timezone))
}

pub fn evaluate_with(script: &str, context: &Context, opts: &EvalOptions) -> Result<Value, Error> {
    Program::compile(script, opts)?.run(context, opts)
}

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize a tracing subscriber at DEBUG level (or `RUST_LOG`).
    /// Safe to call from several tests.
    pub fn init_test_logging() {
        use tracing_subscriber::{fmt, EnvFilter};

        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_end_to_end() {
        test_utils::init_test_logging();
        let ctx = Context::new().with("a", 2.0);
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(evaluate("lookup(a) * 3", &ctx, utc), Ok(Value::Float(6.0)));
    }

    #[test]
    fn evaluate_with_depth_limit() {
        test_utils::init_test_logging();
        let opts = EvalOptions::default().with_max_depth(1);
        let err = evaluate_with("max(max(1))", &Context::new(), &opts).unwrap_err();
        assert!(matches!(
            err,
            Error::Syntax(SyntaxError { kind: SyntaxErrorKind::NestingTooDeep(1), .. })
        ));
    }
}
