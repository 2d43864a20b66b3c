//! Built-in confex functions.
//!
//! The set of built-ins is closed: the parser resolves names to a
//! [`Builtin`] up front, and [`call_builtin`] matches on it exhaustively.
//! Each function receives its already-evaluated arguments.

use std::cmp::Ordering;

use crate::error::RuntimeError;
use super::context::Context;
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Min,
    Max,
    Lookup,
}

impl Builtin {
    pub const ALL: [Builtin; 3] = [Builtin::Min, Builtin::Max, Builtin::Lookup];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Lookup => "lookup",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Builtin::ALL.into_iter().find(|b| b.name() == name)
    }
}

/// Dispatch a built-in function call.
pub fn call_builtin(builtin: Builtin, args: Vec<Value>, ctx: &Context) -> Result<Value, RuntimeError> {
    match builtin {
        Builtin::Min => extreme(builtin, args, Ordering::Less),
        Builtin::Max => extreme(builtin, args, Ordering::Greater),
        Builtin::Lookup => lookup(args, ctx),
    }
}

/// Shared body of `min`/`max`: keeps the first argument that no later
/// argument beats in the `wanted` direction.
fn extreme(builtin: Builtin, args: Vec<Value>, wanted: Ordering) -> Result<Value, RuntimeError> {
    let received = args.len();
    let mut iter = args.into_iter();
    let mut best = iter.next().ok_or(RuntimeError::ArityMismatch {
        function: builtin.name(),
        expected: "at least 1",
        received,
    })?;
    for v in iter {
        if v.cmp_value(&best)? == wanted {
            best = v;
        }
    }
    Ok(best)
}

/// `lookup(path)`: walk the context along a dotted path.  A missing segment
/// yields `null`, not an error.
fn lookup(args: Vec<Value>, ctx: &Context) -> Result<Value, RuntimeError> {
    let function = Builtin::Lookup.name();
    let [path] = <[Value; 1]>::try_from(args).map_err(|args| RuntimeError::ArityMismatch {
        function,
        expected: "exactly 1",
        received: args.len(),
    })?;
    let path = match path {
        Value::Str(path) => path,
        other => {
            return Err(RuntimeError::InvalidArgument {
                function,
                expected: "string",
                found: other.type_name(),
            })
        }
    };
    Ok(ctx.resolve(&path).cloned().unwrap_or_default())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(xs: &[f64]) -> Vec<Value> {
        xs.iter().copied().map(Value::Float).collect()
    }

    #[test]
    fn names_round_trip() {
        for b in Builtin::ALL {
            assert_eq!(Builtin::from_name(b.name()), Some(b));
        }
        assert_eq!(Builtin::from_name("avg"), None);
    }

    #[test]
    fn min_max() {
        let ctx = Context::new();
        assert_eq!(
            call_builtin(Builtin::Max, floats(&[1.0, 5.0, 3.0]), &ctx),
            Ok(Value::Float(5.0))
        );
        assert_eq!(
            call_builtin(Builtin::Min, floats(&[4.0, 2.0, 9.0]), &ctx),
            Ok(Value::Float(2.0))
        );
        assert_eq!(
            call_builtin(Builtin::Min, vec![Value::from("b"), Value::from("a")], &ctx),
            Ok(Value::from("a"))
        );
    }

    #[test]
    fn min_max_single_argument() {
        let ctx = Context::new();
        assert_eq!(
            call_builtin(Builtin::Max, floats(&[7.0]), &ctx),
            Ok(Value::Float(7.0))
        );
    }

    #[test]
    fn min_max_require_arguments() {
        let err = call_builtin(Builtin::Min, vec![], &Context::new()).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::ArityMismatch { function: "min", received: 0, .. }
        ));
    }

    #[test]
    fn min_max_incomparable() {
        let err = call_builtin(
            Builtin::Max,
            vec![Value::Float(1.0), Value::from("x")],
            &Context::new(),
        )
        .unwrap_err();
        assert!(matches!(err, RuntimeError::IncomparableTypes { .. }));
    }

    #[test]
    fn lookup_paths() {
        let ctx = Context::from_json_str(r#"{"sensor": {"temp": 21.5}}"#).unwrap();
        assert_eq!(
            call_builtin(Builtin::Lookup, vec![Value::from("sensor.temp")], &ctx),
            Ok(Value::Float(21.5))
        );
        assert_eq!(
            call_builtin(Builtin::Lookup, vec![Value::from("sensor.humidity")], &ctx),
            Ok(Value::Null)
        );
    }

    #[test]
    fn lookup_argument_checks() {
        let ctx = Context::new();
        assert!(matches!(
            call_builtin(Builtin::Lookup, vec![Value::from("a"), Value::from("b")], &ctx),
            Err(RuntimeError::ArityMismatch { received: 2, .. })
        ));
        assert!(matches!(
            call_builtin(Builtin::Lookup, vec![Value::Float(1.0)], &ctx),
            Err(RuntimeError::InvalidArgument { found: "float", .. })
        ));
    }
}
