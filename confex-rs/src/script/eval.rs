//! Stack-machine evaluator.
//!
//! Instructions run strictly left to right:
//!
//! - a literal pushes its value;
//! - a call evaluates each argument program, invokes the function, and
//!   pushes the result;
//! - an arithmetic operator takes its right operand from the *next*
//!   instruction (a literal or a call), pops its left operand, pushes the
//!   result, and skips past the operand it consumed.
//!
//! There is no precedence: `2 + 3 * 4` is `(2 + 3) * 4`.  A program must
//! leave exactly one value on the stack.

use tracing::{debug, trace};

use crate::error::RuntimeError;
use super::builtins::call_builtin;
use super::context::Context;
use super::parser::{ArithOp, Call, Callee, Instruction};
use super::value::Value;

struct Evaluator<'a> {
    ctx: &'a Context,
    max_depth: usize,
}

impl<'a> Evaluator<'a> {
    /// Run one program (the top level or a single call argument) and return
    /// its only remaining value.
    fn run_program(&self, program: &[Instruction], depth: usize) -> Result<Value, RuntimeError> {
        let mut stack: Vec<Value> = Vec::new();
        let mut pc = 0;
        while let Some(instr) = program.get(pc) {
            match instr {
                Instruction::Literal(v) => {
                    stack.push(v.clone());
                    pc += 1;
                }
                Instruction::Call(call) => {
                    stack.push(self.call(call, depth)?);
                    pc += 1;
                }
                Instruction::Arithmetic(op) => {
                    let rhs = self.operand(*op, program.get(pc + 1), depth)?;
                    let lhs = stack.pop().ok_or(RuntimeError::StackImbalance(0))?;
                    let result = lhs.apply(*op, &rhs)?;
                    trace!(op = %op.symbol(), %lhs, %rhs, %result, "arithmetic");
                    stack.push(result);
                    pc += 2;
                }
            }
        }
        match <[Value; 1]>::try_from(stack) {
            Ok([value]) => Ok(value),
            Err(stack) => Err(RuntimeError::StackImbalance(stack.len())),
        }
    }

    fn operand(
        &self,
        op: ArithOp,
        next: Option<&Instruction>,
        depth: usize,
    ) -> Result<Value, RuntimeError> {
        match next {
            Some(Instruction::Literal(v)) => Ok(v.clone()),
            Some(Instruction::Call(call)) => self.call(call, depth),
            Some(Instruction::Arithmetic(_)) | None => {
                Err(RuntimeError::MissingOperand(op.symbol()))
            }
        }
    }

    fn call(&self, call: &Call, depth: usize) -> Result<Value, RuntimeError> {
        if depth >= self.max_depth {
            return Err(RuntimeError::StackOverflow(self.max_depth));
        }
        let args = match call.args.as_slice() {
            // `f()`
            [only] if only.is_empty() => Vec::new(),
            args => args
                .iter()
                .map(|arg| self.run_program(arg, depth + 1))
                .collect::<Result<Vec<_>, _>>()?,
        };
        trace!(function = call.callee.name(), args = args.len(), "call");
        match &call.callee {
            Callee::Builtin(b) => call_builtin(*b, args, self.ctx),
            Callee::Unknown(name) => Err(RuntimeError::UnimplementedFunction(name.clone())),
        }
    }
}

/// Execute a parsed program against `ctx`.
///
/// Calls may nest at most `max_depth` levels before the evaluator gives up
/// with [`RuntimeError::StackOverflow`].
pub fn run(program: &[Instruction], ctx: &Context, max_depth: usize) -> Result<Value, RuntimeError> {
    let evaluator = Evaluator { ctx, max_depth };
    let result = evaluator.run_program(program, 0);
    match &result {
        Ok(v) => debug!(result = %v, "evaluated program"),
        Err(e) => debug!(error = %e, "evaluation failed"),
    }
    result
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::builtins::Builtin;
    use chrono::TimeDelta;

    fn lit(v: impl Into<Value>) -> Instruction {
        Instruction::Literal(v.into())
    }

    fn op(o: ArithOp) -> Instruction {
        Instruction::Arithmetic(o)
    }

    fn call(callee: Callee, args: Vec<Vec<Instruction>>) -> Instruction {
        Instruction::Call(Call { callee, args })
    }

    fn run_empty(program: &[Instruction]) -> Result<Value, RuntimeError> {
        run(program, &Context::new(), 16)
    }

    #[test]
    fn single_literal() {
        assert_eq!(run_empty(&[lit(42.0)]), Ok(Value::Float(42.0)));
    }

    #[test]
    fn left_to_right_without_precedence() {
        let program = [
            lit(2.0),
            op(ArithOp::Add),
            lit(3.0),
            op(ArithOp::Mul),
            lit(4.0),
        ];
        assert_eq!(run_empty(&program), Ok(Value::Float(20.0)));

        let program = [lit(2.0), op(ArithOp::Sub), lit(1.0), op(ArithOp::Sub), lit(1.0)];
        assert_eq!(run_empty(&program), Ok(Value::Float(0.0)));
    }

    #[test]
    fn call_as_right_operand() {
        let ctx = Context::new().with("x", 10.0);
        let program = [
            lit(1.0),
            op(ArithOp::Add),
            call(Callee::Builtin(Builtin::Lookup), vec![vec![lit("x")]]),
        ];
        assert_eq!(run(&program, &ctx, 16), Ok(Value::Float(11.0)));
    }

    #[test]
    fn call_arguments_are_programs() {
        let program = [call(
            Callee::Builtin(Builtin::Max),
            vec![
                vec![lit(1.0), op(ArithOp::Add), lit(1.0)],
                vec![lit(3.0)],
            ],
        )];
        assert_eq!(run_empty(&program), Ok(Value::Float(3.0)));
    }

    #[test]
    fn duration_arithmetic() {
        let program = [lit(TimeDelta::minutes(5)), op(ArithOp::Mul), lit(2.0)];
        assert_eq!(
            run_empty(&program),
            Ok(Value::Duration(TimeDelta::minutes(10)))
        );
    }

    #[test]
    fn empty_program_is_imbalanced() {
        assert_eq!(run_empty(&[]), Err(RuntimeError::StackImbalance(0)));
    }

    #[test]
    fn leftover_values_are_imbalanced() {
        assert_eq!(
            run_empty(&[lit(1.0), lit(2.0)]),
            Err(RuntimeError::StackImbalance(2))
        );
    }

    #[test]
    fn operator_without_left_operand() {
        assert_eq!(
            run_empty(&[op(ArithOp::Add), lit(1.0)]),
            Err(RuntimeError::StackImbalance(0))
        );
    }

    #[test]
    fn operator_without_right_operand() {
        assert_eq!(
            run_empty(&[lit(1.0), op(ArithOp::Add)]),
            Err(RuntimeError::MissingOperand('+'))
        );
        assert_eq!(
            run_empty(&[lit(1.0), op(ArithOp::Add), op(ArithOp::Sub), lit(1.0)]),
            Err(RuntimeError::MissingOperand('+'))
        );
    }

    #[test]
    fn empty_call_has_no_arguments() {
        let program = [call(Callee::Builtin(Builtin::Min), vec![vec![]])];
        assert!(matches!(
            run_empty(&program),
            Err(RuntimeError::ArityMismatch { received: 0, .. })
        ));
    }

    #[test]
    fn empty_argument_among_others() {
        let program = [call(
            Callee::Builtin(Builtin::Max),
            vec![vec![lit(1.0)], vec![]],
        )];
        assert_eq!(run_empty(&program), Err(RuntimeError::StackImbalance(0)));
    }

    #[test]
    fn unknown_function_fails_after_arguments() {
        let program = [call(Callee::Unknown("avg".into()), vec![vec![lit(1.0)]])];
        assert_eq!(
            run_empty(&program),
            Err(RuntimeError::UnimplementedFunction("avg".into()))
        );

        let bad_arg = [call(
            Callee::Unknown("avg".into()),
            vec![vec![lit(1.0), op(ArithOp::Div), lit(0.0)]],
        )];
        assert_eq!(run_empty(&bad_arg), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn nesting_limit() {
        let mut program = vec![lit(1.0)];
        for _ in 0..5 {
            program = vec![call(Callee::Builtin(Builtin::Max), vec![program])];
        }
        assert_eq!(run(&program, &Context::new(), 5), Ok(Value::Float(1.0)));
        assert_eq!(
            run(&program, &Context::new(), 4),
            Err(RuntimeError::StackOverflow(4))
        );
    }
}
