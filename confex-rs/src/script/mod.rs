//! The confex expression language.
//!
//! A script goes through four stages:
//!
//! 1. [`lexer::decompose`] splits the text into tokens that concatenate
//!    back to the original script;
//! 2. [`symbol::classify_all`] tags each token with a [`SymbolKind`];
//! 3. [`parser::parse`] turns symbols into a flat list of [`Instruction`]s,
//!    recognizing clock times, durations and floats on the way;
//! 4. [`eval::run`] executes the instructions on a value stack.
//!
//! The first three stages make up [`Program::compile`]; a compiled program
//! can be run any number of times against different contexts.
//!
//! # Quick start
//!
//! ```rust
//! use confex::{Context, EvalOptions, Program, Value};
//!
//! let opts = EvalOptions::default();
//! let program = Program::compile("max(lookup(a), 3) * 2", &opts).unwrap();
//! let ctx = Context::new().with("a", 5.0);
//! assert_eq!(program.run(&ctx, &opts).unwrap(), Value::Float(10.0));
//! ```

pub mod builtins;
pub mod context;
pub mod eval;
pub mod lexer;
pub mod literal;
pub mod parser;
pub mod symbol;
pub mod value;

use crate::config::EvalOptions;
use crate::error::Error;

// Re-exports for convenience.
pub use builtins::Builtin;
pub use context::{Context, ContextError};
pub use lexer::{Position, Token};
pub use parser::{ArithOp, Call, Callee, Instruction};
pub use symbol::{Keyword, Symbol, SymbolKind};
pub use value::{ClockTime, Value};

/// A parsed script, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Lex, classify and parse `script`.
    ///
    /// Clock-time literals take their offset from `opts.timezone`, so a
    /// program compiled for one zone keeps it when run with other options.
    pub fn compile(script: &str, opts: &EvalOptions) -> Result<Self, Error> {
        let tokens = lexer::decompose(script)?;
        let symbols = symbol::classify_all(tokens)?;
        let instructions = parser::parse(&symbols, opts.timezone, opts.max_depth)?;
        Ok(Program { instructions })
    }

    pub fn run(&self, ctx: &Context, opts: &EvalOptions) -> Result<Value, Error> {
        Ok(eval::run(&self.instructions, ctx, opts.max_depth)?)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
