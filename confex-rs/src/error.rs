//! Error types surfaced by compiling and evaluating confex scripts.
//!
//! Everything that goes wrong before evaluation starts is a [`SyntaxError`]
//! and carries the position of the offending token.  Everything that goes
//! wrong while running a parsed program is a [`RuntimeError`]; those have no
//! position because the instructions no longer map back to source text.
//! Both are wrapped by [`Error`] at the public API boundary.

use thiserror::Error;

use crate::script::lexer::Position;

/// Top-level error returned by [`crate::evaluate`] and [`crate::Program`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("syntax error at {0}")]
    Syntax(#[from] SyntaxError),
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl Error {
    /// Line/column of the failure, when the error came from the front end.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::Syntax(e) => Some(e.position),
            Error::Runtime(_) => None,
        }
    }
}

// ── Syntax errors ─────────────────────────────────────────────────────────────

/// Lexing, classification, or parsing failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{position}: {kind}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub position: Position,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, position: Position) -> Self {
        SyntaxError { kind, position }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxErrorKind {
    #[error("illegal character {0:?}")]
    IllegalCharacter(char),
    #[error("unrecognized symbol {0:?}")]
    UnrecognizedSymbol(String),
    #[error("expected '(' after function name {0:?}")]
    ExpectedOpenParen(String),
    #[error("unterminated quote")]
    UnterminatedQuote,
    #[error("argument list is missing its closing ')'")]
    UnclosedArgumentList,
    #[error("unexpected {0:?} outside of an argument list")]
    UnexpectedPunctuation(char),
    #[error("function calls nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

// ── Runtime errors ────────────────────────────────────────────────────────────

/// Failure while executing an already-parsed program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("built-in function {0:?} has not been implemented")]
    UnimplementedFunction(String),
    #[error("program left {0} values on the stack, expected exactly 1")]
    StackImbalance(usize),
    #[error("operator '{0}' must be followed by a value or a function call")]
    MissingOperand(char),
    #[error("division by zero")]
    DivisionByZero,
    #[error("cannot compare {left} with {right}")]
    IncomparableTypes {
        left: &'static str,
        right: &'static str,
    },
    #[error("cannot apply '{op}' to {left} and {right}")]
    TypeMismatch {
        op: String,
        left: &'static str,
        right: &'static str,
    },
    #[error("{function}() expects {expected}, received {received} argument(s)")]
    ArityMismatch {
        function: &'static str,
        expected: &'static str,
        received: usize,
    },
    #[error("{function}() expects a {expected} argument, received {found}")]
    InvalidArgument {
        function: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("result of '{0}' is out of range")]
    OutOfRange(char),
    #[error("function calls nested deeper than {0} levels")]
    StackOverflow(usize),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
