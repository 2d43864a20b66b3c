//! Parser: classified symbols → flat instruction sequence.
//!
//! A program is not an expression tree.  It is a flat list of instructions
//! that the evaluator walks left to right; the only nesting is inside
//! function calls, whose arguments are each their own flat list.
//!
//! ```text
//! min(1, 2) + 3   →   [Call(min, [[1], [2]]), Arithmetic(+), Literal(3)]
//! ```
//!
//! Structural punctuation (`(`, `)`, `,`) is consumed while parsing argument
//! lists and never reaches a program.

use chrono::FixedOffset;
use tracing::{debug, trace};

use crate::error::{SyntaxError, SyntaxErrorKind};
use super::builtins::Builtin;
use super::lexer::{self, Position};
use super::literal;
use super::symbol::{Keyword, Symbol, SymbolKind};
use super::value::Value;

// ── Instructions ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(ArithOp::Add),
            '-' => Some(ArithOp::Sub),
            '*' => Some(ArithOp::Mul),
            '/' => Some(ArithOp::Div),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            ArithOp::Add => '+',
            ArithOp::Sub => '-',
            ArithOp::Mul => '*',
            ArithOp::Div => '/',
        }
    }
}

/// Target of a function call.
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Builtin(Builtin),
    /// A name that is not a built-in; calling it fails at evaluation time.
    Unknown(String),
}

impl Callee {
    pub fn name(&self) -> &str {
        match self {
            Callee::Builtin(b) => b.name(),
            Callee::Unknown(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub callee: Callee,
    /// One instruction list per comma-separated argument.  `f()` has a
    /// single empty argument.
    pub args: Vec<Vec<Instruction>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Literal(Value),
    Arithmetic(ArithOp),
    Call(Call),
}

// ── Parse nodes ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Punct {
    Open,
    Close,
    Comma,
}

impl Punct {
    fn symbol(self) -> char {
        match self {
            Punct::Open => '(',
            Punct::Close => ')',
            Punct::Comma => ',',
        }
    }
}

/// What one step of the parser produces: an instruction, or structural
/// punctuation for the enclosing argument list to act on.
#[derive(Debug)]
enum Node {
    Instr(Instruction),
    Punct(Punct, Position),
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser<'a> {
    symbols: &'a [Symbol],
    pos: usize,
    timezone: FixedOffset,
    max_depth: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(symbols: &'a [Symbol], timezone: FixedOffset, max_depth: usize) -> Self {
        Parser {
            symbols,
            pos: 0,
            timezone,
            max_depth,
            depth: 0,
        }
    }

    fn skip_trivia(&mut self) {
        while self.symbols.get(self.pos).is_some_and(|s| s.kind.is_trivia()) {
            self.pos += 1;
        }
    }

    /// Next non-trivia symbol, without consuming anything.
    fn peek_significant(&self) -> Option<&'a Symbol> {
        self.symbols[self.pos.min(self.symbols.len())..]
            .iter()
            .find(|s| !s.kind.is_trivia())
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    /// Parse one node.  `None` at end of input.
    fn parse_node(&mut self) -> Result<Option<Node>, SyntaxError> {
        self.skip_trivia();
        let symbols = self.symbols;
        let Some(sym) = symbols.get(self.pos) else {
            return Ok(None);
        };
        let position = sym.position();

        let node = match sym.kind {
            SymbolKind::Punctuation => {
                self.pos += 1;
                match sym.first_char() {
                    '(' => Node::Punct(Punct::Open, position),
                    ')' => Node::Punct(Punct::Close, position),
                    ',' => Node::Punct(Punct::Comma, position),
                    q if lexer::is_quote(q) => Node::Instr(self.parse_quoted(q, position)?),
                    // `.`/`:` that did not join two words, brackets, braces, `#`.
                    _ => Node::Instr(Instruction::Literal(Value::Str(sym.text().to_owned()))),
                }
            }
            SymbolKind::MathOperation => {
                self.pos += 1;
                match ArithOp::from_char(sym.first_char()) {
                    Some(op) => Node::Instr(Instruction::Arithmetic(op)),
                    None => Node::Instr(Instruction::Literal(Value::Str(sym.text().to_owned()))),
                }
            }
            SymbolKind::Name | SymbolKind::Value | SymbolKind::Keyword => self.parse_word()?,
            SymbolKind::WhitespaceSpacing
            | SymbolKind::WhitespaceSeparator
            | SymbolKind::LineBreak => unreachable!("trivia skipped above"),
        };
        Ok(Some(node))
    }

    /// A word, possibly joined with following words by `.` or `:` (no
    /// whitespace in between): `sensor.temp`, `07:30`, `1_000.5`.
    fn parse_word(&mut self) -> Result<Node, SyntaxError> {
        let symbols = self.symbols;
        let first = &symbols[self.pos];
        let position = first.position();
        self.pos += 1;

        let mut text = first.text().to_owned();
        let mut compound = false;
        while let (Some(sep), Some(next)) = (symbols.get(self.pos), symbols.get(self.pos + 1))
        {
            if !(sep.is_punct('.') || sep.is_punct(':')) || !next.kind.is_word() {
                break;
            }
            text.push_str(sep.text());
            text.push_str(next.text());
            self.pos += 2;
            compound = true;
        }

        if !compound {
            match first.kind {
                SymbolKind::Name => {
                    if let Some(builtin) = Builtin::from_name(&text) {
                        return self.parse_call(Callee::Builtin(builtin), position);
                    }
                    if self.peek_significant().is_some_and(|s| s.is_punct('(')) {
                        return self.parse_call(Callee::Unknown(text), position);
                    }
                }
                SymbolKind::Keyword => {
                    if let Some(kw) = Keyword::from_word(&text) {
                        return Ok(Node::Instr(Instruction::Literal(Value::Str(
                            kw.as_str().to_owned(),
                        ))));
                    }
                }
                _ => {}
            }
        }

        Ok(Node::Instr(Instruction::Literal(literal::recognize(
            &text,
            self.timezone,
        ))))
    }

    fn parse_call(&mut self, callee: Callee, position: Position) -> Result<Node, SyntaxError> {
        if self.depth >= self.max_depth {
            return Err(SyntaxError::new(
                SyntaxErrorKind::NestingTooDeep(self.max_depth),
                position,
            ));
        }
        let open = match self.parse_node()? {
            Some(Node::Punct(Punct::Open, open)) => open,
            _ => {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::ExpectedOpenParen(callee.name().to_owned()),
                    position,
                ))
            }
        };

        self.depth += 1;
        let args = self.parse_arguments(open)?;
        self.depth -= 1;

        trace!(function = callee.name(), args = args.len(), "parsed call");
        Ok(Node::Instr(Instruction::Call(Call { callee, args })))
    }

    /// Everything after `(` up to and including the matching `)`.
    fn parse_arguments(&mut self, open: Position) -> Result<Vec<Vec<Instruction>>, SyntaxError> {
        let mut args = Vec::new();
        let mut current = Vec::new();
        loop {
            match self.parse_node()? {
                None => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnclosedArgumentList,
                        open,
                    ))
                }
                Some(Node::Punct(Punct::Close, _)) => {
                    args.push(current);
                    return Ok(args);
                }
                Some(Node::Punct(Punct::Comma, _)) => args.push(std::mem::take(&mut current)),
                Some(Node::Punct(p @ Punct::Open, at)) => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedPunctuation(p.symbol()),
                        at,
                    ))
                }
                Some(Node::Instr(instr)) => current.push(instr),
            }
        }
    }

    /// Text between `quote` and the next identical quote, verbatim.  The
    /// classifier lets any word through between quotes, so `'2nd floor'`
    /// reaches this point.
    fn parse_quoted(&mut self, quote: char, open: Position) -> Result<Instruction, SyntaxError> {
        let mut text = String::new();
        while let Some(sym) = self.symbols.get(self.pos) {
            self.pos += 1;
            if sym.is_punct(quote) {
                return Ok(Instruction::Literal(Value::Str(text)));
            }
            text.push_str(sym.text());
        }
        Err(SyntaxError::new(SyntaxErrorKind::UnterminatedQuote, open))
    }
}

/// Parse classified symbols into a program.
///
/// Clock-time literals are stamped with `timezone`; function calls may nest
/// at most `max_depth` levels.
pub fn parse(
    symbols: &[Symbol],
    timezone: FixedOffset,
    max_depth: usize,
) -> Result<Vec<Instruction>, SyntaxError> {
    let mut parser = Parser::new(symbols, timezone, max_depth);
    let mut program = Vec::new();
    while let Some(node) = parser.parse_node()? {
        match node {
            Node::Instr(instr) => program.push(instr),
            Node::Punct(p, at) => {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::UnexpectedPunctuation(p.symbol()),
                    at,
                ))
            }
        }
    }
    debug!(instructions = program.len(), "parsed program");
    Ok(program)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
