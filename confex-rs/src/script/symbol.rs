//! Token classification.
//!
//! Each token gets a [`SymbolKind`] from purely local rules.  The only
//! context consulted is whether the token starts at column 0, which separates
//! indentation from inline whitespace.

use tracing::debug;

use crate::error::{SyntaxError, SyntaxErrorKind};
use super::lexer::{self, Position, Token, DESIGNATOR, LINE_BREAK};
use super::literal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Punctuation,
    Value,
    Name,
    /// Whitespace starting at column 0.
    WhitespaceSpacing,
    /// Whitespace anywhere else.
    WhitespaceSeparator,
    LineBreak,
    MathOperation,
    Keyword,
}

impl SymbolKind {
    /// Whitespace and line breaks carry no meaning between nodes.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SymbolKind::WhitespaceSpacing | SymbolKind::WhitespaceSeparator | SymbolKind::LineBreak
        )
    }

    /// Kinds that can take part in a literal or a function name.
    pub fn is_word(self) -> bool {
        matches!(self, SymbolKind::Name | SymbolKind::Value | SymbolKind::Keyword)
    }
}

// ── Keywords ──────────────────────────────────────────────────────────────────

/// Reserved words.  They are recognized but never executed; the parser
/// treats them as string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Def,
    If,
    Else,
    Elif,
    And,
    Or,
    Not,
    In,
    For,
}

impl Keyword {
    pub const ALL: [Keyword; 9] = [
        Keyword::Def,
        Keyword::If,
        Keyword::Else,
        Keyword::Elif,
        Keyword::And,
        Keyword::Or,
        Keyword::Not,
        Keyword::In,
        Keyword::For,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Def => "def",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::Elif => "elif",
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::Not => "not",
            Keyword::In => "in",
            Keyword::For => "for",
        }
    }

    pub fn from_word(word: &str) -> Option<Self> {
        Keyword::ALL.into_iter().find(|k| k.as_str() == word)
    }
}

// ── Symbol ────────────────────────────────────────────────────────────────────

/// A token annotated with its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub token: Token,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn text(&self) -> &str {
        &self.token.text
    }

    pub fn position(&self) -> Position {
        self.token.position
    }

    /// First character of the text (`'\0'` for an empty token, which the
    /// lexer never produces).
    pub fn first_char(&self) -> char {
        self.token.text.chars().next().unwrap_or_default()
    }

    /// Whether this is the single punctuation character `ch`.
    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == SymbolKind::Punctuation && self.first_char() == ch
    }
}

// ── Classification ────────────────────────────────────────────────────────────

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// `snake_case` words whose segments are alphanumeric and which don't start
/// with a digit.
fn is_identifier(text: &str) -> bool {
    match text.chars().next() {
        Some(c) if !c.is_numeric() => text
            .split(DESIGNATOR)
            .all(|seg| !seg.is_empty() && seg.chars().all(char::is_alphanumeric)),
        _ => false,
    }
}

/// Classify a single token.
///
/// `column` is the token's column; only `column == 0` matters.
pub fn classify(text: &str, column: usize) -> Result<SymbolKind, SyntaxErrorKind> {
    if let Some(c) = single_char(text) {
        if lexer::is_punctuation(c) {
            return Ok(SymbolKind::Punctuation);
        }
        if lexer::is_operator(c) {
            return Ok(SymbolKind::MathOperation);
        }
        if c == LINE_BREAK {
            return Ok(SymbolKind::LineBreak);
        }
    }
    if Keyword::from_word(text).is_some() {
        return Ok(SymbolKind::Keyword);
    }
    if is_identifier(text) {
        return Ok(SymbolKind::Name);
    }
    if !text.is_empty() && text.chars().all(lexer::is_whitespace) {
        return Ok(if column == 0 {
            SymbolKind::WhitespaceSpacing
        } else {
            SymbolKind::WhitespaceSeparator
        });
    }
    if literal::is_value_word(text) {
        return Ok(SymbolKind::Value);
    }
    Err(SyntaxErrorKind::UnrecognizedSymbol(text.to_owned()))
}

/// Classify every token, attaching the token position to any failure.
///
/// Between matching quotes every token is literal text, so a word that
/// fits no other kind (`'2nd floor'`) is accepted there as a `Value`.
pub fn classify_all(tokens: Vec<Token>) -> Result<Vec<Symbol>, SyntaxError> {
    let mut open_quote: Option<char> = None;
    let mut symbols = Vec::with_capacity(tokens.len());
    for token in tokens {
        let kind = match (classify(&token.text, token.position.column), open_quote) {
            (Ok(kind), _) => kind,
            (Err(_), Some(_)) => SymbolKind::Value,
            (Err(kind), None) => return Err(SyntaxError::new(kind, token.position)),
        };
        let symbol = Symbol { token, kind };
        let ch = symbol.first_char();
        if kind == SymbolKind::Punctuation && lexer::is_quote(ch) {
            open_quote = match open_quote {
                None => Some(ch),
                Some(q) if q == ch => None,
                other => other,
            };
        }
        symbols.push(symbol);
    }
    debug!(symbols = symbols.len(), "classified tokens");
    Ok(symbols)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
