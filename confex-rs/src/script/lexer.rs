//! Script lexer.
//!
//! Splits raw script text on character-class boundaries.  The lexer has no
//! semantic knowledge: it only knows which characters accumulate into words,
//! which stand alone, and which group into whitespace runs.  Every character
//! of the input ends up in exactly one token, so joining the token texts
//! reproduces the script.

use std::fmt;

use tracing::{debug, trace};

use crate::error::{SyntaxError, SyntaxErrorKind};

// ── Character classes ─────────────────────────────────────────────────────────

/// Joins alphanumeric runs into a single word (`snake_case`, `1_000`).
pub const DESIGNATOR: char = '_';

pub const LINE_BREAK: char = '\n';

pub fn is_operator(ch: char) -> bool {
    matches!(ch, '+' | '-' | '*' | '/' | '=')
}

pub fn is_punctuation(ch: char) -> bool {
    matches!(
        ch,
        '(' | ')' | ',' | '.' | ':' | '[' | ']' | '{' | '}' | '#' | '\'' | '"'
    )
}

pub fn is_quote(ch: char) -> bool {
    matches!(ch, '\'' | '"')
}

pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r')
}

pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == DESIGNATOR
}

// ── Position ──────────────────────────────────────────────────────────────────

/// Location of a token in the script.
///
/// `line` is 1-based, `column` is 0-based and counts characters, `offset` is
/// the byte offset into the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn start() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 0,
        }
    }

    fn advance(&mut self, ch: char) {
        self.offset += ch.len_utf8();
        if ch == LINE_BREAK {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub position: Position,
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer<'a> {
    src: &'a str,
    cursor: Position,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src,
            cursor: Position::start(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.cursor.offset..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.cursor.advance(ch);
        Some(ch)
    }

    /// Token spanning `start` up to the current cursor.
    fn token_from(&self, start: Position) -> Token {
        Token {
            text: self.src[start.offset..self.cursor.offset].to_owned(),
            position: start,
        }
    }

    fn flush_word(&self, word_start: &mut Option<Position>, tokens: &mut Vec<Token>) {
        if let Some(start) = word_start.take() {
            tokens.push(self.token_from(start));
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        let mut word_start: Option<Position> = None;

        while let Some(ch) = self.peek() {
            if is_word_char(ch) {
                word_start.get_or_insert(self.cursor);
                self.advance();
                continue;
            }

            self.flush_word(&mut word_start, &mut tokens);
            let start = self.cursor;

            if is_operator(ch) || is_punctuation(ch) || ch == LINE_BREAK {
                self.advance();
            } else if is_whitespace(ch) {
                // Run-length group: only identical characters share a token.
                while self.peek() == Some(ch) {
                    self.advance();
                }
            } else {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::IllegalCharacter(ch),
                    start,
                ));
            }
            tokens.push(self.token_from(start));
        }

        self.flush_word(&mut word_start, &mut tokens);
        Ok(tokens)
    }
}

/// Split `script` into tokens.
pub fn decompose(script: &str) -> Result<Vec<Token>, SyntaxError> {
    let tokens = Lexer::new(script).tokenize()?;
    debug!(bytes = script.len(), tokens = tokens.len(), "decomposed script");
    for t in &tokens {
        trace!(text = ?t.text, line = t.position.line, column = t.position.column, "token");
    }
    Ok(tokens)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(src: &str) -> Vec<String> {
        decompose(src)
            .expect("lex failed")
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn words_and_operators() {
        assert_eq!(texts("a+b_c"), vec!["a", "+", "b_c"]);
        assert_eq!(texts("min(1,2)"), vec!["min", "(", "1", ",", "2", ")"]);
    }

    #[test]
    fn dotted_and_clock_tokens_split() {
        assert_eq!(texts("sensor.temp"), vec!["sensor", ".", "temp"]);
        assert_eq!(texts("07:30"), vec!["07", ":", "30"]);
        assert_eq!(texts("1_000.5"), vec!["1_000", ".", "5"]);
    }

    #[test]
    fn whitespace_grouping() {
        assert_eq!(texts("  \t"), vec!["  ", "\t"]);
        assert_eq!(texts("a   b"), vec!["a", "   ", "b"]);
        assert_eq!(texts(" \t "), vec![" ", "\t", " "]);
    }

    #[test]
    fn line_breaks_stand_alone() {
        assert_eq!(texts("a\n\nb"), vec!["a", "\n", "\n", "b"]);
    }

    #[test]
    fn trailing_word_flushed() {
        assert_eq!(texts("1 + abc"), vec!["1", " ", "+", " ", "abc"]);
    }

    #[test]
    fn brackets_braces_hash_and_equals() {
        assert_eq!(texts("a[0]"), vec!["a", "[", "0", "]"]);
        assert_eq!(texts("{x}#"), vec!["{", "x", "}", "#"]);
        assert_eq!(texts("x = 1"), vec!["x", " ", "=", " ", "1"]);
    }

    #[test]
    fn empty_script() {
        assert!(texts("").is_empty());
    }

    #[test]
    fn positions_track_lines() {
        let tokens = decompose("a\n  bc").unwrap();
        let bc = tokens.last().unwrap();
        assert_eq!(bc.text, "bc");
        assert_eq!(
            bc.position,
            Position {
                offset: 4,
                line: 2,
                column: 2
            }
        );
        assert_eq!(tokens[2].position.column, 0); // indentation
    }

    #[test]
    fn unicode_words() {
        assert_eq!(texts("température+1"), vec!["température", "+", "1"]);
        let tokens = decompose("é @").unwrap_err();
        assert_eq!(tokens.position.column, 2);
        assert_eq!(tokens.position.offset, 3);
    }

    #[test]
    fn illegal_character() {
        let err = decompose("1 @ 2").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::IllegalCharacter('@'));
        assert_eq!(
            err.position,
            Position {
                offset: 2,
                line: 1,
                column: 2
            }
        );
    }

    #[test]
    fn round_trip() {
        let src = "max(lookup(a.b) , 07:30)\n\t'x  y' * 1_000.5";
        assert_eq!(texts(src).concat(), src);
    }
}
