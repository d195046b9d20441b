use thiserror::Error;
use tracing::trace;

use crate::ast::{Position, Token, TokenKind};

/// A malformed token: unterminated quote, bad escape, bad number,
/// unbalanced grouping or an unrecognized character.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at pos {position}")]
pub struct LexError {
    pub message: String,
    pub position: Position,
}

impl LexError {
    /// Convert an `Error` token into a `LexError`.
    pub fn from_token(token: &Token) -> Self {
        LexError {
            message: token.text.clone(),
            position: token.position,
        }
    }
}

/// Pull-based tokenizer for filter text.
///
/// Call [`Lexer::next_token`] until it yields an `Eof` or `Error` token.
/// Both are terminal: every call after them yields `Eof`.
pub struct Lexer {
    input: String,
    position: usize,
    start: usize,
    paren_depth: usize,
    brace_depth: usize,
    finished: bool,
}

/// Characters that may be escaped with a backslash inside a bare word.
const ESCAPABLE: &[char] = &['\\', '(', ')', '{', '}', ':', '<', '>', '"', '*'];

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.to_string(),
            position: 0,
            start: 0,
            paren_depth: 0,
            brace_depth: 0,
            finished: false,
        }
    }

    /// Tokenize a whole input, stopping at the first lexical error.
    /// The trailing `Eof` token is not included.
    pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            match token.kind {
                TokenKind::Eof => return Ok(tokens),
                TokenKind::Error => return Err(LexError::from_token(&token)),
                _ => tokens.push(token),
            }
        }
    }

    pub fn next_token(&mut self) -> Token {
        if self.finished {
            return Token::eof(self.position);
        }

        let spaced = self.skip_whitespace();
        let mut token = self.lex_token();
        token.spaced = spaced;

        if matches!(token.kind, TokenKind::Eof | TokenKind::Error) {
            self.finished = true;
        }
        trace!(kind = %token.kind, position = token.position, text = %token.text, "token");
        token
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input[self.position..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    /// Consume the current char if it is `expected`.
    fn accept(&mut self, expected: char) -> bool {
        if self.current_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn accept_digits(&mut self) -> usize {
        let mut digits = 0;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                digits += 1;
            } else if ch != '_' {
                break;
            }
            self.advance();
        }
        digits
    }

    /// Skip whitespace, reporting whether any was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let before = self.position;
        while let Some(ch) = self.current_char() {
            if is_space(ch) {
                self.advance();
            } else {
                break;
            }
        }
        self.position != before
    }

    fn emit(&mut self, kind: TokenKind, text: impl Into<String>) -> Token {
        let token = Token::new(kind, self.start, text);
        self.start = self.position;
        token
    }

    fn emit_slice(&mut self, kind: TokenKind) -> Token {
        let text = self.input[self.start..self.position].to_string();
        self.emit(kind, text)
    }

    fn error(&mut self, message: impl Into<String>) -> Token {
        self.emit(TokenKind::Error, message)
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        self.advance();
        self.emit_slice(kind)
    }

    fn lex_token(&mut self) -> Token {
        self.start = self.position;

        let Some(ch) = self.current_char() else {
            if self.paren_depth != 0 {
                return self.error("unclosed left parenthesis");
            }
            if self.brace_depth != 0 {
                return self.error("unclosed left brace");
            }
            return self.emit(TokenKind::Eof, "");
        };

        match ch {
            ':' => self.single(TokenKind::Colon),
            '*' => self.single(TokenKind::Wildcard),
            '"' => self.read_quote(),
            '<' | '>' => {
                self.advance();
                self.accept('=');
                self.emit_slice(TokenKind::RangeOperator)
            }
            '(' => {
                self.paren_depth += 1;
                self.single(TokenKind::LeftParen)
            }
            ')' => {
                self.advance();
                if self.paren_depth == 0 {
                    return self.error("unexpected right parenthesis");
                }
                self.paren_depth -= 1;
                self.emit_slice(TokenKind::RightParen)
            }
            '{' => {
                self.brace_depth += 1;
                self.single(TokenKind::LeftBrace)
            }
            '}' => {
                self.advance();
                if self.brace_depth == 0 {
                    return self.error("unexpected right brace");
                }
                self.brace_depth -= 1;
                self.emit_slice(TokenKind::RightBrace)
            }
            '+' | '-' => self.read_number(),
            '.' if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            '.' => self.read_identifier(),
            c if c.is_ascii_digit() => self.read_number_or_identifier(),
            c if is_word_char(c) || c == '\\' => self.read_identifier(),
            c if !c.is_control() => self.read_text(),
            c => self.error(format!(
                "unrecognized character in the input: {}",
                describe_char(c)
            )),
        }
    }

    fn read_quote(&mut self) -> Token {
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            match self.current_char() {
                None | Some('\n') => return self.error("unterminated quoted string"),
                Some('"') => {
                    self.advance();
                    return self.emit(TokenKind::String, value);
                }
                Some('\\') => {
                    self.advance();
                    match self.current_char() {
                        None | Some('\n') => return self.error("unterminated quoted string"),
                        Some(escaped) => {
                            value.push(escaped);
                            self.advance();
                        }
                    }
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
            }
        }
    }

    /// Scan an optionally signed decimal number. Returns the count of digits.
    fn scan_number(&mut self) -> usize {
        if !self.accept('+') {
            self.accept('-');
        }
        let mut digits = self.accept_digits();
        if self.accept('.') {
            digits += self.accept_digits();
        }
        digits
    }

    fn read_number(&mut self) -> Token {
        let digits = self.scan_number();
        if self.current_char().is_some_and(is_word_char) {
            self.advance();
            return self.bad_number();
        }
        if digits == 0 {
            return self.bad_number();
        }
        self.emit_slice(TokenKind::Number)
    }

    fn bad_number(&mut self) -> Token {
        let text = &self.input[self.start..self.position];
        let message = format!("bad number syntax: {:?}", text);
        self.error(message)
    }

    /// Words starting with a digit are numbers only when nothing
    /// alphanumeric follows the number, e.g. `2Ubp5J` is an identifier.
    fn read_number_or_identifier(&mut self) -> Token {
        self.scan_number();
        if self.current_char().is_some_and(is_word_char) {
            self.position = self.start;
            return self.read_identifier();
        }
        self.emit_slice(TokenKind::Number)
    }

    fn read_identifier(&mut self) -> Token {
        let mut value = String::new();
        let mut escaped = false;

        loop {
            match self.current_char() {
                Some(ch) if is_word_char(ch) || ch == '.' => {
                    value.push(ch);
                    self.advance();
                }
                Some('\\') => {
                    self.advance();
                    escaped = true;
                    if !self.read_escape(&mut value) {
                        return self.error("invalid escape sequence");
                    }
                }
                next => {
                    if !next.is_none_or(is_terminator) {
                        let bad = next.map(describe_char).unwrap_or_default();
                        self.advance();
                        return self.error(format!("bad character {}", bad));
                    }
                    if !escaped {
                        if let Some(kind) = keyword(&value) {
                            return self.emit_slice(kind);
                        }
                    }
                    return self.emit(TokenKind::Identifier, value);
                }
            }
        }
    }

    /// Resolve the escape following a consumed backslash into `value`.
    fn read_escape(&mut self, value: &mut String) -> bool {
        let Some(ch) = self.current_char() else {
            return false;
        };
        self.advance();
        if ESCAPABLE.contains(&ch) {
            value.push(ch);
            return true;
        }
        let (rest, word): (&[char], &str) = match ch {
            'a' => (&['n', 'd'], "and"),
            'o' => (&['r'], "or"),
            'n' => (&['o', 't'], "not"),
            _ => return false,
        };
        if rest.iter().all(|expected| self.accept(*expected)) {
            value.push_str(word);
            true
        } else {
            false
        }
    }

    fn read_text(&mut self) -> Token {
        while let Some(ch) = self.current_char() {
            if is_space(ch) || ch.is_control() || is_structural(ch) {
                break;
            }
            self.advance();
        }
        self.emit_slice(TokenKind::String)
    }
}

fn keyword(word: &str) -> Option<TokenKind> {
    match word.to_lowercase().as_str() {
        "or" => Some(TokenKind::Or),
        "and" => Some(TokenKind::And),
        "not" => Some(TokenKind::Not),
        "true" | "false" => Some(TokenKind::Bool),
        _ => None,
    }
}

fn is_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

/// Characters that may directly follow a bare word.
fn is_terminator(ch: char) -> bool {
    is_space(ch) || matches!(ch, '*' | '.' | '<' | '>' | ':' | '(' | ')' | '{' | '}' | '\\')
}

fn is_structural(ch: char) -> bool {
    matches!(ch, ':' | '(' | ')' | '{' | '}' | '*' | '<' | '>' | '"' | '\\')
}

fn describe_char(ch: char) -> String {
    if ch.is_control() {
        format!("U+{:04X}", ch as u32)
    } else {
        format!("U+{:04X} '{}'", ch as u32, ch)
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and OR Not true FALSE");
    assert_eq!(lexer.next_token().kind, TokenKind::And);
    assert_eq!(lexer.next_token().kind, TokenKind::Or);
    assert_eq!(lexer.next_token().kind, TokenKind::Not);
    assert_eq!(lexer.next_token().kind, TokenKind::Bool);
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::Bool);
    assert_eq!(token.text, "FALSE");
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn test_terminal_after_error() {
    let mut lexer = Lexer::new(") a:b");
    assert_eq!(lexer.next_token().kind, TokenKind::Error);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}
