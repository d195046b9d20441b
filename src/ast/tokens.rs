use std::fmt;

use crate::ast::Position;

/// Kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Lexical error; the token text holds the message
    Error,

    /// End of input
    Eof,

    /// Boolean constant
    ///
    /// # Examples
    /// ```text
    /// true
    /// FALSE
    /// ```
    Bool,

    /// Double-quoted string, or a run of punctuation that is not part of
    /// any other token. Quotes are stripped and escapes resolved.
    ///
    /// # Examples
    /// ```text
    /// "value two"
    /// "2022-02-02T10:30:00.000Z"
    /// ```
    String,

    /// Bare word: letters, digits, underscores and dots, with escapes
    /// resolved.
    ///
    /// # Examples
    /// ```text
    /// field
    /// some.nested.field
    /// field\(x\)
    /// ```
    Identifier,

    /// Numeric literal, kept as written
    ///
    /// # Examples
    /// ```text
    /// 125.25
    /// -20
    /// ```
    Number,

    /// Logical OR (`or`, any case)
    Or,

    /// Logical AND (`and`, any case)
    And,

    /// Negation (`not`, any case)
    Not,

    /// `(`
    LeftParen,

    /// `)`
    RightParen,

    /// `{`
    LeftBrace,

    /// `}`
    RightBrace,

    /// `:`
    Colon,

    /// `*`
    Wildcard,

    /// One of `<`, `<=`, `>`, `>=`
    RangeOperator,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Error => "error",
            TokenKind::Eof => "EOF",
            TokenKind::Bool => "bool",
            TokenKind::String => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::Or => "or",
            TokenKind::And => "and",
            TokenKind::Not => "not",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Colon => ":",
            TokenKind::Wildcard => "*",
            TokenKind::RangeOperator => "range",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,

    /// Byte offset of the token start in the input
    pub position: Position,

    /// Resolved token text
    pub text: String,

    /// Whether whitespace preceded this token
    pub spaced: bool,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position, text: impl Into<String>) -> Self {
        Token {
            kind,
            position,
            text: text.into(),
            spaced: false,
        }
    }

    pub fn eof(position: Position) -> Self {
        Token::new(TokenKind::Eof, position, "")
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl Default for Token {
    fn default() -> Self {
        Token::eof(0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("EOF"),
            TokenKind::Error => f.write_str(&self.text),
            _ if self.text.chars().count() > 10 => {
                let head: String = self.text.chars().take(10).collect();
                write!(f, "{:?}...", head)
            }
            _ => write!(f, "{:?}", self.text),
        }
    }
}
