//! Recursive descent parser for filter text.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//!   top_level      = or_expr { or_expr } ;            (implicit AND)
//!   or_expr        = and_expr { "OR" and_expr } ;
//!   and_expr       = not_expr { "AND" not_expr } ;
//!   not_expr       = [ "NOT" ] sub_query ;
//!   sub_query      = "(" or_expr ")" | expression ;
//!   expression     = term ( ":" list_of_values | range_op value )
//!                  | term | bool ;
//!   list_of_values = "{" or_expr "}" | "(" or_expr ")" | value ;
//!   value          = adjacent run of string, identifier, number, bool, "*" ;
//! ```

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{Node, Position, RangeOperator, Token, TokenKind},
    lexer::{LexError, Lexer},
};

pub const DEFAULT_MAX_DEPTH: usize = 20;
pub const DEFAULT_MAX_COMPLEXITY: usize = 20;

/// Token kinds that may form part of a value.
const VALUE_KINDS: &[TokenKind] = &[
    TokenKind::String,
    TokenKind::Identifier,
    TokenKind::Number,
    TokenKind::Bool,
    TokenKind::Wildcard,
];

/// Errors raised while parsing filter text. Every variant carries the byte
/// position of the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Malformed token
    #[error("parser error: {0}")]
    Lex(#[from] LexError),

    /// Token that does not fit the grammar at this point
    #[error("parser error: unexpected {found} in {context} at pos {position}")]
    Unexpected {
        found: String,
        context: &'static str,
        position: Position,
    },

    #[error("parser error: value expected at pos {position}")]
    ValueExpected { position: Position },

    /// OR, NOT, grouping or a value list while complex expressions are disabled
    #[error("parser error: complex expressions are not allowed at pos {position}")]
    ComplexExpression { position: Position },

    #[error("parser error: maximum nesting depth exceeded at pos {position}")]
    DepthExceeded { max_depth: usize, position: Position },

    #[error("parser error: maximum complexity exceeded at pos {position}")]
    ComplexityExceeded {
        max_complexity: usize,
        position: Position,
    },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(e) => e.position,
            ParseError::Unexpected { position, .. }
            | ParseError::ValueExpected { position }
            | ParseError::ComplexExpression { position }
            | ParseError::DepthExceeded { position, .. }
            | ParseError::ComplexityExceeded { position, .. } => *position,
        }
    }

    /// Whether the input was rejected for exceeding a resource limit.
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(
            self,
            ParseError::DepthExceeded { .. } | ParseError::ComplexityExceeded { .. }
        )
    }
}

/// Limits and restrictions applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject OR, NOT, grouping parentheses and `{}`/`()` value lists
    pub disable_complex_expressions: bool,

    /// Maximum nesting levels through parentheses and braces; 0 is unlimited
    pub max_depth: usize,

    /// Maximum count of explicit AND/OR operators
    pub max_complexity: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            disable_complex_expressions: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_complexity: DEFAULT_MAX_COMPLEXITY,
        }
    }
}

impl ParseOptions {
    pub fn from_options(options: &[ParserOption]) -> Self {
        let mut parse_options = ParseOptions::default();
        for option in options {
            option.apply(&mut parse_options);
        }
        parse_options
    }
}

/// A single parser setting, applied on top of [`ParseOptions::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserOption {
    DisableComplexExpressions,
    MaxDepth(usize),
    MaxComplexity(usize),
}

impl ParserOption {
    fn apply(self, options: &mut ParseOptions) {
        match self {
            ParserOption::DisableComplexExpressions => options.disable_complex_expressions = true,
            ParserOption::MaxDepth(n) => options.max_depth = n,
            ParserOption::MaxComplexity(n) => options.max_complexity = n,
        }
    }
}

/// Only accept `field:value` and range clauses joined by AND.
pub fn disable_complex_expressions() -> ParserOption {
    ParserOption::DisableComplexExpressions
}

pub fn with_max_depth(max_depth: usize) -> ParserOption {
    ParserOption::MaxDepth(max_depth)
}

pub fn with_max_complexity(max_complexity: usize) -> ParserOption {
    ParserOption::MaxComplexity(max_complexity)
}

/// Parse filter text into a syntax tree.
///
/// # Examples
///
/// ```
/// use kql_filter::parser::parse_ast;
///
/// let node = parse_ast("a:1 OR b:2 AND c:3", &[]).unwrap();
/// assert_eq!(node.to_string(), "(a=1 OR (b=2 AND c=3))");
/// ```
pub fn parse_ast(input: &str, options: &[ParserOption]) -> Result<Node, ParseError> {
    let options = ParseOptions::from_options(options);
    debug!(len = input.len(), ?options, "parsing filter");

    let mut parser = Parser::with_options(Lexer::new(input), options);
    match parser.parse() {
        Ok(node) => {
            debug!(node = %node.node_type(), "parsed filter");
            Ok(node)
        }
        Err(error) => {
            debug!(%error, "filter rejected");
            Err(error)
        }
    }
}

/// Parser state for a single input. Not reusable across inputs.
pub struct Parser {
    lexer: Lexer,
    tokens: [Token; 3],
    peek_count: usize,
    options: ParseOptions,
    depth: usize,
    complexity: usize,
    in_value_list: bool,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        Parser::with_options(lexer, ParseOptions::default())
    }

    pub fn with_options(lexer: Lexer, options: ParseOptions) -> Self {
        Parser {
            lexer,
            tokens: Default::default(),
            peek_count: 0,
            options,
            depth: 0,
            complexity: 0,
            in_value_list: false,
        }
    }

    fn next(&mut self) -> Token {
        if self.peek_count > 0 {
            self.peek_count -= 1;
        } else {
            self.tokens[0] = self.lexer.next_token();
        }
        self.tokens[self.peek_count].clone()
    }

    /// Push the last token back onto the input.
    fn backup(&mut self) {
        self.peek_count += 1;
    }

    fn peek(&mut self) -> &Token {
        if self.peek_count > 0 {
            return &self.tokens[self.peek_count - 1];
        }
        self.peek_count = 1;
        self.tokens[0] = self.lexer.next_token();
        &self.tokens[0]
    }

    fn unexpected(&self, token: &Token, context: &'static str) -> ParseError {
        if token.is(TokenKind::Error) {
            return ParseError::Lex(LexError::from_token(token));
        }
        ParseError::Unexpected {
            found: token.to_string(),
            context,
            position: token.position,
        }
    }

    fn expect(&mut self, expected: TokenKind, context: &'static str) -> Result<Token, ParseError> {
        self.expect_one_of(&[expected], context)
    }

    fn expect_one_of(
        &mut self,
        expected: &[TokenKind],
        context: &'static str,
    ) -> Result<Token, ParseError> {
        let token = self.next();
        if expected.contains(&token.kind) {
            Ok(token)
        } else {
            Err(self.unexpected(&token, context))
        }
    }

    fn check_complex(&self, position: Position) -> Result<(), ParseError> {
        if self.options.disable_complex_expressions {
            return Err(ParseError::ComplexExpression { position });
        }
        Ok(())
    }

    fn count_operator(&mut self, position: Position) -> Result<(), ParseError> {
        self.complexity += 1;
        if self.complexity > self.options.max_complexity {
            debug!(max = self.options.max_complexity, position, "complexity limit hit");
            return Err(ParseError::ComplexityExceeded {
                max_complexity: self.options.max_complexity,
                position,
            });
        }
        Ok(())
    }

    fn enter_group(&mut self, position: Position) -> Result<(), ParseError> {
        self.depth += 1;
        let max_depth = self.options.max_depth;
        if max_depth > 0 && self.depth + 1 > max_depth {
            debug!(max = max_depth, position, "depth limit hit");
            return Err(ParseError::DepthExceeded {
                max_depth,
                position,
            });
        }
        Ok(())
    }

    fn leave_group(&mut self) {
        self.depth -= 1;
    }

    /// Parse the whole input. Several top-level clauses without an explicit
    /// operator between them are joined by an implicit AND.
    pub fn parse(&mut self) -> Result<Node, ParseError> {
        self.depth = 0;
        self.complexity = 0;

        let position = self.peek().position;
        let head = self.parse_or()?;
        if self.peek().is(TokenKind::Eof) {
            return Ok(head);
        }

        let mut nodes = vec![head];
        while !self.peek().is(TokenKind::Eof) {
            nodes.push(self.parse_or()?);
        }
        Ok(Node::And { position, nodes })
    }

    fn parse_or(&mut self) -> Result<Node, ParseError> {
        let position = self.peek().position;
        let mut nodes = vec![self.parse_and()?];

        while self.peek().is(TokenKind::Or) {
            let or = self.next();
            self.check_complex(or.position)?;
            self.count_operator(or.position)?;
            nodes.push(self.parse_and()?);
        }
        Ok(Node::or(position, nodes))
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        let position = self.peek().position;
        let mut nodes = vec![self.parse_not()?];

        while self.peek().is(TokenKind::And) {
            let and = self.next();
            self.count_operator(and.position)?;
            nodes.push(self.parse_not()?);
        }
        Ok(Node::and(position, nodes))
    }

    fn parse_not(&mut self) -> Result<Node, ParseError> {
        if !self.peek().is(TokenKind::Not) {
            return self.parse_sub_query();
        }

        let not = self.next();
        self.check_complex(not.position)?;
        let expr = self.parse_sub_query()?;
        Ok(Node::Not {
            position: not.position,
            expr: Box::new(expr),
        })
    }

    fn parse_sub_query(&mut self) -> Result<Node, ParseError> {
        if !self.peek().is(TokenKind::LeftParen) {
            return self.parse_expression();
        }

        let paren = self.next();
        self.check_complex(paren.position)?;
        self.enter_group(paren.position)?;
        let node = self.parse_or()?;
        self.expect(TokenKind::RightParen, "subquery")?;
        self.leave_group();
        Ok(node)
    }

    fn parse_expression(&mut self) -> Result<Node, ParseError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Identifier | TokenKind::String | TokenKind::Number => {
                let term = self.next();
                let op = self.next();
                match op.kind {
                    TokenKind::Colon => {
                        let value = self.parse_list_of_values()?;
                        Ok(Node::Is {
                            position: term.position,
                            identifier: term.text,
                            value: Box::new(value),
                        })
                    }
                    TokenKind::RangeOperator => {
                        let operator = RangeOperator::from_symbol(&op.text)
                            .ok_or_else(|| self.unexpected(&op, "range operator"))?;
                        let value = self.parse_value()?;
                        Ok(Node::Range {
                            position: term.position,
                            identifier: term.text,
                            operator,
                            value: Box::new(value),
                        })
                    }
                    _ => {
                        self.backup();
                        self.parse_bare_literal(term)
                    }
                }
            }
            TokenKind::Bool => {
                let value = self.next();
                self.parse_bare_literal(value)
            }
            TokenKind::Wildcard if self.in_value_list => {
                let wildcard = self.next();
                self.parse_value_run(wildcard)
            }
            _ => Err(self.unexpected(&token, "expression")),
        }
    }

    /// Inside a `()` value list, a bare literal may carry wildcards.
    fn parse_bare_literal(&mut self, token: Token) -> Result<Node, ParseError> {
        if self.in_value_list {
            return self.parse_value_run(token);
        }
        Ok(Node::literal(token.position, token.text))
    }

    fn parse_list_of_values(&mut self) -> Result<Node, ParseError> {
        let (kind, position) = {
            let token = self.peek();
            (token.kind, token.position)
        };

        match kind {
            TokenKind::LeftBrace => {
                self.check_complex(position)?;
                self.enter_group(position)?;
                self.next();

                let in_value_list = std::mem::replace(&mut self.in_value_list, false);
                let node = self.parse_or()?;
                self.expect(TokenKind::RightBrace, "list of values")?;
                self.in_value_list = in_value_list;

                self.leave_group();
                Ok(Node::Nested {
                    position,
                    expr: Box::new(node),
                })
            }
            TokenKind::LeftParen => {
                self.check_complex(position)?;
                self.enter_group(position)?;
                self.next();

                let in_value_list = std::mem::replace(&mut self.in_value_list, true);
                let node = self.parse_or()?;
                self.expect(TokenKind::RightParen, "list of values")?;
                self.in_value_list = in_value_list;

                self.leave_group();
                Ok(node)
            }
            _ => self.parse_value(),
        }
    }

    fn parse_value(&mut self) -> Result<Node, ParseError> {
        let (kind, position) = {
            let token = self.peek();
            (token.kind, token.position)
        };
        if is_value_terminator(kind) {
            return Err(ParseError::ValueExpected { position });
        }

        let first = self.expect_one_of(VALUE_KINDS, "value")?;
        self.parse_value_run(first)
    }

    /// Concatenate the tokens directly following `first` with no whitespace
    /// in between, e.g. `*`, `abc`, `*` into `*abc*`.
    fn parse_value_run(&mut self, first: Token) -> Result<Node, ParseError> {
        let position = first.position;
        let mut value = first.text;

        loop {
            let next = self.peek();
            if next.spaced || is_value_terminator(next.kind) {
                break;
            }
            let token = self.expect_one_of(VALUE_KINDS, "value")?;
            value.push_str(&token.text);
        }
        Ok(Node::literal(position, value))
    }
}

fn is_value_terminator(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Eof
            | TokenKind::LeftParen
            | TokenKind::RightParen
            | TokenKind::LeftBrace
            | TokenKind::RightBrace
    )
}
