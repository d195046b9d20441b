//! Parser for KQL-style filter expressions such as
//! `status:active AND (owner:alice OR owner:bob) price>=10`.
//!
//! Filter text is lexed and parsed into a [`Node`] tree, which can be
//! rewritten with a [`NodeMapper`], flattened into a [`Filter`] of
//! clauses, turned into SQL conditions or into an Elasticsearch query.

pub mod ast;
pub mod elastic;
pub mod filter;
pub mod lexer;
pub mod parser;
pub mod sql;
pub mod transform;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{Node, NodeType, Position, RangeOperator, Token, TokenKind};
pub use elastic::{ElasticError, QueryGenerator};
pub use filter::{Clause, Filter, FilterError, Operator, parse, project};
pub use lexer::{LexError, Lexer};
pub use parser::{
    ParseError, ParseOptions, Parser, ParserOption, disable_complex_expressions, parse_ast,
    with_max_complexity, with_max_depth,
};
pub use sql::{ColumnType, SqlError, SqlField, SqlFilter};
pub use transform::{NodeMapper, TransformError, transform_ast};
pub use value::Value;
