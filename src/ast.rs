//! # Filter language - Abstract Syntax Tree
//!
//! Types shared by the lexer, the parser and every consumer of parsed
//! filters.
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[node]** - The seven syntax tree node variants and their canonical rendering
//! - **[operators]** - Range comparison operators
//!
//! ## Syntax at a glance
//!
//! ```text
//! status:active                       // status=active
//! status:active owner:alice           // (status=active AND owner=alice)
//! a:1 OR b:2 AND c:3                  // (a=1 OR (b=2 AND c=3))
//! not archived:true                   // NOT archived=true
//! state:(open OR pending)             // state=(open OR pending)
//! fields:{position:(gk OR def)}       // fields={position=(gk OR def)}
//! price>=10 price<20                  // (price>=10 AND price<20)
//! name:jo*                            // name=jo*
//! path:a\:b                           // path=a:b
//! ```
pub mod node;
pub mod operators;
pub mod tokens;

pub use node::{Node, NodeType};
pub use operators::RangeOperator;
pub use tokens::{Token, TokenKind};

/// Byte offset into the original filter text.
pub type Position = usize;
