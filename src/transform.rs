//! In-place rewriting of identifiers and literal values in a syntax tree.
//!
//! A mapper lets a consumer rename user-facing field aliases to storage
//! names, or normalize enum values, without re-parsing the filter.

use thiserror::Error;

use crate::ast::Node;

/// Raised when a mapping function rejects an identifier or a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("identifier {identifier}: {reason}")]
    Identifier { identifier: String, reason: String },

    #[error("value {value}: {reason}")]
    Value { value: String, reason: String },
}

type MapFn<'a> = Box<dyn Fn(&str) -> Result<String, String> + 'a>;

/// Applies an identifier function and a value function to every node of a
/// tree. Both default to the identity.
///
/// # Examples
///
/// ```
/// use kql_filter::{parse_ast, transform::NodeMapper};
///
/// let mut node = parse_ast("userId:42 status:ACTIVE", &[]).unwrap();
/// NodeMapper::new()
///     .map_identifiers(|id| if id == "userId" { "user_id".into() } else { id.into() })
///     .map_values(|v| v.to_lowercase())
///     .map(&mut node)
///     .unwrap();
/// assert_eq!(node.to_string(), "(user_id=42 AND status=active)");
/// ```
pub struct NodeMapper<'a> {
    identifier: MapFn<'a>,
    value: MapFn<'a>,
}

impl Default for NodeMapper<'_> {
    fn default() -> Self {
        NodeMapper::new()
    }
}

impl<'a> NodeMapper<'a> {
    pub fn new() -> Self {
        NodeMapper {
            identifier: Box::new(|s| Ok(s.to_string())),
            value: Box::new(|s| Ok(s.to_string())),
        }
    }

    pub fn map_identifiers(self, f: impl Fn(&str) -> String + 'a) -> Self {
        self.try_map_identifiers(move |s| Ok(f(s)))
    }

    pub fn map_values(self, f: impl Fn(&str) -> String + 'a) -> Self {
        self.try_map_values(move |s| Ok(f(s)))
    }

    /// Set an identifier function that may reject its input.
    pub fn try_map_identifiers(mut self, f: impl Fn(&str) -> Result<String, String> + 'a) -> Self {
        self.identifier = Box::new(f);
        self
    }

    /// Set a value function that may reject its input.
    pub fn try_map_values(mut self, f: impl Fn(&str) -> Result<String, String> + 'a) -> Self {
        self.value = Box::new(f);
        self
    }

    /// Rewrite `node` in place. Stops at the first rejected input; nodes
    /// visited before it stay rewritten.
    pub fn map(&self, node: &mut Node) -> Result<(), TransformError> {
        match node {
            Node::Or { nodes, .. } | Node::And { nodes, .. } => {
                for child in nodes {
                    self.map(child)?;
                }
                Ok(())
            }
            Node::Not { expr, .. } | Node::Nested { expr, .. } => self.map(expr),
            Node::Is {
                identifier, value, ..
            }
            | Node::Range {
                identifier, value, ..
            } => {
                let mapped = self.apply_identifier(identifier)?;
                *identifier = mapped;
                self.map(value)
            }
            Node::Literal { value, .. } => {
                let mapped = (self.value)(value).map_err(|reason| TransformError::Value {
                    value: value.clone(),
                    reason,
                })?;
                *value = mapped;
                Ok(())
            }
        }
    }

    fn apply_identifier(&self, identifier: &str) -> Result<String, TransformError> {
        (self.identifier)(identifier).map_err(|reason| TransformError::Identifier {
            identifier: identifier.to_string(),
            reason,
        })
    }
}

/// Rewrite `node` in place with `mapper`.
pub fn transform_ast(node: &mut Node, mapper: &NodeMapper<'_>) -> Result<(), TransformError> {
    mapper.map(node)
}
