//! Elasticsearch query DSL generation from a syntax tree.
//!
//! The generated JSON uses `bool`/`term`/`terms`/`range` queries only:
//!
//! ```text
//! type_id:team                       {"term":{"type_id":{"value":"team"}}}
//! type_id:(team OR player)           {"terms":{"type_id":["team","player"]}}
//! fields:{position:x}                {"term":{"fields.position":{"value":"x"}}}
//! year<2000                          {"range":{"year":{"lt":2000}}}
//! ```

use jiff::Timestamp;
use regex::Regex;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::trace;

use crate::ast::{Node, RangeOperator};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElasticError {
    /// The field validator refused a field
    #[error("{field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// A value list contains something other than plain values
    #[error("{field}: invalid syntax")]
    InvalidSyntax { field: String },

    #[error("{field}: expected literal node")]
    ExpectedLiteral { field: String },

    #[error("{field}: expected number or date literal")]
    ExpectedNumberOrDate { field: String },

    /// A literal or nested node outside of a clause
    #[error("unexpected node type: {node_type}")]
    UnexpectedNode { node_type: String },
}

type FieldValidator = Box<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Converts syntax trees into query DSL JSON.
///
/// # Examples
///
/// ```
/// use kql_filter::{elastic::QueryGenerator, parse_ast};
///
/// let node = parse_ast("type_id:team", &[]).unwrap();
/// let query = QueryGenerator::new().convert(&node).unwrap();
/// assert_eq!(query.to_string(), r#"{"term":{"type_id":{"value":"team"}}}"#);
/// ```
pub struct QueryGenerator {
    validate_field: FieldValidator,
}

impl Default for QueryGenerator {
    fn default() -> Self {
        QueryGenerator::new()
    }
}

impl QueryGenerator {
    /// A generator that accepts every field.
    pub fn new() -> Self {
        QueryGenerator {
            validate_field: Box::new(|_| Ok(())),
        }
    }

    /// Check each field name, with nested prefixes applied, before it is
    /// used in a query.
    pub fn with_field_validator(
        mut self,
        validator: impl Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validate_field = Box::new(validator);
        self
    }

    /// Only accept fields matching `pattern`.
    pub fn with_allowed_fields(self, pattern: Regex) -> Self {
        self.with_field_validator(move |field| {
            if pattern.is_match(field) {
                Ok(())
            } else {
                Err("field is not allowed".to_string())
            }
        })
    }

    pub fn convert(&self, node: &Node) -> Result<Value, ElasticError> {
        self.convert_node(node, "")
    }

    fn convert_node(&self, node: &Node, prefix: &str) -> Result<Value, ElasticError> {
        match node {
            Node::And { nodes, .. } => {
                let queries = self.convert_all(nodes, prefix)?;
                Ok(json!({ "bool": { "must": queries } }))
            }
            Node::Or { nodes, .. } => {
                let queries = self.convert_all(nodes, prefix)?;
                Ok(json!({ "bool": { "should": queries } }))
            }
            Node::Not { expr, .. } => {
                let query = self.convert_node(expr, prefix)?;
                Ok(json!({ "bool": { "must_not": [query] } }))
            }
            Node::Is {
                identifier, value, ..
            } => {
                let field = format!("{}{}", prefix, identifier);

                // x:{y:z} queries the field x.y
                if let Node::Nested { expr, .. } = value.as_ref() {
                    trace!(%field, "descending into nested clause");
                    return self.convert_node(expr, &format!("{}.", field));
                }

                self.validate(&field)?;
                match value.as_ref() {
                    Node::Or { nodes, .. } => {
                        let values = nodes
                            .iter()
                            .map(|child| {
                                child.as_literal().ok_or_else(|| ElasticError::InvalidSyntax {
                                    field: field.clone(),
                                })
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(json!({ "terms": { field: values } }))
                    }
                    Node::Literal { value, .. } => {
                        Ok(json!({ "term": { field: { "value": value } } }))
                    }
                    _ => Err(ElasticError::ExpectedLiteral { field }),
                }
            }
            Node::Range {
                identifier,
                operator,
                value,
                ..
            } => {
                let field = format!("{}{}", prefix, identifier);
                self.validate(&field)?;

                let Some(literal) = value.as_literal() else {
                    return Err(ElasticError::ExpectedLiteral { field });
                };
                let Some(bound) = range_bound(literal) else {
                    return Err(ElasticError::ExpectedNumberOrDate { field });
                };
                Ok(json!({ "range": { field: { range_key(*operator): bound } } }))
            }
            Node::Literal { .. } | Node::Nested { .. } => Err(ElasticError::UnexpectedNode {
                node_type: node.node_type().to_string(),
            }),
        }
    }

    fn convert_all(&self, nodes: &[Node], prefix: &str) -> Result<Vec<Value>, ElasticError> {
        nodes
            .iter()
            .map(|child| self.convert_node(child, prefix))
            .collect()
    }

    fn validate(&self, field: &str) -> Result<(), ElasticError> {
        (self.validate_field)(field).map_err(|reason| ElasticError::InvalidField {
            field: field.to_string(),
            reason,
        })
    }
}

fn range_key(operator: RangeOperator) -> &'static str {
    match operator {
        RangeOperator::Gt => "gt",
        RangeOperator::Gte => "gte",
        RangeOperator::Lt => "lt",
        RangeOperator::Lte => "lte",
    }
}

/// Numbers become JSON numbers; RFC 3339 timestamps are passed through as
/// written.
fn range_bound(literal: &str) -> Option<Value> {
    if let Ok(n) = literal.parse::<i64>() {
        return Some(Value::from(n));
    }
    if let Ok(f) = literal.parse::<f64>()
        && let Some(n) = serde_json::Number::from_f64(f)
    {
        return Some(Value::Number(n));
    }
    literal
        .parse::<Timestamp>()
        .ok()
        .map(|_| Value::String(literal.to_string()))
}
