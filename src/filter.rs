//! Flat clause lists for consumers that do not want to walk a tree.

use std::{collections::HashMap, fmt};

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{Node, NodeType, RangeOperator},
    parser::{ParseError, disable_complex_expressions, parse_ast},
};

/// Clauses on the same field beyond this count are rejected. Two allows a
/// double-bounded range such as `x>=1 x<5`.
pub const MAX_CLAUSES_PER_FIELD: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unsupported node type {node_type}")]
    UnsupportedNode { node_type: NodeType },

    #[error("range operator {operator} is not allowed in field: {field}")]
    RangeNotAllowed {
        field: String,
        operator: RangeOperator,
    },

    #[error("field {field} is used in more than {max} clauses")]
    TooManyClauses { field: String, max: usize },
}

/// Operator of a [`Clause`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `field:value`
    Equal,
    /// `field:(a OR b)`
    In,
    /// `field>value` and friends
    Range(RangeOperator),
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::In => "IN",
            Operator::Range(op) => op.as_str(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `field operator value(s)` condition. `values` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub field: String,
    pub operator: Operator,
    pub values: Vec<String>,
}

impl Clause {
    pub fn new(field: impl Into<String>, operator: Operator, values: Vec<String>) -> Self {
        Clause {
            field: field.into(),
            operator,
            values,
        }
    }
}

/// Clauses that must all hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub clauses: Vec<Clause>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render the clauses as JSON, e.g.
    /// `[{"field":"a","operator":"IN","values":["x","y"]}]`.
    pub fn to_json(&self) -> serde_json::Value {
        self.clauses
            .iter()
            .map(|clause| {
                serde_json::json!({
                    "field": clause.field,
                    "operator": clause.operator.as_str(),
                    "values": clause.values,
                })
            })
            .collect()
    }
}

/// Parse `input` with complex expressions disabled and project it into a
/// [`Filter`]. Empty or whitespace-only input yields an empty filter.
///
/// # Examples
///
/// ```
/// use kql_filter::filter::{parse, Operator};
///
/// let filter = parse("price>=10 price<20 owner:alice", true).unwrap();
/// assert_eq!(filter.clauses.len(), 3);
/// assert_eq!(filter.clauses[0].operator, Operator::Range(kql_filter::RangeOperator::Gte));
/// ```
pub fn parse(input: &str, enable_range_operator: bool) -> Result<Filter, FilterError> {
    if input.trim().is_empty() {
        return Ok(Filter::default());
    }
    let node = parse_ast(input, &[disable_complex_expressions()])?;
    project(&node, enable_range_operator)
}

/// Project a tree made of `Is`/`Range` clauses joined by AND into a flat
/// [`Filter`].
pub fn project(node: &Node, allow_range: bool) -> Result<Filter, FilterError> {
    let mut clauses = Vec::new();
    collect_clauses(node, allow_range, &mut clauses)?;

    let mut per_field: HashMap<&str, usize> = HashMap::new();
    for clause in &clauses {
        let count = per_field.entry(clause.field.as_str()).or_default();
        *count += 1;
        if *count > MAX_CLAUSES_PER_FIELD {
            debug!(field = %clause.field, "too many clauses on one field");
            return Err(FilterError::TooManyClauses {
                field: clause.field.clone(),
                max: MAX_CLAUSES_PER_FIELD,
            });
        }
    }

    Ok(Filter { clauses })
}

fn collect_clauses(
    node: &Node,
    allow_range: bool,
    clauses: &mut Vec<Clause>,
) -> Result<(), FilterError> {
    match node {
        Node::And { nodes, .. } => {
            for child in nodes {
                collect_clauses(child, allow_range, clauses)?;
            }
            Ok(())
        }
        Node::Is {
            identifier, value, ..
        } => {
            clauses.push(is_clause(identifier, value)?);
            Ok(())
        }
        Node::Range {
            identifier,
            operator,
            value,
            ..
        } => {
            if !allow_range {
                return Err(FilterError::RangeNotAllowed {
                    field: identifier.clone(),
                    operator: *operator,
                });
            }
            let value = literal(value)?;
            clauses.push(Clause::new(
                identifier.as_str(),
                Operator::Range(*operator),
                vec![value],
            ));
            Ok(())
        }
        other => Err(unsupported(other)),
    }
}

fn is_clause(identifier: &str, value: &Node) -> Result<Clause, FilterError> {
    match value {
        Node::Literal { value, .. } => Ok(Clause::new(
            identifier,
            Operator::Equal,
            vec![value.clone()],
        )),
        Node::Or { nodes, .. } => {
            let values = nodes.iter().map(literal).collect::<Result<Vec<_>, _>>()?;
            Ok(Clause::new(identifier, Operator::In, values))
        }
        other => Err(unsupported(other)),
    }
}

fn literal(node: &Node) -> Result<String, FilterError> {
    node.as_literal()
        .map(str::to_string)
        .ok_or_else(|| unsupported(node))
}

fn unsupported(node: &Node) -> FilterError {
    FilterError::UnsupportedNode {
        node_type: node.node_type(),
    }
}
