use std::fmt;

use crate::ast::{Position, RangeOperator};

/// Tag of a [`Node`] variant, for consumers that only need to switch on the
/// shape of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Or,
    And,
    Not,
    Is,
    Range,
    Nested,
    Literal,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Or => "or",
            NodeType::And => "and",
            NodeType::Not => "not",
            NodeType::Is => "is",
            NodeType::Range => "range",
            NodeType::Nested => "nested",
            NodeType::Literal => "literal",
        };
        f.write_str(name)
    }
}

/// A node of the filter syntax tree.
///
/// Every variant keeps the byte offset in the original input where it
/// started. The `Display` form is canonical: parsing the rendered text of a
/// tree and rendering it again yields the same string.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Disjunction of two or more clauses
    ///
    /// # Example
    /// ```text
    /// a:1 OR b:2      // (a=1 OR b=2)
    /// ```
    Or { position: Position, nodes: Vec<Node> },

    /// Conjunction of two or more clauses, explicit or implicit
    ///
    /// # Example
    /// ```text
    /// a:1 b:2         // (a=1 AND b=2)
    /// ```
    And { position: Position, nodes: Vec<Node> },

    /// Negated sub query
    ///
    /// # Example
    /// ```text
    /// not a:1         // NOT a=1
    /// ```
    Not { position: Position, expr: Box<Node> },

    /// Equality clause. The value is a `Literal`, an `Or` of values for
    /// `field:(x OR y)`, or a `Nested` node for `field:{...}`.
    Is {
        position: Position,
        identifier: String,
        value: Box<Node>,
    },

    /// Comparison clause with a single literal value
    ///
    /// # Example
    /// ```text
    /// price>=10       // price>=10
    /// ```
    Range {
        position: Position,
        identifier: String,
        operator: RangeOperator,
        value: Box<Node>,
    },

    /// Sub query scoped under the identifier of the enclosing `Is` node
    ///
    /// # Example
    /// ```text
    /// fields:{position:x}     // fields={position=x}
    /// ```
    Nested { position: Position, expr: Box<Node> },

    /// Unescaped scalar value; `*` wildcard markers are kept as written
    Literal { position: Position, value: String },
}

impl Node {
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Or { .. } => NodeType::Or,
            Node::And { .. } => NodeType::And,
            Node::Not { .. } => NodeType::Not,
            Node::Is { .. } => NodeType::Is,
            Node::Range { .. } => NodeType::Range,
            Node::Nested { .. } => NodeType::Nested,
            Node::Literal { .. } => NodeType::Literal,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Node::Or { position, .. }
            | Node::And { position, .. }
            | Node::Not { position, .. }
            | Node::Is { position, .. }
            | Node::Range { position, .. }
            | Node::Nested { position, .. }
            | Node::Literal { position, .. } => *position,
        }
    }

    /// Canonical text form, same as `to_string()`.
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn literal(position: Position, value: impl Into<String>) -> Self {
        Node::Literal {
            position,
            value: value.into(),
        }
    }

    /// Build an `Or` node, collapsing a single child into itself.
    pub fn or(position: Position, mut nodes: Vec<Node>) -> Self {
        if nodes.len() == 1 {
            return nodes.remove(0);
        }
        Node::Or { position, nodes }
    }

    /// Build an `And` node, collapsing a single child into itself.
    pub fn and(position: Position, mut nodes: Vec<Node>) -> Self {
        if nodes.len() == 1 {
            return nodes.remove(0);
        }
        Node::And { position, nodes }
    }

    /// Literal text when this is a `Literal` node.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Node::Literal { value, .. } => Some(value),
            _ => None,
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, nodes: &[Node], separator: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", node)?;
    }
    f.write_str(")")
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Or { nodes, .. } => write_joined(f, nodes, " OR "),
            Node::And { nodes, .. } => write_joined(f, nodes, " AND "),
            Node::Not { expr, .. } => write!(f, "NOT {}", expr),
            Node::Is {
                identifier, value, ..
            } => write!(f, "{}={}", identifier, value),
            Node::Range {
                identifier,
                operator,
                value,
                ..
            } => write!(f, "{}{}{}", identifier, operator, value),
            Node::Nested { expr, .. } => write!(f, "{{{}}}", expr),
            Node::Literal { value, .. } => f.write_str(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_variants() {
        let is = Node::Is {
            position: 0,
            identifier: "a".into(),
            value: Box::new(Node::literal(2, "1")),
        };
        let range = Node::Range {
            position: 4,
            identifier: "b".into(),
            operator: RangeOperator::Gte,
            value: Box::new(Node::literal(7, "2")),
        };
        let not = Node::Not {
            position: 0,
            expr: Box::new(range.clone()),
        };
        let and = Node::And {
            position: 0,
            nodes: vec![is.clone(), not],
        };
        assert_eq!(and.to_string(), "(a=1 AND NOT b>=2)");

        let nested = Node::Is {
            position: 0,
            identifier: "x".into(),
            value: Box::new(Node::Nested {
                position: 2,
                expr: Box::new(Node::Or {
                    position: 3,
                    nodes: vec![is, range],
                }),
            }),
        };
        assert_eq!(nested.render(), "x={(a=1 OR b>=2)}");
    }

    #[test]
    fn test_single_child_collapses() {
        let node = Node::or(3, vec![Node::literal(3, "x")]);
        assert_eq!(node, Node::literal(3, "x"));
        assert_eq!(node.node_type(), NodeType::Literal);
        assert_eq!(node.position(), 3);
    }
}
