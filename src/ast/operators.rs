use std::fmt;

/// Comparison operator of a range clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOperator {
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Gte,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Lte,
}

impl RangeOperator {
    /// Map a lexed range symbol to its operator.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(RangeOperator::Gt),
            ">=" => Some(RangeOperator::Gte),
            "<" => Some(RangeOperator::Lt),
            "<=" => Some(RangeOperator::Lte),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RangeOperator::Gt => ">",
            RangeOperator::Gte => ">=",
            RangeOperator::Lt => "<",
            RangeOperator::Lte => "<=",
        }
    }
}

impl fmt::Display for RangeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
