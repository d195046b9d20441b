use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;

/// A typed SQL parameter produced from a filter value.
///
/// # Examples
///
/// ```
/// use kql_filter::Value;
///
/// let id = Value::Int64(42);
/// let name = Value::String("alice".to_string());
/// assert_eq!(id.type_name(), "INT64");
/// assert_eq!(name.to_string(), "alice");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),

    Int64(i64),

    Float64(f64),

    /// Exact decimal, for NUMERIC columns
    Numeric(Decimal),

    Bool(bool),

    /// RFC 3339 timestamp
    Timestamp(Timestamp),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "STRING",
            Value::Int64(_) => "INT64",
            Value::Float64(_) => "FLOAT64",
            Value::Numeric(_) => "NUMERIC",
            Value::Bool(_) => "BOOL",
            Value::Timestamp(_) => "TIMESTAMP",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// JSON form, used when printing parameters.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int64(n) => serde_json::Value::from(*n),
            Value::Float64(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Numeric(d) => serde_json::Value::String(d.to_string()),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Timestamp(t) => serde_json::Value::String(t.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int64(n) => write!(f, "{}", n),
            Value::Float64(n) => write!(f, "{}", n),
            Value::Numeric(d) => write!(f, "{}", d),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Timestamp(t) => write!(f, "{}", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json() {
        let ts: Timestamp = "2023-06-01T23:00:00Z".parse().unwrap();
        assert_eq!(Value::Int64(-3).to_json(), serde_json::json!(-3));
        assert_eq!(Value::Bool(true).to_json(), serde_json::json!(true));
        assert_eq!(
            Value::Numeric(Decimal::new(1050, 2)).to_json(),
            serde_json::json!("10.50")
        );
        assert_eq!(
            Value::Timestamp(ts).to_json(),
            serde_json::json!("2023-06-01T23:00:00Z")
        );
        assert_eq!(Value::Float64(f64::NAN).to_json(), serde_json::Value::Null);
    }

    #[test]
    fn test_as_str() {
        assert_eq!(Value::String("x".into()).as_str(), Some("x"));
        assert_eq!(Value::Int64(1).as_str(), None);
    }
}
