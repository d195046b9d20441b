//! Conversion of a [`Filter`] into SQL conditions with named parameters.
//!
//! Given the filter `userId:12345 email:john*` and the fields
//!
//! ```text
//! userId -> column user_id, INT64
//! email  -> STRING, prefix match allowed
//! ```
//!
//! the conditions are `["user_id=@KQL0", "email LIKE @KQL1"]` with params
//! `{KQL0: 12345, KQL1: "john%"}`. Only fields present in the map can be
//! queried.

use std::{collections::HashMap, fmt, sync::Arc};

use jiff::Timestamp;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    filter::{Clause, Filter, Operator},
    value::Value,
};

const PARAM_PREFIX: &str = "KQL";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    #[error("unknown field: {field}")]
    UnknownField { field: String },

    #[error("field {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("field {field}: multiple values are not allowed")]
    MultipleValues { field: String },

    #[error("operator {operator} doesn't support multiple values in field: {field}")]
    OperatorMultipleValues { field: String, operator: Operator },

    #[error("operator {operator} not supported for field type {column_type}")]
    UnsupportedOperator {
        field: String,
        operator: Operator,
        column_type: ColumnType,
    },
}

/// Storage type of a column; decides how values are converted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ColumnType {
    #[default]
    String,
    Int64,
    Float64,
    Numeric,
    Bool,
    Timestamp,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::String => "STRING",
            ColumnType::Int64 => "INT64",
            ColumnType::Float64 => "FLOAT64",
            ColumnType::Numeric => "NUMERIC",
            ColumnType::Bool => "BOOL",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "STRING" => Some(ColumnType::String),
            "INT64" | "INT" => Some(ColumnType::Int64),
            "FLOAT64" | "FLOAT" | "DOUBLE" => Some(ColumnType::Float64),
            "NUMERIC" | "DECIMAL" => Some(ColumnType::Numeric),
            "BOOL" | "BOOLEAN" => Some(ColumnType::Bool),
            "TIMESTAMP" => Some(ColumnType::Timestamp),
            _ => None,
        }
    }

    fn supports_range(self) -> bool {
        matches!(
            self,
            ColumnType::Int64 | ColumnType::Float64 | ColumnType::Numeric | ColumnType::Timestamp
        )
    }

    /// Convert raw filter text into a typed value.
    pub fn convert(self, value: &str) -> Result<Value, String> {
        let invalid = |e: &dyn fmt::Display| format!("invalid {} value: {}", self.as_str(), e);
        match self {
            ColumnType::String => Ok(Value::String(value.to_string())),
            ColumnType::Int64 => value.parse::<i64>().map(Value::Int64).map_err(|e| invalid(&e)),
            ColumnType::Float64 => value
                .parse::<f64>()
                .map(Value::Float64)
                .map_err(|e| invalid(&e)),
            ColumnType::Numeric => value
                .parse::<Decimal>()
                .map(Value::Numeric)
                .map_err(|e| invalid(&e)),
            ColumnType::Bool => parse_bool(value)
                .map(Value::Bool)
                .ok_or_else(|| invalid(&format_args!("{:?}", value))),
            ColumnType::Timestamp => value
                .parse::<Timestamp>()
                .map(Value::Timestamp)
                .map_err(|e| invalid(&e)),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Maps user input to its stored form before type conversion. Returning an
/// error rejects the value.
pub type ValueMapper = Arc<dyn Fn(&str) -> Result<String, String> + Send + Sync>;

/// How a queryable field maps onto a column.
#[derive(Clone, Default)]
pub struct SqlField {
    /// Column name; the field name when `None`
    pub column_name: Option<String>,
    pub column_type: ColumnType,
    /// Turn a trailing `*` on string values into a `LIKE` prefix match
    pub allow_prefix_match: bool,
    /// Accept `field:(a OR b)` lists
    pub allow_multiple_values: bool,
    pub map_value: Option<ValueMapper>,
}

impl fmt::Debug for SqlField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlField")
            .field("column_name", &self.column_name)
            .field("column_type", &self.column_type)
            .field("allow_prefix_match", &self.allow_prefix_match)
            .field("allow_multiple_values", &self.allow_multiple_values)
            .field("map_value", &self.map_value.is_some())
            .finish()
    }
}

impl SqlField {
    pub fn new(column_type: ColumnType) -> Self {
        SqlField {
            column_type,
            ..SqlField::default()
        }
    }

    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column_name = Some(name.into());
        self
    }

    pub fn prefix_match(mut self) -> Self {
        self.allow_prefix_match = true;
        self
    }

    pub fn multiple_values(mut self) -> Self {
        self.allow_multiple_values = true;
        self
    }

    pub fn map_value(
        mut self,
        f: impl Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    ) -> Self {
        self.map_value = Some(Arc::new(f));
        self
    }

    fn mapped_values(&self, clause: &Clause) -> Result<Vec<String>, SqlError> {
        let Some(map_value) = &self.map_value else {
            return Ok(clause.values.clone());
        };
        clause
            .values
            .iter()
            .map(|value| {
                map_value(value).map_err(|reason| SqlError::InvalidValue {
                    field: clause.field.clone(),
                    reason,
                })
            })
            .collect()
    }

    fn convert(&self, field: &str, value: &str) -> Result<Value, SqlError> {
        self.column_type
            .convert(value)
            .map_err(|reason| SqlError::InvalidValue {
                field: field.to_string(),
                reason,
            })
    }
}

/// SQL conditions to AND into a WHERE clause, with their parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFilter {
    pub conditions: Vec<String>,
    pub params: HashMap<String, Value>,
}

impl SqlFilter {
    /// `(c1 AND c2)`, or an empty string without conditions.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            return String::new();
        }
        format!("({})", self.conditions.join(" AND "))
    }

    fn bind(&mut self, value: Value) -> String {
        let name = format!("{}{}", PARAM_PREFIX, self.params.len());
        let placeholder = format!("@{}", name);
        self.params.insert(name, value);
        placeholder
    }
}

impl Filter {
    /// Convert the clauses into SQL conditions. `fields` lists the fields a
    /// user may query, keyed by field name.
    pub fn to_sql(&self, fields: &HashMap<String, SqlField>) -> Result<SqlFilter, SqlError> {
        let mut sql = SqlFilter::default();

        for clause in &self.clauses {
            let field = fields
                .get(&clause.field)
                .ok_or_else(|| SqlError::UnknownField {
                    field: clause.field.clone(),
                })?;
            let column = field.column_name.as_deref().unwrap_or(&clause.field);
            let values = field.mapped_values(clause)?;

            if values.len() > 1 && !field.allow_multiple_values {
                return Err(SqlError::MultipleValues {
                    field: clause.field.clone(),
                });
            }
            if values.len() > 1 && clause.operator != Operator::In {
                return Err(SqlError::OperatorMultipleValues {
                    field: clause.field.clone(),
                    operator: clause.operator,
                });
            }

            let unsupported = || SqlError::UnsupportedOperator {
                field: clause.field.clone(),
                operator: clause.operator,
                column_type: field.column_type,
            };

            let condition = match clause.operator {
                Operator::In => {
                    if field.column_type == ColumnType::Bool {
                        return Err(unsupported());
                    }
                    let mut placeholders = Vec::with_capacity(values.len());
                    for value in &values {
                        let value = field.convert(&clause.field, value)?;
                        placeholders.push(sql.bind(value));
                    }
                    format!("{} IN ({})", column, placeholders.join(","))
                }
                Operator::Equal => {
                    let value = &values[0];
                    if field.column_type == ColumnType::String
                        && field.allow_prefix_match
                        && value.ends_with('*')
                        && !value.ends_with("\\*")
                    {
                        let escaped = value.replace('%', "\\%");
                        let pattern = format!("{}%", &escaped[..escaped.len() - 1]);
                        format!("{} LIKE {}", column, sql.bind(Value::String(pattern)))
                    } else if field.column_type == ColumnType::Bool {
                        let value = field.convert(&clause.field, value)?;
                        format!("{} IS {}", column, sql.bind(value))
                    } else {
                        let value = field.convert(&clause.field, value)?;
                        format!("{}={}", column, sql.bind(value))
                    }
                }
                Operator::Range(op) => {
                    if !field.column_type.supports_range() {
                        return Err(unsupported());
                    }
                    let value = field.convert(&clause.field, &values[0])?;
                    format!("{}{}{}", column, op, sql.bind(value))
                }
            };
            sql.conditions.push(condition);
        }

        Ok(sql)
    }
}
