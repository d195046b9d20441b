// tests/sql_tests.rs

use std::collections::HashMap;

use jiff::Timestamp;
use kql_filter::filter::{Operator, parse, project};
use kql_filter::parser::parse_ast;
use kql_filter::sql::{ColumnType, SqlError, SqlField, SqlFilter};
use kql_filter::value::Value;
use rust_decimal::Decimal;

fn fields(entries: Vec<(&str, SqlField)>) -> HashMap<String, SqlField> {
    entries
        .into_iter()
        .map(|(name, field)| (name.to_string(), field))
        .collect()
}

fn params(entries: Vec<(&str, Value)>) -> HashMap<String, Value> {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

fn string(s: &str) -> Value {
    Value::String(s.to_string())
}

fn to_sql(input: &str, ranges: bool, fields: &HashMap<String, SqlField>) -> Result<SqlFilter, SqlError> {
    parse(input, ranges)
        .unwrap_or_else(|e| panic!("parsing {:?} failed: {}", input, e))
        .to_sql(fields)
}

fn state_mapper(value: &str) -> Result<String, String> {
    match value {
        "active" | "state_active" | "payment_state_active" => Ok("active".to_string()),
        "canceled" | "state_canceled" => Ok("canceled".to_string()),
        "expired" => Ok("expired".to_string()),
        _ => Err("illegal value provided".to_string()),
    }
}

// ============================================================================
// Equality
// ============================================================================

#[test]
fn test_equality_conditions() {
    let int_and_string = fields(vec![
        ("userId", SqlField::new(ColumnType::Int64).column("u.user_id")),
        ("email", SqlField::new(ColumnType::String)),
    ]);

    let sql = to_sql("userId:12345 email:johnexamplecom", false, &int_and_string).unwrap();
    assert_eq!(sql.where_clause(), "(u.user_id=@KQL0 AND email=@KQL1)");
    assert_eq!(
        sql.params,
        params(vec![
            ("KQL0", Value::Int64(12345)),
            ("KQL1", string("johnexamplecom")),
        ])
    );

    // Without prefix matching the wildcard is part of the value.
    let sql = to_sql("userId:12345 email:*examplecom", false, &int_and_string).unwrap();
    assert_eq!(sql.where_clause(), "(u.user_id=@KQL0 AND email=@KQL1)");
    assert_eq!(sql.params["KQL1"], string("*examplecom"));
}

#[test]
fn test_prefix_match() {
    let email = fields(vec![
        ("userId", SqlField::new(ColumnType::Int64).column("u.user_id")),
        ("email", SqlField::new(ColumnType::String).prefix_match()),
        ("discount_string", SqlField::new(ColumnType::String).prefix_match()),
    ]);

    let test_cases = vec![
        (
            "userId:12345 email:johnexample*",
            "(u.user_id=@KQL0 AND email LIKE @KQL1)",
            "KQL1",
            "johnexample%",
        ),
        ("discount_string:70%*", "(discount_string LIKE @KQL0)", "KQL0", "70\\%%"),
        ("email:\"john@\"*", "(email LIKE @KQL0)", "KQL0", "john@%"),
        (
            "email:\"john@example.com\"",
            "(email=@KQL0)",
            "KQL0",
            "john@example.com",
        ),
        (
            "userId:12345 email:*example*com",
            "(u.user_id=@KQL0 AND email=@KQL1)",
            "KQL1",
            "*example*com",
        ),
    ];

    for (input, expected_sql, param, expected_value) in test_cases {
        let sql = to_sql(input, false, &email).unwrap();
        assert_eq!(sql.where_clause(), expected_sql, "Failed for input: {}", input);
        assert_eq!(sql.params[param], string(expected_value), "Failed for input: {}", input);
    }
}

#[test]
fn test_typed_columns() {
    let typed = fields(vec![
        ("lat", SqlField::new(ColumnType::Float64)),
        ("lon", SqlField::new(ColumnType::Float64)),
        ("exact", SqlField::new(ColumnType::Bool)),
        ("amount", SqlField::new(ColumnType::Numeric)),
    ]);

    let sql = to_sql("lat:52.4052963 lon:4.8856547 exact:false amount:10.50", false, &typed).unwrap();
    assert_eq!(
        sql.conditions,
        vec!["lat=@KQL0", "lon=@KQL1", "exact IS @KQL2", "amount=@KQL3"]
    );
    assert_eq!(
        sql.params,
        params(vec![
            ("KQL0", Value::Float64(52.4052963)),
            ("KQL1", Value::Float64(4.8856547)),
            ("KQL2", Value::Bool(false)),
            ("KQL3", Value::Numeric(Decimal::new(1050, 2))),
        ])
    );
}

#[test]
fn test_fuzzy_booleans() {
    let bools = fields(vec![
        ("truthy", SqlField::new(ColumnType::Bool)),
        ("falsey", SqlField::new(ColumnType::Bool)),
        ("also_truthy", SqlField::new(ColumnType::Bool).column("alsoTruthy")),
    ]);

    let sql = to_sql("truthy:1 falsey:0 also_truthy:t", false, &bools).unwrap();
    assert_eq!(
        sql.where_clause(),
        "(truthy IS @KQL0 AND falsey IS @KQL1 AND alsoTruthy IS @KQL2)"
    );
    assert_eq!(
        sql.params,
        params(vec![
            ("KQL0", Value::Bool(true)),
            ("KQL1", Value::Bool(false)),
            ("KQL2", Value::Bool(true)),
        ])
    );
}

// ============================================================================
// Ranges
// ============================================================================

#[test]
fn test_all_range_operators() {
    let columns = fields(vec![
        ("userId", SqlField::new(ColumnType::Int64).column("user_id")),
        ("lat", SqlField::new(ColumnType::Float64)),
        ("lon", SqlField::new(ColumnType::Float64)),
        ("date", SqlField::new(ColumnType::Timestamp)),
    ]);

    let sql = to_sql(
        "userId>=12345 lat<50.0 lon>4.1 date<=\"2023-06-01T23:00:00.20Z\"",
        true,
        &columns,
    )
    .unwrap();

    assert_eq!(
        sql.where_clause(),
        "(user_id>=@KQL0 AND lat<@KQL1 AND lon>@KQL2 AND date<=@KQL3)"
    );
    let expected_date: Timestamp = "2023-06-01T23:00:00.2Z".parse().unwrap();
    assert_eq!(
        sql.params,
        params(vec![
            ("KQL0", Value::Int64(12345)),
            ("KQL1", Value::Float64(50.0)),
            ("KQL2", Value::Float64(4.1)),
            ("KQL3", Value::Timestamp(expected_date)),
        ])
    );
}

#[test]
fn test_range_on_unsupported_type() {
    let columns = fields(vec![("name", SqlField::new(ColumnType::String))]);
    let err = to_sql("name>m", true, &columns).unwrap_err();
    assert_eq!(
        err.to_string(),
        "operator > not supported for field type STRING"
    );
}

// ============================================================================
// Value lists
// ============================================================================

fn project_unrestricted(input: &str) -> kql_filter::Filter {
    project(&parse_ast(input, &[]).unwrap(), false).unwrap()
}

#[test]
fn test_in_query() {
    let columns = fields(vec![(
        "state",
        SqlField::new(ColumnType::String)
            .multiple_values()
            .map_value(state_mapper),
    )]);

    let filter = project_unrestricted("state:(state_active OR state_canceled)");
    assert_eq!(filter.clauses[0].operator, Operator::In);

    let sql = filter.to_sql(&columns).unwrap();
    assert_eq!(sql.where_clause(), "(state IN (@KQL0,@KQL1))");
    assert_eq!(
        sql.params,
        params(vec![("KQL0", string("active")), ("KQL1", string("canceled"))])
    );
}

#[test]
fn test_in_query_int() {
    let columns = fields(vec![(
        "user_id",
        SqlField::new(ColumnType::Int64)
            .column("UserID")
            .multiple_values(),
    )]);

    let sql = project_unrestricted("user_id:(123 OR 321)")
        .to_sql(&columns)
        .unwrap();
    assert_eq!(sql.where_clause(), "(UserID IN (@KQL0,@KQL1))");
    assert_eq!(
        sql.params,
        params(vec![("KQL0", Value::Int64(123)), ("KQL1", Value::Int64(321))])
    );
}

#[test]
fn test_in_query_rejections() {
    let disabled = fields(vec![(
        "state",
        SqlField::new(ColumnType::String).map_value(state_mapper),
    )]);
    let err = project_unrestricted("state:(active OR canceled)")
        .to_sql(&disabled)
        .unwrap_err();
    assert_eq!(
        err,
        SqlError::MultipleValues {
            field: "state".to_string()
        }
    );

    let bools = fields(vec![(
        "user_id",
        SqlField::new(ColumnType::Bool).multiple_values(),
    )]);
    let err = project_unrestricted("user_id:(true OR false)")
        .to_sql(&bools)
        .unwrap_err();
    assert!(matches!(
        err,
        SqlError::UnsupportedOperator {
            operator: Operator::In,
            column_type: ColumnType::Bool,
            ..
        }
    ));
}

// ============================================================================
// Field configuration
// ============================================================================

#[test]
fn test_value_mapping() {
    let columns = fields(vec![(
        "state",
        SqlField::new(ColumnType::String).map_value(state_mapper),
    )]);

    let sql = to_sql("state:payment_state_active", false, &columns).unwrap();
    assert_eq!(sql.where_clause(), "(state=@KQL0)");
    assert_eq!(sql.params["KQL0"], string("active"));

    let err = to_sql("state:deleted", false, &columns).unwrap_err();
    assert_eq!(err.to_string(), "field state: illegal value provided");
}

#[test]
fn test_unknown_field() {
    let columns = fields(vec![(
        "userId",
        SqlField::new(ColumnType::Int64).column("u.user_id"),
    )]);
    let err = to_sql("userId:12345 password:qwertyuiop", false, &columns).unwrap_err();
    assert_eq!(err.to_string(), "unknown field: password");
}

#[test]
fn test_invalid_typed_values() {
    let columns = fields(vec![
        ("n", SqlField::new(ColumnType::Int64)),
        ("b", SqlField::new(ColumnType::Bool)),
        ("t", SqlField::new(ColumnType::Timestamp)),
    ]);

    let test_cases = vec![
        ("n:abc", "field n: invalid INT64 value"),
        ("b:maybe", "field b: invalid BOOL value"),
        ("t:yesterday", "field t: invalid TIMESTAMP value"),
    ];

    for (input, expected_prefix) in test_cases {
        let err = to_sql(input, false, &columns).unwrap_err();
        assert!(
            err.to_string().starts_with(expected_prefix),
            "Failed for input: {}: {}",
            input,
            err
        );
    }
}

#[test]
fn test_empty_filter() {
    let sql = to_sql("", false, &HashMap::new()).unwrap();
    assert!(sql.conditions.is_empty());
    assert_eq!(sql.where_clause(), "");
}

#[test]
fn test_column_type_names() {
    assert_eq!(ColumnType::from_name("int64"), Some(ColumnType::Int64));
    assert_eq!(ColumnType::from_name("Timestamp"), Some(ColumnType::Timestamp));
    assert_eq!(ColumnType::from_name("blob"), None);
    assert_eq!(ColumnType::Numeric.to_string(), "NUMERIC");
}
