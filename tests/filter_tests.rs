// tests/filter_tests.rs

use kql_filter::ast::{NodeType, RangeOperator};
use kql_filter::filter::{Clause, Filter, FilterError, Operator, parse, project};
use kql_filter::parser::{ParseError, parse_ast};

fn clause(field: &str, operator: Operator, values: &[&str]) -> Clause {
    Clause::new(
        field,
        operator,
        values.iter().map(|v| v.to_string()).collect(),
    )
}

// ============================================================================
// parse
// ============================================================================

#[test]
fn test_parse_simple_filters() {
    let test_cases = vec![
        (
            "field:value",
            vec![clause("field", Operator::Equal, &["value"])],
        ),
        (
            "field:value another:second",
            vec![
                clause("field", Operator::Equal, &["value"]),
                clause("another", Operator::Equal, &["second"]),
            ],
        ),
        (
            "a:1 AND b:\"two words\" c:x*",
            vec![
                clause("a", Operator::Equal, &["1"]),
                clause("b", Operator::Equal, &["two words"]),
                clause("c", Operator::Equal, &["x*"]),
            ],
        ),
    ];

    for (input, expected) in test_cases {
        let filter = parse(input, false).unwrap();
        assert_eq!(filter.clauses, expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_parse_empty_input() {
    assert_eq!(parse("", false).unwrap(), Filter::default());
    assert!(parse("  \t ", true).unwrap().is_empty());
}

#[test]
fn test_parse_rejects_complex_expressions() {
    let test_cases = vec![
        "field:value OR another:second",
        "field:(value OR second)",
        "NOT field:value",
        "(field:value)",
        "field:{a:b}",
    ];

    for input in test_cases {
        let err = parse(input, true).unwrap_err();
        assert!(
            matches!(err, FilterError::Parse(ParseError::ComplexExpression { .. })),
            "Failed for input: {}: {}",
            input,
            err
        );
    }
}

#[test]
fn test_parse_ranges() {
    let input = "userId>=12345 lat<50.0 lon>4.1 date<=\"2023-06-01T23:00:00.20Z\"";

    let err = parse(input, false).unwrap_err();
    assert_eq!(
        err,
        FilterError::RangeNotAllowed {
            field: "userId".to_string(),
            operator: RangeOperator::Gte,
        }
    );

    let filter = parse(input, true).unwrap();
    assert_eq!(
        filter.clauses,
        vec![
            clause("userId", Operator::Range(RangeOperator::Gte), &["12345"]),
            clause("lat", Operator::Range(RangeOperator::Lt), &["50.0"]),
            clause("lon", Operator::Range(RangeOperator::Gt), &["4.1"]),
            clause(
                "date",
                Operator::Range(RangeOperator::Lte),
                &["2023-06-01T23:00:00.20Z"]
            ),
        ]
    );
}

#[test]
fn test_parse_clause_limit_per_field() {
    assert_eq!(parse("count>=1 count<5", true).unwrap().clauses.len(), 2);

    let err = parse("count>=1 and count<5 and count>3", true).unwrap_err();
    assert_eq!(
        err,
        FilterError::TooManyClauses {
            field: "count".to_string(),
            max: 2,
        }
    );
}

#[test]
fn test_parse_error_passthrough() {
    let err = parse("field:\"open", false).unwrap_err();
    assert!(err.to_string().starts_with("parser error: unterminated quoted string"));
}

// ============================================================================
// project
// ============================================================================

#[test]
fn test_project_in_list() {
    let node = parse_ast("a:(x OR y) b:z", &[]).unwrap();
    let filter = project(&node, false).unwrap();
    assert_eq!(
        filter.clauses,
        vec![
            clause("a", Operator::In, &["x", "y"]),
            clause("b", Operator::Equal, &["z"]),
        ]
    );
}

#[test]
fn test_project_unsupported_nodes() {
    let test_cases = vec![
        ("a:1 OR b:2", NodeType::Or),
        ("NOT a:1", NodeType::Not),
        ("a:{b:1}", NodeType::Nested),
        ("a:(x AND y)", NodeType::And),
        ("a:(x OR (y AND z))", NodeType::And),
        ("bare", NodeType::Literal),
    ];

    for (input, expected) in test_cases {
        let node = parse_ast(input, &[]).unwrap();
        let err = project(&node, true).unwrap_err();
        assert_eq!(
            err,
            FilterError::UnsupportedNode {
                node_type: expected
            },
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_filter_to_json() {
    let filter = parse("a:1 b<=2", true).unwrap();
    assert_eq!(
        filter.to_json(),
        serde_json::json!([
            {"field": "a", "operator": "=", "values": ["1"]},
            {"field": "b", "operator": "<=", "values": ["2"]}
        ])
    );
}
