//! Execute the `ast`, `filter` and `elastic` commands

use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::debug;

use super::CliError;
use crate::{
    QueryGenerator, disable_complex_expressions, filter, parse_ast,
    parser::{ParserOption, with_max_complexity, with_max_depth},
};

/// Options for the ast command
#[derive(Debug, Clone, Default)]
pub struct AstOptions {
    pub filter: String,
    /// Only accept AND-joined clauses
    pub simple: bool,
    pub max_depth: Option<usize>,
    pub max_complexity: Option<usize>,
}

/// Options for the filter command
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub filter: String,
    /// Allow `<`, `<=`, `>` and `>=` clauses
    pub ranges: bool,
    pub pretty: bool,
}

/// Options for the elastic command
#[derive(Debug, Clone, Default)]
pub struct ElasticOptions {
    pub filter: String,
    /// Regex that every queried field must match
    pub fields: Option<String>,
    pub pretty: bool,
}

/// Parse the filter and return its canonical rendering.
pub fn execute_ast(options: &AstOptions) -> Result<String, CliError> {
    let mut parser_options: Vec<ParserOption> = Vec::new();
    if options.simple {
        parser_options.push(disable_complex_expressions());
    }
    if let Some(n) = options.max_depth {
        parser_options.push(with_max_depth(n));
    }
    if let Some(n) = options.max_complexity {
        parser_options.push(with_max_complexity(n));
    }

    let node = parse_ast(options.filter.trim_end(), &parser_options)?;
    Ok(node.to_string())
}

/// Parse the filter into clauses and return them as JSON.
pub fn execute_filter(options: &FilterOptions) -> Result<String, CliError> {
    let filter = filter::parse(options.filter.trim_end(), options.ranges)?;
    debug!(clauses = filter.clauses.len(), "projected filter");
    render(&filter.to_json(), options.pretty)
}

/// Parse the filter and return the Elasticsearch query as JSON.
pub fn execute_elastic(options: &ElasticOptions) -> Result<String, CliError> {
    let node = parse_ast(options.filter.trim_end(), &[])?;

    let mut generator = QueryGenerator::new();
    if let Some(pattern) = &options.fields {
        generator = generator.with_allowed_fields(Regex::new(pattern)?);
    }
    let query = generator.convert(&node)?;
    render(&query, options.pretty)
}

fn render(value: &JsonValue, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
