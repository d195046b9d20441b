//! CLI support for kql-filter
//!
//! Command execution lives here rather than in the binary so other tools can
//! embed the same behavior.

mod commands;
mod docs;

pub use commands::{
    AstOptions, ElasticOptions, FilterOptions, execute_ast, execute_elastic, execute_filter,
};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Parse(#[from] crate::ParseError),

    #[error("{0}")]
    Filter(#[from] crate::FilterError),

    #[error("{0}")]
    Elastic(#[from] crate::ElasticError),

    /// Bad `--fields` pattern
    #[error("invalid field pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No filter provided. Pass it as an argument or pipe it to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'kql docs' to see available categories.")]
    UnknownCategory(String),
}
