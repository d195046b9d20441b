use clap::{Parser as ClapParser, Subcommand};
use kql_filter::cli::{self, AstOptions, CliError, ElasticOptions, FilterOptions};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "kql")]
#[command(about = "kql - parse KQL-style filters and convert them to other query forms")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a filter and print its canonical form
    Ast {
        /// The filter (reads from stdin if not provided)
        filter: Option<String>,

        /// Only accept clauses joined by AND
        #[arg(long)]
        simple: bool,

        /// Maximum nesting depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Maximum number of AND/OR operators
        #[arg(long)]
        max_complexity: Option<usize>,
    },

    /// Print the clauses of a simple filter as JSON
    Filter {
        /// The filter (reads from stdin if not provided)
        filter: Option<String>,

        /// Allow range clauses
        #[arg(short, long)]
        ranges: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the Elasticsearch query for a filter
    Elastic {
        /// The filter (reads from stdin if not provided)
        filter: Option<String>,

        /// Regex that every field must match
        #[arg(short, long)]
        fields: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'kql docs' to list categories)
        category: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ast {
            filter,
            simple,
            max_depth,
            max_complexity,
        } => read_filter(filter).and_then(|filter| {
            cli::execute_ast(&AstOptions {
                filter,
                simple,
                max_depth,
                max_complexity,
            })
        }),
        Commands::Filter {
            filter,
            ranges,
            pretty,
        } => read_filter(filter).and_then(|filter| {
            cli::execute_filter(&FilterOptions {
                filter,
                ranges,
                pretty,
            })
        }),
        Commands::Elastic {
            filter,
            fields,
            pretty,
        } => read_filter(filter).and_then(|filter| {
            cli::execute_elastic(&ElasticOptions {
                filter,
                fields,
                pretty,
            })
        }),
        Commands::Docs => Ok(cli::get_docs_overview().to_string()),
        Commands::Doc { category } => cli::get_doc_category(&category).map(str::to_string),
    };

    match result {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn read_filter(filter: Option<String>) -> Result<String, CliError> {
    match filter {
        Some(s) => Ok(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}
