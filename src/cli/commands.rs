//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SQL over REST APIs, prediction models and remote databases
#[derive(Parser, Debug)]
#[command(name = "sqlbridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Handler configuration file (YAML)
    #[arg(short = 'C', long, global = true, default_value = "sqlbridge.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a SELECT, INSERT or UPDATE against the registered tables
    Query {
        /// SQL statement
        sql: String,

        /// Parquet file to write the result to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List registered tables with their columns
    Tables {
        /// Columns to leave out, as a JSON array of names
        #[arg(long)]
        ignore: Option<String>,
    },

    /// Create a prediction model
    CreateModel {
        /// Prediction handler name
        #[arg(long)]
        handler: String,

        /// Column the predictions are written to
        #[arg(long)]
        target: String,

        /// Model arguments as JSON, e.g. '{"column": "text", "task": "text-summarization"}'
        #[arg(long)]
        using: String,
    },

    /// Run a prediction model over JSON records
    Predict {
        /// Prediction handler name
        #[arg(long)]
        handler: String,

        /// JSON file holding an array of records
        #[arg(short, long)]
        input: PathBuf,

        /// Parquet file to write the result to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Pass SQL through to a database handler
    Sql {
        /// Database handler name
        #[arg(long)]
        handler: String,

        /// SQL statement
        sql: String,

        /// Parquet file to write the result to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the connection arguments of the database handler
    ConnectionArgs,

    /// Validate the configuration file
    Validate,

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one record per line)
    Json,
    /// Indented JSON
    Pretty,
    /// Parquet file
    Parquet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let cli = Cli::parse_from([
            "sqlbridge",
            "-C",
            "handlers.yaml",
            "query",
            "SELECT id FROM articles LIMIT 5",
        ]);
        assert_eq!(cli.config, PathBuf::from("handlers.yaml"));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Query { sql, output } => {
                assert_eq!(sql, "SELECT id FROM articles LIMIT 5");
                assert!(output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_create_model() {
        let cli = Cli::parse_from([
            "sqlbridge",
            "create-model",
            "--handler",
            "cohere",
            "--target",
            "summary",
            "--using",
            r#"{"column": "text", "task": "text-summarization"}"#,
            "--format",
            "pretty",
        ]);
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(matches!(
            cli.command,
            Commands::CreateModel { ref handler, ref target, .. }
                if handler == "cohere" && target == "summary"
        ));
    }

    #[test]
    fn test_parse_serve_default_port() {
        let cli = Cli::parse_from(["sqlbridge", "serve"]);
        assert!(matches!(cli.command, Commands::Serve { port: 8080 }));
    }
}
