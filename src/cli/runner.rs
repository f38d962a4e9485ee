//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::cli::server::{serve, ServerConfig};
use crate::config::load_config;
use crate::engine::QueryOutcome;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::handlers::{HandlerSet, KineticaHandler};
use crate::output::write_batch_to_parquet;
use crate::resource::ColumnFilter;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Query { sql, output } => self.query(sql, output.as_deref()).await,
            Commands::Tables { ignore } => self.tables(ignore.as_deref()),
            Commands::CreateModel {
                handler,
                target,
                using,
            } => self.create_model(handler, target, using),
            Commands::Predict {
                handler,
                input,
                output,
            } => self.predict(handler, input, output.as_deref()).await,
            Commands::Sql {
                handler,
                sql,
                output,
            } => self.sql(handler, sql, output.as_deref()),
            Commands::ConnectionArgs => self.connection_args(),
            Commands::Validate => self.validate(),
            Commands::Serve { port } => self.serve(*port).await,
        }
    }

    fn load(&self) -> Result<HandlerSet> {
        load_config(&self.cli.config)?.build()
    }

    async fn query(&self, sql: &str, output: Option<&Path>) -> Result<()> {
        let handlers = self.load()?;
        match handlers.engine().execute(sql).await? {
            QueryOutcome::Rows(frame) => self.emit_frame(&frame, output),
            QueryOutcome::Affected { rows } => {
                self.output_message(&json!({ "type": "AFFECTED", "rows": rows }));
                Ok(())
            }
        }
    }

    fn tables(&self, ignore: Option<&str>) -> Result<()> {
        let filter = match ignore {
            Some(raw) => Some(ColumnFilter::from_value(&serde_json::from_str(raw)?)?),
            None => None,
        };

        let handlers = self.load()?;
        let engine = handlers.engine();
        for name in engine.tables() {
            let columns = engine.table(name)?.get_columns(filter.as_ref());
            self.output_message(&json!({
                "type": "TABLE",
                "name": name,
                "columns": columns
            }));
        }
        Ok(())
    }

    fn create_model(&self, handler: &str, target: &str, using: &str) -> Result<()> {
        let using: Value = serde_json::from_str(using)?;
        let handlers = self.load()?;
        let args = handlers
            .predictor(handler)?
            .create(target, json!({ "using": using }))?;

        self.output_message(&json!({
            "type": "MODEL",
            "handler": handler,
            "column": args.column,
            "task": args.task,
            "target": args.target
        }));
        Ok(())
    }

    async fn predict(&self, handler: &str, input: &Path, output: Option<&Path>) -> Result<()> {
        let content = fs::read_to_string(input).map_err(|e| {
            Error::config(format!(
                "Failed to read input file '{}': {e}",
                input.display()
            ))
        })?;
        let records: Vec<Value> = serde_json::from_str(&content)?;
        let frame = Frame::infer_from_records(&records);

        let handlers = self.load()?;
        let result = handlers.predictor(handler)?.predict(&frame).await?;
        self.emit_frame(&result, output)
    }

    fn sql(&self, handler: &str, sql: &str, output: Option<&Path>) -> Result<()> {
        let handlers = self.load()?;
        let frame = handlers.database(handler)?.query(sql)?;
        self.emit_frame(&frame, output)
    }

    fn connection_args(&self) -> Result<()> {
        self.output_message(&json!({
            "type": "CONNECTION_ARGS",
            "args": KineticaHandler::connection_args(),
            "example": KineticaHandler::connection_args_example()
        }));
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let config = load_config(&self.cli.config)?;
        let handlers: Vec<Value> = config
            .handlers
            .iter()
            .map(|h| json!({ "name": h.name(), "type": h.kind() }))
            .collect();

        self.output_message(&json!({
            "type": "VALID",
            "handlers": handlers
        }));
        Ok(())
    }

    async fn serve(&self, port: u16) -> Result<()> {
        let handlers = self.load()?;
        info!("Serving {} handlers", handlers.names().len());
        serve(ServerConfig::new(Arc::new(handlers)), port).await
    }

    /// Print a frame, or write it to Parquet
    fn emit_frame(&self, frame: &Frame, output: Option<&Path>) -> Result<()> {
        match self.cli.format {
            OutputFormat::Parquet => {
                let path = output.ok_or_else(|| {
                    Error::config("Parquet format requires --output destination")
                })?;
                self.write_parquet(frame, path)
            }
            OutputFormat::Json => {
                for record in frame.to_records() {
                    self.output_message(&record);
                }
                match output {
                    Some(path) => self.write_parquet(frame, path),
                    None => Ok(()),
                }
            }
            OutputFormat::Pretty => {
                self.output_message(&Value::Array(frame.to_records()));
                match output {
                    Some(path) => self.write_parquet(frame, path),
                    None => Ok(()),
                }
            }
        }
    }

    fn write_parquet(&self, frame: &Frame, path: &Path) -> Result<()> {
        let rows = write_batch_to_parquet(path, &frame.to_record_batch()?, None)?;
        info!("Wrote {rows} rows to {}", path.display());
        if self.cli.format == OutputFormat::Parquet {
            self.output_message(&json!({
                "type": "OUTPUT",
                "path": path.display().to_string(),
                "rows": rows
            }));
        }
        Ok(())
    }

    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json | OutputFormat::Parquet => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, yaml: &str) -> std::path::PathBuf {
        let path = dir.path().join("sqlbridge.yaml");
        fs::write(&path, yaml).unwrap();
        path
    }

    fn runner(args: &[&str]) -> Runner {
        Runner::new(Cli::parse_from(args))
    }

    #[tokio::test]
    async fn test_parquet_requires_output() {
        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, "handlers: []\n");
        let runner = runner(&[
            "sqlbridge",
            "-C",
            config.to_str().unwrap(),
            "--format",
            "parquet",
            "validate",
        ]);

        let frame = Frame::empty(vec!["id".to_string()]);
        let err = runner.emit_frame(&frame, None).unwrap_err();
        assert!(err.to_string().contains("--output"));
    }

    #[tokio::test]
    async fn test_json_output_also_writes_parquet() {
        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, "handlers: []\n");
        let runner = runner(&["sqlbridge", "-C", config.to_str().unwrap(), "validate"]);

        let frame = Frame::infer_from_records(&[json!({"id": 1, "title": "a"})]);
        let path = dir.path().join("out.parquet");
        runner.emit_frame(&frame, Some(&path)).unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_validate_and_unknown_handler() {
        let dir = TempDir::new().unwrap();
        let config = write_config(
            &dir,
            "handlers:\n  - type: cohere\n    name: cohere\n    api_key: test\n",
        );
        let path = config.to_str().unwrap();

        runner(&["sqlbridge", "-C", path, "validate"])
            .run()
            .await
            .unwrap();

        let err = runner(&["sqlbridge", "-C", path, "sql", "--handler", "nope", "SELECT 1"])
            .run()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[tokio::test]
    async fn test_tables_rejects_non_list_ignore() {
        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, "handlers: []\n");
        let err = runner(&[
            "sqlbridge",
            "-C",
            config.to_str().unwrap(),
            "tables",
            "--ignore",
            "\"id\"",
        ])
        .run()
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidIgnoreList { .. }));
    }
}
