//! Command-line argument parsing for icequery.
//!
//! Flags have the highest precedence and are applied over the config file and
//! the environment.

use crate::batch::OutputFormat;
use crate::config::Config;
use crate::error::{ConsoleError, Result};
use clap::Parser;
use std::path::PathBuf;

/// A terminal SQL console for Iceberg catalogs backed by embedded DuckDB.
#[derive(Parser, Debug)]
#[command(name = "icequery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use the scripted in-memory engine instead of DuckDB
    #[arg(long)]
    pub mock_engine: bool,

    /// Run a single query and print the result instead of starting the console
    #[arg(short = 'e', long, value_name = "SQL", conflicts_with = "file")]
    pub execute: Option<String>,

    /// Run the query in a file and print the result
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Output format for --execute and --file
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Object storage endpoint (overrides S3_ENDPOINT)
    #[arg(long, value_name = "HOST")]
    pub storage_endpoint: Option<String>,

    /// Object storage region (overrides S3_REGION)
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Iceberg REST catalog endpoint (overrides ICEBERG_CATALOG_ENDPOINT)
    #[arg(long, value_name = "URL")]
    pub catalog_endpoint: Option<String>,

    /// Warehouse bucket to attach (overrides ICEBERG_BUCKET)
    #[arg(long, value_name = "BUCKET")]
    pub bucket: Option<String>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Returns true if a single query should run without the TUI.
    pub fn is_batch(&self) -> bool {
        self.execute.is_some() || self.file.is_some()
    }

    /// Returns the SQL to run in batch mode, reading `--file` if given.
    pub fn batch_sql(&self) -> Result<Option<String>> {
        if let Some(sql) = &self.execute {
            return Ok(Some(sql.clone()));
        }
        match &self.file {
            Some(path) => std::fs::read_to_string(path).map(Some).map_err(|e| {
                ConsoleError::config(format!("Failed to read {}: {e}", path.display()))
            }),
            None => Ok(None),
        }
    }

    /// Applies connection flags over `config`.
    pub fn apply_to(&self, config: &mut Config) {
        let overrides = [
            (&self.storage_endpoint, &mut config.storage.endpoint),
            (&self.region, &mut config.storage.region),
            (&self.catalog_endpoint, &mut config.catalog.endpoint),
            (&self.bucket, &mut config.catalog.bucket),
        ];
        for (flag, field) in overrides {
            if let Some(value) = flag {
                *field = Some(value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse_args(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_defaults_start_console() {
        let cli = parse_args(&["icequery"]);
        assert!(!cli.is_batch());
        assert!(!cli.mock_engine);
        assert_eq!(cli.output, OutputFormat::Text);
        assert_eq!(cli.config_path(), Config::default_path());
    }

    #[test]
    fn test_execute_with_json_output() {
        let cli = parse_args(&["icequery", "--mock-engine", "-e", "SELECT 1", "--output", "json"]);
        assert!(cli.is_batch());
        assert!(cli.mock_engine);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.batch_sql().unwrap().as_deref(), Some("SELECT 1"));
    }

    #[test]
    fn test_execute_conflicts_with_file() {
        let result = Cli::try_parse_from(["icequery", "-e", "SELECT 1", "-f", "query.sql"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_output() {
        let result = Cli::try_parse_from(["icequery", "--output", "frames"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_batch_sql_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "SELECT 42;").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = parse_args(&["icequery", "--file", &path]);
        assert_eq!(cli.batch_sql().unwrap().as_deref(), Some("SELECT 42;\n"));
    }

    #[test]
    fn test_batch_sql_missing_file() {
        let cli = parse_args(&["icequery", "--file", "/nonexistent/query.sql"]);
        assert!(matches!(cli.batch_sql(), Err(ConsoleError::Config(_))));
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        config.storage.region = Some("eu-west-1".into());
        config.catalog.bucket = Some("from-file".into());

        let cli = parse_args(&["icequery", "--bucket", "warehouse", "--storage-endpoint", "s3.local"]);
        cli.apply_to(&mut config);

        assert_eq!(config.catalog.bucket.as_deref(), Some("warehouse"));
        assert_eq!(config.storage.endpoint.as_deref(), Some("s3.local"));
        assert_eq!(config.storage.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.catalog.endpoint, None);
    }
}
