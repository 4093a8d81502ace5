//! Non-interactive mode.
//!
//! Brings the connection online, runs a single query and prints the result to
//! stdout as a text table or as JSON.

use std::io::Write;
use std::sync::Arc;

use clap::ValueEnum;
use serde::Serialize;
use tracing::{info, warn};

use crate::connection::{ConnectionInfo, ConnectionManager, ConnectionState};
use crate::error::{ConsoleError, Result};
use crate::grid::ResultGrid;
use crate::query::{NormalizedResult, QueryExecutor, QueryOutcome};

/// Output format for batch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// The first page as an aligned table, followed by the summary line.
    #[default]
    Text,
    /// The whole result as a JSON document.
    Json,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    catalog: &'a str,
    engine: &'a str,
    #[serde(flatten)]
    result: &'a NormalizedResult,
}

/// Runs `sql` once and writes the result to `out`.
///
/// The connection is always shut down before returning. Initialization
/// failures and query failures are returned as errors.
pub async fn run<W: Write>(
    manager: Arc<ConnectionManager>,
    sql: &str,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let result = execute(&manager, sql).await;
    manager.shutdown().await;

    let (info, result) = result?;
    let rendered = match format {
        OutputFormat::Text => render_text(&result),
        OutputFormat::Json => render_json(&info, &result)?,
    };
    writeln!(out, "{rendered}")
        .map_err(|e| ConsoleError::internal(format!("Failed to write output: {e}")))?;
    Ok(())
}

async fn execute(
    manager: &Arc<ConnectionManager>,
    sql: &str,
) -> Result<(ConnectionInfo, NormalizedResult)> {
    let info = match manager.initialize().await {
        ConnectionState::Ready(info) => info,
        ConnectionState::Failed(err) => return Err(ConsoleError::Initialization(err)),
        other => {
            return Err(ConsoleError::internal(format!(
                "Connection settled in unexpected state: {}",
                other.label()
            )))
        }
    };

    let executor = QueryExecutor::new(Arc::clone(manager));
    match executor.execute(sql).await? {
        QueryOutcome::Success(result) => {
            info!(rows = result.row_count, "Batch query succeeded");
            Ok((info, result))
        }
        QueryOutcome::Failure(message) => {
            warn!("Batch query failed");
            Err(ConsoleError::engine(message))
        }
    }
}

/// Renders the first page of `result` as an aligned table.
pub fn render_text(result: &NormalizedResult) -> String {
    let grid = ResultGrid::new(result.clone());
    let headers: Vec<String> = grid
        .columns()
        .iter()
        .map(|column| column.header.clone())
        .collect();
    let rows: Vec<Vec<String>> = grid
        .visible_rows()
        .into_iter()
        .map(|row| {
            grid.columns()
                .iter()
                .map(|column| grid.cell(row, column).text)
                .collect()
        })
        .collect();

    let mut output = format_table(&headers, &rows);
    if !output.is_empty() {
        output.push('\n');
    }
    output.push_str(&result.summary());
    if grid.page_count() > 1 {
        output.push_str(&format!(" ({}, use --output json for all rows)", grid.page_label()));
    }
    output
}

fn render_json(info: &ConnectionInfo, result: &NormalizedResult) -> Result<String> {
    let output = JsonOutput {
        catalog: &info.alias,
        engine: info.engine,
        result,
    };
    serde_json::to_string_pretty(&output)
        .map_err(|e| ConsoleError::internal(format!("Failed to encode result: {e}")))
}

/// Formats a table as a string for display.
fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }

    let width_of = |s: &str| s.chars().count();
    let mut widths: Vec<usize> = headers.iter().map(|h| width_of(h)).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(width_of(cell));
        }
    }

    let pad = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:width$}"))
            .collect::<Vec<_>>()
            .join(" │ ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![pad(headers)];
    let separator: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    lines.push(separator.join("─┼─"));
    lines.extend(rows.iter().map(|row| pad(row)));
    lines.join("\n")
}
