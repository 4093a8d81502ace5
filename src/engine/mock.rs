//! Mock engine for testing.
//!
//! Provides a scripted in-memory engine for tests and `--mock-engine` demos.
//! Every call is counted on a shared [`MockProbe`] so tests can verify which
//! engine operations actually happened.

use super::{CellValue, Engine, EngineConnection, EngineFactory, RawResult};
use crate::error::{ConsoleError, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

/// Number of rows in the demo `analytics.events` table.
const DEMO_EVENT_ROWS: usize = 120;

/// Statement keywords the mock treats as queries returning rows.
const QUERY_KEYWORDS: &[&str] = &[
    "SELECT", "WITH", "FROM", "VALUES", "SHOW", "DESCRIBE", "SUMMARIZE", "PRAGMA", "EXPLAIN",
    "TABLE",
];

/// Statement keywords the mock accepts as commands returning a count.
const COMMAND_KEYWORDS: &[&str] = &[
    "CREATE", "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "SET", "ATTACH", "DETACH", "INSTALL",
    "LOAD", "USE", "COPY",
];

/// Counters for engine operations performed through a mock factory.
#[derive(Debug, Default)]
pub struct MockProbe {
    instantiated: AtomicUsize,
    engines_shutdown: AtomicUsize,
    connections_opened: AtomicUsize,
    connections_closed: AtomicUsize,
    queries: AtomicUsize,
    statements: Mutex<Vec<String>>,
}

impl MockProbe {
    /// Number of engine instances created.
    pub fn instantiated(&self) -> usize {
        self.instantiated.load(Ordering::SeqCst)
    }

    /// Number of engine instances shut down.
    pub fn engines_shutdown(&self) -> usize {
        self.engines_shutdown.load(Ordering::SeqCst)
    }

    /// Number of connections opened.
    pub fn connections_opened(&self) -> usize {
        self.connections_opened.load(Ordering::SeqCst)
    }

    /// Number of connections closed.
    pub fn connections_closed(&self) -> usize {
        self.connections_closed.load(Ordering::SeqCst)
    }

    /// Number of `query` calls received.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Statements received through `execute_batch`, in order.
    pub fn statements(&self) -> Vec<String> {
        self.statements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record_statement(&self, sql: &str) {
        self.statements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sql.to_string());
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Rows(RawResult),
    Error(String),
}

#[derive(Debug, Clone, Default)]
struct Script {
    fail_instantiate: Option<String>,
    fail_connect: Option<String>,
    failing_statements: Vec<(String, String)>,
    responses: Vec<(String, Scripted)>,
    instantiate_gate: Option<Arc<Notify>>,
    query_gate: Option<Arc<Notify>>,
    demo: bool,
}

/// A mock engine factory with scripted behavior.
#[derive(Debug, Clone, Default)]
pub struct MockEngineFactory {
    script: Arc<Script>,
    probe: Arc<MockProbe>,
}

impl MockEngineFactory {
    /// Creates a mock engine that accepts every setup statement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock engine serving the demo `iceberg_catalog.analytics.events` table.
    pub fn demo() -> Self {
        let mut factory = Self::new();
        Arc::make_mut(&mut factory.script).demo = true;
        factory
    }

    /// Returns the probe shared by every engine this factory creates.
    pub fn probe(&self) -> Arc<MockProbe> {
        Arc::clone(&self.probe)
    }

    /// Makes engine instantiation fail with the given message.
    pub fn fail_instantiate(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.script).fail_instantiate = Some(message.into());
        self
    }

    /// Makes opening a connection fail with the given message.
    pub fn fail_connect(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.script).fail_connect = Some(message.into());
        self
    }

    /// Makes any batch containing `needle` fail with the given message.
    pub fn fail_statement(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.script)
            .failing_statements
            .push((needle.into(), message.into()));
        self
    }

    /// Answers `sql` with the given rows.
    pub fn respond(mut self, sql: impl Into<String>, result: RawResult) -> Self {
        Arc::make_mut(&mut self.script)
            .responses
            .push((normalize_sql(&sql.into()), Scripted::Rows(result)));
        self
    }

    /// Answers `sql` with an engine error.
    pub fn reject(mut self, sql: impl Into<String>, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.script)
            .responses
            .push((normalize_sql(&sql.into()), Scripted::Error(message.into())));
        self
    }

    /// Holds every instantiation until the gate is notified.
    pub fn gate_instantiate(mut self, gate: Arc<Notify>) -> Self {
        Arc::make_mut(&mut self.script).instantiate_gate = Some(gate);
        self
    }

    /// Holds every query until the gate is notified.
    pub fn gate_queries(mut self, gate: Arc<Notify>) -> Self {
        Arc::make_mut(&mut self.script).query_gate = Some(gate);
        self
    }
}

#[async_trait]
impl EngineFactory for MockEngineFactory {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn instantiate(&self) -> Result<Box<dyn Engine>> {
        if let Some(gate) = &self.script.instantiate_gate {
            gate.notified().await;
        }
        if let Some(message) = &self.script.fail_instantiate {
            return Err(ConsoleError::engine(message.clone()));
        }

        self.probe.instantiated.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockEngine {
            script: Arc::clone(&self.script),
            probe: Arc::clone(&self.probe),
        }))
    }
}

struct MockEngine {
    script: Arc<Script>,
    probe: Arc<MockProbe>,
}

#[async_trait]
impl Engine for MockEngine {
    async fn connect(&self) -> Result<Box<dyn EngineConnection>> {
        if let Some(message) = &self.script.fail_connect {
            return Err(ConsoleError::engine(message.clone()));
        }

        self.probe.connections_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            script: Arc::clone(&self.script),
            probe: Arc::clone(&self.probe),
            closed: AtomicBool::new(false),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        self.probe.engines_shutdown.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MockConnection {
    script: Arc<Script>,
    probe: Arc<MockProbe>,
    closed: AtomicBool,
}

impl MockConnection {
    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ConsoleError::engine("Connection already closed"));
        }
        Ok(())
    }

    fn answer(&self, sql: &str) -> Result<RawResult> {
        let normalized = normalize_sql(sql);

        if let Some((_, scripted)) = self
            .script
            .responses
            .iter()
            .find(|(key, _)| *key == normalized)
        {
            return match scripted {
                Scripted::Rows(result) => Ok(result.clone()),
                Scripted::Error(message) => Err(ConsoleError::engine(message.clone())),
            };
        }

        if self.script.demo && normalized.to_lowercase().contains("analytics.events") {
            return Ok(demo_events(parse_limit(&normalized)));
        }

        let Some(keyword) = normalized.split_whitespace().next() else {
            return Err(ConsoleError::engine(
                "Invalid Input Error: No statement to prepare!",
            ));
        };
        let keyword_upper = keyword.to_uppercase();

        if QUERY_KEYWORDS.contains(&keyword_upper.as_str()) {
            Ok(RawResult::new(
                vec!["result".to_string()],
                vec![vec![CellValue::Text(format!("Mock result for: {normalized}"))]],
            ))
        } else if COMMAND_KEYWORDS.contains(&keyword_upper.as_str()) {
            Ok(RawResult::new(
                vec!["Count".to_string()],
                vec![vec![CellValue::Int(0)]],
            ))
        } else {
            Err(ConsoleError::engine(format!(
                "Parser Error: syntax error at or near \"{keyword}\""
            )))
        }
    }
}

#[async_trait]
impl EngineConnection for MockConnection {
    async fn execute_batch(&self, sql: &str) -> Result<()> {
        self.ensure_open()?;
        self.probe.record_statement(sql);

        if let Some((_, message)) = self
            .script
            .failing_statements
            .iter()
            .find(|(needle, _)| sql.contains(needle.as_str()))
        {
            return Err(ConsoleError::engine(message.clone()));
        }
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<RawResult> {
        self.ensure_open()?;
        self.probe.queries.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.script.query_gate {
            gate.notified().await;
        }
        self.answer(sql)
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.probe.connections_closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Trims whitespace and trailing semicolons.
fn normalize_sql(sql: &str) -> String {
    sql.trim().trim_end_matches(';').trim().to_string()
}

/// Finds a trailing `LIMIT n` clause.
fn parse_limit(sql: &str) -> Option<usize> {
    let tokens: Vec<&str> = sql.split_whitespace().collect();
    tokens
        .windows(2)
        .rev()
        .find(|pair| pair[0].eq_ignore_ascii_case("limit"))
        .and_then(|pair| pair[1].parse().ok())
}

/// Builds the demo events table.
fn demo_events(limit: Option<usize>) -> RawResult {
    const EVENT_TYPES: &[&str] = &["page_view", "click", "signup", "purchase", "logout"];
    const PAGES: &[&str] = &["/", "/pricing", "/docs", "/blog", "/account"];

    let schema = ["id", "event_type", "user_id", "occurred_at", "properties"]
        .iter()
        .map(|name| name.to_string())
        .collect();

    let base = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap_or_default();

    let count = limit.unwrap_or(DEMO_EVENT_ROWS).min(DEMO_EVENT_ROWS);
    let rows = (0..count)
        .map(|i| {
            let user_id = if i % 7 == 3 {
                CellValue::Null
            } else {
                CellValue::Int((i % 13) as i64 + 100)
            };
            vec![
                CellValue::Int(i as i64 + 1),
                CellValue::Text(EVENT_TYPES[i % EVENT_TYPES.len()].to_string()),
                user_id,
                CellValue::Timestamp(base + Duration::minutes(i as i64 * 17)),
                CellValue::Struct(vec![
                    (
                        "page".to_string(),
                        CellValue::Text(PAGES[(i * 3) % PAGES.len()].to_string()),
                    ),
                    (
                        "duration_ms".to_string(),
                        CellValue::Int(((i * 379) % 5000) as i64),
                    ),
                ]),
            ]
        })
        .collect();

    RawResult::new(schema, rows)
}
