//! Query execution against the managed connection.
//!
//! Provides isolated query execution that can be tested independently
//! of the console.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::NormalizedResult;
use crate::connection::ConnectionManager;
use crate::error::{ConsoleError, Result};

/// A single submission, created when execution starts.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// SQL text, forwarded to the engine unmodified.
    pub sql: String,
    pub submitted_at: Instant,
}

impl ExecutionRequest {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            submitted_at: Instant::now(),
        }
    }
}

/// Outcome of one execution that reached the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Success(NormalizedResult),
    /// The engine rejected the query; carries its message verbatim.
    Failure(String),
}

/// Runs queries on the connection owned by a [`ConnectionManager`].
///
/// The manager lends out one lease at a time, so executors sharing a
/// manager never run two queries at once.
pub struct QueryExecutor {
    manager: Arc<ConnectionManager>,
}

impl QueryExecutor {
    /// Creates a new query executor.
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    /// Returns true while an execution is outstanding on the shared connection.
    pub fn is_busy(&self) -> bool {
        self.manager.is_leased()
    }

    /// Executes `sql` and normalizes the result.
    ///
    /// Returns `NotReady` unless the connection is ready, and `Busy` while
    /// another execution is pending on the same manager. Neither case
    /// contacts the engine.
    pub async fn execute(&self, sql: &str) -> Result<QueryOutcome> {
        if !self.manager.is_ready() {
            return Err(ConsoleError::NotReady);
        }
        let conn = self.manager.connection().await?;

        let request = ExecutionRequest::new(sql);
        debug!(sql = %request.sql, "Executing query");
        let result = conn.query(&request.sql).await;
        let elapsed = request.submitted_at.elapsed();
        drop(conn);

        match result {
            Ok(raw) => {
                let normalized = NormalizedResult::from_raw(raw, elapsed);
                info!(
                    rows = normalized.row_count,
                    elapsed_ms = normalized.execution_time_ms,
                    "Query succeeded"
                );
                Ok(QueryOutcome::Success(normalized))
            }
            Err(err) => {
                warn!(error = %err, "Query failed");
                Ok(QueryOutcome::Failure(err.message()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::{CellValue, MockEngineFactory, MockProbe, RawResult};
    use tokio::sync::Notify;

    async fn ready(factory: MockEngineFactory) -> (Arc<QueryExecutor>, Arc<MockProbe>) {
        let probe = factory.probe();
        let manager = Arc::new(ConnectionManager::new(
            Arc::new(factory),
            Config::default().connection_settings(),
        ));
        manager.initialize().await;
        (Arc::new(QueryExecutor::new(manager)), probe)
    }

    #[tokio::test]
    async fn test_execute_success() {
        let factory = MockEngineFactory::new().respond(
            "SELECT 1 AS id, 'a' AS name",
            RawResult::new(
                vec!["id".into(), "name".into()],
                vec![vec![CellValue::Int(1), "a".into()]],
            ),
        );
        let (executor, _) = ready(factory).await;

        let outcome = executor.execute("SELECT 1 AS id, 'a' AS name").await.unwrap();
        let QueryOutcome::Success(result) = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(result.columns, vec!["id", "name"]);
        assert_eq!(result.row_count, 1);
        assert!(result.execution_time_ms >= 0.0);
        assert!(!executor.is_busy());
    }

    #[tokio::test]
    async fn test_engine_error_is_failure_outcome() {
        let (executor, _) = ready(MockEngineFactory::new()).await;

        let outcome = executor.execute("SELEC 1").await.unwrap();
        assert_eq!(
            outcome,
            QueryOutcome::Failure("Parser Error: syntax error at or near \"SELEC\"".into())
        );
    }

    #[tokio::test]
    async fn test_not_ready_skips_engine() {
        let factory = MockEngineFactory::new();
        let probe = factory.probe();
        let manager = Arc::new(ConnectionManager::new(
            Arc::new(factory),
            Config::default().connection_settings(),
        ));
        let executor = QueryExecutor::new(manager);

        let err = executor.execute("SELECT 1").await.unwrap_err();
        assert!(matches!(err, ConsoleError::NotReady));
        assert_eq!(probe.queries(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_execute_is_rejected() {
        let gate = Arc::new(Notify::new());
        let (executor, probe) = ready(MockEngineFactory::new().gate_queries(gate.clone())).await;

        let first = tokio::spawn({
            let executor = Arc::clone(&executor);
            async move { executor.execute("SELECT 1").await }
        });
        while probe.queries() == 0 {
            tokio::task::yield_now().await;
        }

        let err = executor.execute("SELECT 2").await.unwrap_err();
        assert!(matches!(err, ConsoleError::Busy));
        assert_eq!(probe.queries(), 1);

        gate.notify_one();
        assert!(matches!(
            first.await.unwrap().unwrap(),
            QueryOutcome::Success(_)
        ));
        assert!(!executor.is_busy());
    }

    #[tokio::test]
    async fn test_executors_share_one_lease() {
        let gate = Arc::new(Notify::new());
        let (first, probe) = ready(MockEngineFactory::new().gate_queries(gate.clone())).await;
        let second = QueryExecutor::new(Arc::clone(&first.manager));

        let pending = tokio::spawn({
            let first = Arc::clone(&first);
            async move { first.execute("SELECT 1").await }
        });
        while probe.queries() == 0 {
            tokio::task::yield_now().await;
        }

        assert!(second.is_busy());
        let err = second.execute("SELECT 2").await.unwrap_err();
        assert!(matches!(err, ConsoleError::Busy));
        assert_eq!(probe.queries(), 1);

        gate.notify_one();
        assert!(matches!(
            pending.await.unwrap().unwrap(),
            QueryOutcome::Success(_)
        ));
        gate.notify_one();
        assert!(matches!(
            second.execute("SELECT 2").await.unwrap(),
            QueryOutcome::Success(_)
        ));
        assert_eq!(probe.queries(), 2);
    }
}
