//! Query engine abstraction layer for icequery.
//!
//! Provides a trait-based interface over the embedded analytical engine, so
//! the connection lifecycle and query pipeline can run against DuckDB or the
//! scripted mock engine interchangeably.

#[cfg(feature = "duckdb")]
mod duckdb_engine;
mod mock;
mod types;

#[cfg(feature = "duckdb")]
pub use duckdb_engine::DuckDbFactory;
pub use mock::{MockEngineFactory, MockProbe};
pub use types::{escape_bytes, CellValue, RawResult};

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Produces engine instances.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// Short engine name for display purposes.
    fn name(&self) -> &'static str;

    /// Acquires a fresh engine instance.
    async fn instantiate(&self) -> Result<Box<dyn Engine>>;
}

/// A running engine instance.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Opens a connection on this instance.
    async fn connect(&self) -> Result<Box<dyn EngineConnection>>;

    /// Releases the instance.
    async fn shutdown(&self) -> Result<()>;
}

/// One open session against the engine.
///
/// All operations are async and return Results with ConsoleError; engine
/// failures are reported as `ConsoleError::Engine` carrying the engine's text.
#[async_trait]
pub trait EngineConnection: Send + Sync {
    /// Executes one or more statements, discarding any results.
    async fn execute_batch(&self, sql: &str) -> Result<()>;

    /// Executes a query and returns its schema and rows.
    async fn query(&self, sql: &str) -> Result<RawResult>;

    /// Closes the connection.
    async fn close(&self) -> Result<()>;
}

/// Creates the engine factory selected on the command line.
pub fn factory(mock: bool) -> Result<Arc<dyn EngineFactory>> {
    if mock {
        return Ok(Arc::new(MockEngineFactory::demo()));
    }

    #[cfg(feature = "duckdb")]
    {
        Ok(Arc::new(DuckDbFactory::new()))
    }

    #[cfg(not(feature = "duckdb"))]
    {
        Err(crate::error::ConsoleError::config(
            "built without the `duckdb` feature; run with --mock-engine",
        ))
    }
}
