//! Query execution and result normalization for icequery.
//!
//! This module isolates SQL execution and the engine-independent result
//! shape from the console.

pub mod executor;
pub mod result;

pub use executor::{ExecutionRequest, QueryExecutor, QueryOutcome};
pub use result::{NormalizedResult, Row};
