//! icequery - A terminal SQL console for Iceberg catalogs backed by DuckDB.
//!
//! This library exposes the core modules for the binary and integration tests.

pub mod batch;
pub mod cli;
pub mod config;
pub mod connection;
pub mod console;
pub mod engine;
pub mod error;
pub mod grid;
pub mod logging;
pub mod query;
pub mod tui;
