//! Integration tests for icequery.

pub mod batch_test;
pub mod connection_test;
pub mod console_test;
#[cfg(feature = "duckdb")]
pub mod duckdb_test;
pub mod grid_test;
pub mod query_test;

use icequery::config::{Config, ConnectionSettings};
use icequery::connection::ConnectionManager;
use icequery::engine::{MockEngineFactory, MockProbe};
use std::sync::Arc;

/// Settings as they would resolve from a typical config file.
pub fn settings() -> ConnectionSettings {
    let mut config = Config::default();
    config.storage.endpoint = Some("s3.us-east-1.amazonaws.com".into());
    config.storage.access_key_id = Some("AKIA0000".into());
    config.storage.secret_access_key = Some("secret".into());
    config.storage.region = Some("us-east-1".into());
    config.catalog.token = Some("tok'en".into());
    config.catalog.endpoint = Some("https://catalog.example.com/iceberg".into());
    config.catalog.bucket = Some("warehouse".into());
    config.connection_settings()
}

/// Creates a manager over `factory`, returning the factory's probe.
pub fn manager(factory: MockEngineFactory) -> (Arc<ConnectionManager>, Arc<MockProbe>) {
    let probe = factory.probe();
    let manager = Arc::new(ConnectionManager::new(Arc::new(factory), settings()));
    (manager, probe)
}
