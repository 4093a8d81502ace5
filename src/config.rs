//! Configuration management for icequery.
//!
//! Handles loading configuration from TOML files and environment variables,
//! covering remote object storage, the Iceberg catalog and engine setup.

use crate::error::{ConsoleError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default catalog alias used in `ATTACH ... AS <alias>`.
pub const DEFAULT_CATALOG_ALIAS: &str = "iceberg_catalog";

/// Default name of the engine secret holding the catalog token.
pub const DEFAULT_SECRET_NAME: &str = "iceberg_secret";

/// Initial editor contents.
pub const DEFAULT_QUERY: &str =
    "-- Query your Iceberg tables\nSELECT * FROM iceberg_catalog.analytics.events\nLIMIT 100;";

/// Main configuration structure for icequery.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Remote object storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Iceberg catalog settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Engine setup.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Console behavior.
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// S3-compatible object storage settings.
#[derive(Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StorageConfig {
    /// Storage endpoint host (e.g., "s3.us-east-1.amazonaws.com").
    pub endpoint: Option<String>,

    /// Access key id.
    pub access_key_id: Option<String>,

    /// Secret access key (not recommended to store in config).
    pub secret_access_key: Option<String>,

    /// Storage region.
    pub region: Option<String>,
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &redacted(&self.secret_access_key))
            .field("region", &self.region)
            .finish()
    }
}

/// Iceberg REST catalog settings.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    /// Catalog bearer token.
    pub token: Option<String>,

    /// Catalog REST endpoint.
    pub endpoint: Option<String>,

    /// Warehouse bucket or location to attach.
    pub bucket: Option<String>,

    /// Name the catalog is attached under.
    #[serde(default = "default_alias")]
    pub alias: String,

    /// Name of the secret registered for the catalog.
    #[serde(default = "default_secret_name")]
    pub secret_name: String,
}

fn default_alias() -> String {
    DEFAULT_CATALOG_ALIAS.to_string()
}

fn default_secret_name() -> String {
    DEFAULT_SECRET_NAME.to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            token: None,
            endpoint: None,
            bucket: None,
            alias: default_alias(),
            secret_name: default_secret_name(),
        }
    }
}

impl fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("token", &redacted(&self.token))
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("alias", &self.alias)
            .field("secret_name", &self.secret_name)
            .finish()
    }
}

/// Engine setup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Extensions installed and loaded before storage is configured.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["httpfs".to_string(), "iceberg".to_string()]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

/// Console behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsoleConfig {
    /// Text the editor starts with.
    #[serde(default = "default_query")]
    pub default_query: String,
}

fn default_query() -> String {
    DEFAULT_QUERY.to_string()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            default_query: default_query(),
        }
    }
}

fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "<redacted>")
}

/// Settings the connection setup protocol consumes, with missing values as
/// empty strings.
#[derive(Clone, Default, PartialEq)]
pub struct ConnectionSettings {
    pub storage_endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub catalog_token: String,
    pub catalog_endpoint: String,
    pub bucket: String,
    pub alias: String,
    pub secret_name: String,
    pub extensions: Vec<String>,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("storage_endpoint", &self.storage_endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("catalog_token", &"<redacted>")
            .field("catalog_endpoint", &self.catalog_endpoint)
            .field("bucket", &self.bucket)
            .field("alias", &self.alias)
            .field("secret_name", &self.secret_name)
            .field("extensions", &self.extensions)
            .finish()
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("icequery")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConsoleError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ConsoleError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies environment variables (S3_ENDPOINT, ICEBERG_TOKEN, etc.) over
    /// the file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary variable source.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&str, &mut Option<String>); 7] = [
            ("S3_ENDPOINT", &mut self.storage.endpoint),
            ("S3_ACCESS_KEY_ID", &mut self.storage.access_key_id),
            ("S3_SECRET_ACCESS_KEY", &mut self.storage.secret_access_key),
            ("S3_REGION", &mut self.storage.region),
            ("ICEBERG_TOKEN", &mut self.catalog.token),
            ("ICEBERG_CATALOG_ENDPOINT", &mut self.catalog.endpoint),
            ("ICEBERG_BUCKET", &mut self.catalog.bucket),
        ];

        for (key, field) in fields {
            if let Some(value) = lookup(key) {
                *field = Some(value);
            }
        }
    }

    /// Resolves the settings used to bring the connection online.
    pub fn connection_settings(&self) -> ConnectionSettings {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        ConnectionSettings {
            storage_endpoint: text(&self.storage.endpoint),
            access_key_id: text(&self.storage.access_key_id),
            secret_access_key: text(&self.storage.secret_access_key),
            region: text(&self.storage.region),
            catalog_token: text(&self.catalog.token),
            catalog_endpoint: text(&self.catalog.endpoint),
            bucket: text(&self.catalog.bucket),
            alias: self.catalog.alias.clone(),
            secret_name: self.catalog.secret_name.clone(),
            extensions: self.engine.extensions.clone(),
        }
    }
}
