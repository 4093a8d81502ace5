//! Error types for icequery.
//!
//! Defines the main error enum used throughout the application, plus the
//! initialization error carried by a failed connection.

use std::fmt;
use thiserror::Error;

/// The setup step a connection attempt was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    /// Acquiring an engine instance from the factory.
    InstantiateEngine,
    /// Opening a connection on the engine instance.
    OpenConnection,
    /// Loading extensions and setting remote-storage parameters.
    ConfigureStorage,
    /// Creating the named catalog secret.
    RegisterSecret,
    /// Attaching the catalog bound to the secret.
    AttachCatalog,
}

impl InitStep {
    /// Returns a short human-readable label for the step.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InstantiateEngine => "instantiate engine",
            Self::OpenConnection => "open connection",
            Self::ConfigureStorage => "configure storage",
            Self::RegisterSecret => "register secret",
            Self::AttachCatalog => "attach catalog",
        }
    }
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal failure of the connection setup protocol.
///
/// The message is the engine's own text, never rewritten.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct InitError {
    /// Step that failed.
    pub step: InitStep,
    /// Engine-provided message.
    pub message: String,
}

impl InitError {
    /// Creates an initialization error for the given step.
    pub fn new(step: InitStep, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }

    /// Creates an initialization error from an engine failure at the given step.
    pub fn at(step: InitStep, err: ConsoleError) -> Self {
        Self::new(step, err.message())
    }
}

/// Main error type for icequery operations.
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Errors raised by the query engine. The text is displayed verbatim.
    #[error("{0}")]
    Engine(String),

    /// The connection failed to come online.
    #[error("Initialization error: {0}")]
    Initialization(InitError),

    /// A query was submitted before the connection was ready.
    #[error("Database connection not ready")]
    NotReady,

    /// A query was submitted while another one was still running.
    #[error("A query is already running")]
    Busy,

    /// Configuration errors (invalid config file, unreadable SQL file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (terminal failures, task panics, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    /// Creates an engine error with the given message.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the message without the category prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Engine(msg) | Self::Config(msg) | Self::Internal(msg) => msg.clone(),
            Self::Initialization(err) => err.message.clone(),
            Self::NotReady | Self::Busy => self.to_string(),
        }
    }

    /// One-line report for the terminal, e.g. `Configuration Error: <msg>`.
    pub fn report(&self) -> String {
        format!("{}: {}", self.category(), self.message())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Engine(_) => "Engine Error",
            Self::Initialization(_) => "Initialization Error",
            Self::NotReady => "Not Ready",
            Self::Busy => "Busy",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

impl From<InitError> for ConsoleError {
    fn from(err: InitError) -> Self {
        Self::Initialization(err)
    }
}

/// Result type alias using ConsoleError.
pub type Result<T> = std::result::Result<T, ConsoleError>;
