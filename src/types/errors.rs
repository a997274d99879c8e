//! Error types for evalcache.

use thiserror::Error;

use super::orders::{Order, OrderSet};

/// Default result type for evalcache.
pub type EvalResult<T> = Result<T, EvalError>;

/// Possible errors in evalcache.
#[derive(Error, Debug)]
pub enum EvalError {
    /// The requested combination of derivative orders is not served.
    #[error("Unsupported derivative orders: {0}")]
    UnsupportedOrder(OrderSet),

    /// The wrapped evaluator lacks a capability the wrapper needs.
    #[error("Unsupported evaluator: {0}")]
    UnsupportedEvaluator(String),

    /// The wrapped objective itself failed.
    #[error("Evaluation failed: {0}")]
    Evaluation(anyhow::Error),

    /// The wrapped objective returned without a component it was asked for.
    #[error("Evaluator result is missing the {0} component")]
    MissingOrder(Order),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Call log error: {0}")]
    LogStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Other(String),
}

impl EvalError {
    /// Wraps a failure of the objective function.
    pub fn evaluation<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::Evaluation(err.into())
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a call log error.
    pub fn log_store<S: Into<String>>(msg: S) -> Self {
        Self::LogStore(msg.into())
    }

    /// Creates a generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}
