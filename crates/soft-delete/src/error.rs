//! Error types for soft-delete operations
//!
//! Configuration and precondition failures are errors. "Nothing happened"
//! outcomes (unsaved entity, zero affected rows, observer veto) are not, and
//! travel through the `Ok` channel as `false`, `0` or `None`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::event_error::EventError;

/// Result type alias for table and policy operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error types for table and policy operations
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// The configured soft-delete column does not exist in the table schema
    #[error("Configured field `{column}` is missing from the table `{table}`.")]
    MissingColumn { column: String, table: String },

    /// A precondition on the arguments of an operation was violated
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(String),

    /// Observer raised an error while handling an event
    #[error("Event error: {0}")]
    Event(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ModelError {
    /// Shorthand for a missing soft-delete column on `table`
    pub fn missing_column(column: &str, table: &str) -> Self {
        ModelError::MissingColumn {
            column: column.to_string(),
            table: table.to_string(),
        }
    }
}

// Convert from sqlx errors
impl From<sqlx::Error> for ModelError {
    fn from(err: sqlx::Error) -> Self {
        ModelError::Database(err.to_string())
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

impl From<EventError> for ModelError {
    fn from(err: EventError) -> Self {
        ModelError::Event(err.to_string())
    }
}

impl From<ConfigError> for ModelError {
    fn from(err: ConfigError) -> Self {
        ModelError::Configuration(err.to_string())
    }
}
