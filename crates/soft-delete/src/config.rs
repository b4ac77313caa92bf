//! Soft-delete configuration
//!
//! A single per-table option: the name of the timestamp column that marks a
//! row as deleted. Defaults to `deleted`.

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column used when nothing else is configured
pub const DEFAULT_SOFT_DELETE_FIELD: &str = "deleted";

/// Environment variable overriding the default column name
pub const SOFT_DELETE_FIELD_ENV: &str = "SOFT_DELETE_FIELD";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: '{value}', expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },
}

/// Per-table soft-delete configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftDeleteConfig {
    /// Name of the nullable timestamp column marking deletion
    pub field: String,
}

impl Default for SoftDeleteConfig {
    fn default() -> Self {
        Self {
            field: DEFAULT_SOFT_DELETE_FIELD.to_string(),
        }
    }
}

impl SoftDeleteConfig {
    /// Configuration using a custom column name
    pub fn with_field(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }

    /// Load configuration from the environment, falling back to the default column
    pub fn from_env() -> Result<Self, ConfigError> {
        let field = get_env_or_default(SOFT_DELETE_FIELD_ENV, DEFAULT_SOFT_DELETE_FIELD);
        let config = Self { field };
        config.validate()?;
        Ok(config)
    }

    /// Reject names that could never be a column identifier.
    ///
    /// Whether the column actually exists is a schema question and is only
    /// answered on first use of the policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "field".to_string(),
                reason: "Soft delete field cannot be empty".to_string(),
            });
        }

        let valid = self
            .field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !self.field.starts_with(|c: char| c.is_ascii_digit());
        if !valid {
            return Err(ConfigError::InvalidValue {
                field: "field".to_string(),
                value: self.field.clone(),
                expected: "a column identifier".to_string(),
            });
        }

        Ok(())
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
