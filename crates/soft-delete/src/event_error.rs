use thiserror::Error;

/// Errors raised by observers and listeners
#[derive(Debug, Clone, Error)]
pub enum EventError {
    #[error("Validation error: {message}{}", hint.as_ref().map(|h| format!(" (hint: {})", h)).unwrap_or_default())]
    Validation {
        message: String,
        hint: Option<String>,
    },
    #[error("Observer error: {message}")]
    Observer { message: String },
}

impl EventError {
    pub fn validation(message: &str) -> Self {
        Self::Validation {
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn validation_with_hint(message: &str, hint: &str) -> Self {
        Self::Validation {
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    pub fn observer(message: &str) -> Self {
        Self::Observer {
            message: message.to_string(),
        }
    }
}
