//! Error types for recurra.

use thiserror::Error;

/// Errors that can occur in recurra operations.
#[derive(Error, Debug)]
pub enum RecurraError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Rule parse error: {0}")]
    RuleParse(String),

    #[error("Unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RecurraError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        RecurraError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the offending field, for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            RecurraError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type alias for recurra operations.
pub type RecurraResult<T> = Result<T, RecurraError>;
