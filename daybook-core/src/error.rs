//! Error types for daybook.

use thiserror::Error;

/// Errors that can occur in daybook operations.
#[derive(Error, Debug)]
pub enum DaybookError {
    /// Bad input shape or semantics. The message is shown to the user as-is.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Attempted mutation of the built-in holidays category.
    #[error("{0}")]
    ProtectedEntity(String),

    #[error("Store unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DaybookError {
    pub fn validation(message: impl Into<String>) -> Self {
        DaybookError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DaybookError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// True when the failure came from the document store rather than from
    /// the caller's input.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, DaybookError::RemoteUnavailable(_) | DaybookError::Io(_))
    }
}

impl From<serde_json::Error> for DaybookError {
    fn from(err: serde_json::Error) -> Self {
        DaybookError::Serialization(err.to_string())
    }
}

/// Result type alias for daybook operations.
pub type DaybookResult<T> = Result<T, DaybookError>;
