//! Error types for phishwatch
//!
//! Every failure in the check path is recoverable per request. Validation
//! and classifier errors carry a message meant for the person who
//! submitted the URL; storage errors are reported and swallowed by callers.

use thiserror::Error;

/// Main error type for the checker and the check log.
#[derive(Error, Debug)]
pub enum PhishError {
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("{message}")]
    Classifier { message: String },

    #[error("Storage operation failed: {operation}")]
    Storage {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Network operation failed: {operation}")]
    Network {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Mutex lock failed: {resource}")]
    MutexPoisoned { resource: String },
}

pub type PhishResult<T> = Result<T, PhishError>;

impl PhishError {
    /// Create an input validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a classifier error. The message is shown to users verbatim.
    pub fn classifier(message: impl Into<String>) -> Self {
        Self::Classifier {
            message: message.into(),
        }
    }

    pub fn storage(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            operation: operation.into(),
            source,
        }
    }

    pub fn network(operation: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            operation: operation.into(),
            source,
        }
    }

    /// True for errors caused by what the user submitted.
    pub fn is_validation(&self) -> bool {
        matches!(self, PhishError::Validation { .. })
    }

    /// Text suitable for showing back to the person who submitted the form.
    pub fn user_message(&self) -> String {
        match self {
            PhishError::Validation { message, .. } | PhishError::Classifier { message } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

/// Lock a mutex, turning poison into a `PhishError` instead of a panic.
pub trait SafeLock<T: ?Sized> {
    fn safe_lock(&self, resource: &str) -> PhishResult<std::sync::MutexGuard<'_, T>>;
}

impl<T: ?Sized> SafeLock<T> for std::sync::Mutex<T> {
    fn safe_lock(&self, resource: &str) -> PhishResult<std::sync::MutexGuard<'_, T>> {
        self.lock().map_err(|_| PhishError::MutexPoisoned {
            resource: resource.to_string(),
        })
    }
}
