//! Error types for the Chirper client.
//!
//! Every failure the backend can hand us is mapped onto one variant here, so
//! callers can tell a rejected form (422) apart from a dropped connection.

use crate::models::ValidationErrors;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the Chirper client.
#[derive(Debug, Error)]
pub enum ChirperError {
    // Transport errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Rate limited by {service}, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        service: String,
        retry_after_secs: Option<u64>,
    },

    // Backend responses
    #[error("Validation failed: {}", .errors.summary())]
    Validation { errors: ValidationErrors },

    #[error("Unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("HTTP {status} from {path}: {message}")]
    Http {
        status: u16,
        path: String,
        message: String,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Operation cancelled")]
    Cancelled,

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Chirper operations.
pub type Result<T> = std::result::Result<T, ChirperError>;

impl From<std::io::Error> for ChirperError {
    fn from(err: std::io::Error) -> Self {
        ChirperError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for ChirperError {
    fn from(err: serde_json::Error) -> Self {
        ChirperError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for ChirperError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChirperError::Timeout(std::time::Duration::from_secs(0))
        } else if err.is_decode() {
            ChirperError::Json {
                message: err.to_string(),
                source: None,
            }
        } else {
            ChirperError::Network {
                message: err.to_string(),
                cause: std::error::Error::source(&err).map(|s| s.to_string()),
            }
        }
    }
}

impl From<url::ParseError> for ChirperError {
    fn from(err: url::ParseError) -> Self {
        ChirperError::Config {
            message: format!("Invalid URL: {}", err),
        }
    }
}

impl ChirperError {
    /// Build a network error from a message.
    pub fn network(message: impl Into<String>) -> Self {
        ChirperError::Network {
            message: message.into(),
            cause: None,
        }
    }

    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ChirperError::Validation { .. } => Some(422),
            ChirperError::Unauthorized { status, .. } | ChirperError::Http { status, .. } => {
                Some(*status)
            }
            ChirperError::NotFound { .. } => Some(404),
            ChirperError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Field errors when the backend rejected the payload.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            ChirperError::Validation { errors } => Some(errors),
            _ => None,
        }
    }

    /// Check if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChirperError::Network { .. }
            | ChirperError::Timeout(_)
            | ChirperError::RateLimited { .. } => true,
            ChirperError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChirperError::NotFound {
            path: "/chirps/7".into(),
        };
        assert_eq!(err.to_string(), "Not found: /chirps/7");
    }

    #[test]
    fn test_validation_display_lists_fields() {
        let mut errors = ValidationErrors::default();
        errors.push("message", "The message field is required.");
        let err = ChirperError::Validation { errors };
        assert_eq!(
            err.to_string(),
            "Validation failed: message: The message field is required."
        );
        assert_eq!(err.status(), Some(422));
        assert!(err.validation_errors().is_some());
    }

    #[test]
    fn test_retryable_errors() {
        assert!(ChirperError::Timeout(std::time::Duration::from_secs(5)).is_retryable());
        assert!(ChirperError::Http {
            status: 503,
            path: "/chirps".into(),
            message: String::new(),
        }
        .is_retryable());
        assert!(!ChirperError::Http {
            status: 400,
            path: "/chirps".into(),
            message: String::new(),
        }
        .is_retryable());
        assert!(!ChirperError::Validation {
            errors: ValidationErrors::default()
        }
        .is_retryable());
    }
}
