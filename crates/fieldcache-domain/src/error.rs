//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the fieldcache facade
///
/// Availability problems never appear here: a backend whose runtime
/// capability is missing is silently replaced by the null backend at
/// resolution time. What remains is per-call input validation
/// ([`Error::InvalidExpiry`]), fatal construction-time configuration
/// problems ([`Error::Configuration`]), and best-effort storage failures
/// ([`Error::Storage`]) that callers are expected to degrade on.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Malformed expiry input; fatal to the single call, never to the process
    #[error("invalid expiry: {message}")]
    InvalidExpiry {
        /// Description of the rejected input
        message: String,
    },

    /// Required backend configuration absent or unusable; fatal at
    /// backend-construction time since no safe default exists
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem
        message: String,
    },

    /// I/O or network failure during a backend operation
    #[error("storage error: {message}")]
    Storage {
        /// Description of the storage failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create an invalid-expiry error
    pub fn invalid_expiry<S: Into<String>>(message: S) -> Self {
        Self::InvalidExpiry {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a storage error without a source
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Create a storage error wrapping a source error
    pub fn storage_with<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error is fatal configuration (as opposed to a
    /// recoverable storage/availability failure)
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
