//! Error types for operator-facing failures
//!
//! Anything caused by model output is turned into feedback text and never
//! reaches these types. `CoreError` is reserved for misconfiguration and for
//! failures of the surrounding runtime, both of which abort the caller.

use thiserror::Error;

/// Result type alias for Toolweave operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Main error type for Toolweave
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// The async runtime could not be created or a worker died
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl CoreError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }

    /// Whether this error was caused by deployment configuration
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<std::io::Error> for CoreError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = CoreError::config("unknown tool 'foo'");
        assert_eq!(err.to_string(), "Configuration error: unknown tool 'foo'");
        assert!(err.is_config());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::Io(_)));
        assert!(!err.is_config());
    }
}
