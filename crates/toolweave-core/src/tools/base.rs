//! Base trait and error type for tools

use crate::tools::types::ToolSchema;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Error type for tool operations
///
/// Every variant ends up rendered into a tool-result message; none of them
/// abort a batch.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid arguments provided to the tool
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool execution failed
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Tool did not finish in time
    #[error("tool execution timed out after {0:?}")]
    Timeout(Duration),

    /// Session connection could not be established
    #[error("Connection failed: {0}")]
    Connection(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error reported by a remote service
    #[error("HTTP error: {0}")]
    Http(String),

    /// Other error
    #[error("Other error: {0}")]
    Other(String),
}

/// Capability exposed by every tool in the registry
///
/// Static tools, session-backed tools and wrapped blocking tools all implement
/// this one trait, so the invoker never needs to know which kind it holds.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's unique name
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str {
        ""
    }

    /// Get the tool's JSON schema for input parameters
    fn schema(&self) -> ToolSchema;

    /// Run the tool with canonically serialized JSON arguments
    async fn invoke(&self, args: &str) -> Result<String, ToolError>;
}

/// Decode serialized tool arguments into a typed input struct
pub fn parse_args<T: DeserializeOwned>(args: &str) -> Result<T, ToolError> {
    serde_json::from_str(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct QueryInput {
        query: String,
    }

    #[test]
    fn test_parse_args() {
        let input: QueryInput = parse_args(r#"{"query": "weather"}"#).unwrap();
        assert_eq!(input.query, "weather");
    }

    #[test]
    fn test_parse_args_reports_invalid_arguments() {
        let err = parse_args::<QueryInput>(r#"{"q": 1}"#).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(
            ToolError::Timeout(Duration::from_secs(30)).to_string(),
            "tool execution timed out after 30s"
        );
    }
}
