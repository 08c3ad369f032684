//! Tool-related type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Name of the sentinel call emitted when a tool-call block could not be decoded
pub const EMPTY_TOOL_NAME: &str = "<empty>";

/// Name of the sentinel call emitted for a stray closing tag
pub const ERROR_TOOL_NAME: &str = "<error>";

/// Argument text carried by both sentinel calls
pub const EXTRACTION_FAILED: &str = "# failed to extract tool name";

/// A tool call extracted from model output
///
/// `raw_args` stays opaque text until the invoker tries to decode it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to call
    pub name: String,
    /// Serialized arguments, or an explanation for sentinel calls
    pub raw_args: String,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(name: impl Into<String>, raw_args: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_args: raw_args.into(),
        }
    }

    /// Placeholder for a block that was truncated or failed to decode
    pub fn empty() -> Self {
        Self::new(EMPTY_TOOL_NAME, EXTRACTION_FAILED)
    }

    /// Placeholder for a closing tag with no opening tag
    pub fn stray_close() -> Self {
        Self::new(ERROR_TOOL_NAME, EXTRACTION_FAILED)
    }

    /// Whether this call stands in for a parse failure
    pub fn is_sentinel(&self) -> bool {
        self.name == EMPTY_TOOL_NAME || self.name == ERROR_TOOL_NAME
    }
}

/// Author of a message handed back to the training loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A single message produced for the next model turn
///
/// The content is always readable text; structured tool output is rendered
/// before it lands here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub role: Role,
    pub content: String,
}

impl ToolResult {
    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Create a tool message
    pub fn tool(content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
        }
    }
}

/// Parameter definition for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Parameter type (string, number, boolean, object, array)
    pub param_type: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Default value (if any)
    pub default: Option<serde_json::Value>,
}

impl ToolParameter {
    /// Create a required string parameter
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::typed(name, description, "string")
    }

    /// Create a required number parameter
    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::typed(name, description, "number")
    }

    /// Create a required integer parameter
    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::typed(name, description, "integer")
    }

    fn typed(
        name: impl Into<String>,
        description: impl Into<String>,
        param_type: &str,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: param_type.to_string(),
            required: true,
            default: None,
        }
    }

    /// Make parameter optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set default value
    pub fn with_default<V: Into<serde_json::Value>>(mut self, default: V) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// JSON schema for a tool, handed to prompt construction upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// Input parameters schema
    pub parameters: serde_json::Value,
}

impl ToolSchema {
    /// Create a new tool schema
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ToolParameter>,
    ) -> Self {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in parameters {
            if param.required {
                required.push(param.name.clone());
            }

            let mut param_schema = serde_json::Map::new();
            param_schema.insert("type".to_string(), param.param_type.into());
            param_schema.insert("description".to_string(), param.description.into());

            if let Some(default) = param.default {
                param_schema.insert("default".to_string(), default);
            }

            properties.insert(param.name, param_schema.into());
        }

        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": required
            }),
        }
    }

    /// Create a schema from a JSON schema object supplied by a remote session
    pub fn from_json(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Per-tool settings carried by a parametrized tool-list entry
pub type ToolSettings = HashMap<String, serde_json::Value>;
