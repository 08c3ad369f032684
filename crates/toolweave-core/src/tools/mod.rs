//! Tool system: the capability trait, call/result types and the registry

pub mod base;
pub mod blocking;
pub mod registry;
pub mod types;

pub use base::{Tool, ToolError, parse_args};
pub use blocking::{BlockingTool, BlockingToolAdapter};
pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use types::{
    EMPTY_TOOL_NAME, ERROR_TOOL_NAME, EXTRACTION_FAILED, Role, ToolCall, ToolParameter,
    ToolResult, ToolSchema, ToolSettings,
};
