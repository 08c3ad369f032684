//! Toolweave Core Library
//!
//! Turns batches of raw model responses into tool executions: response
//! parsing, concurrency limiting, tool invocation, batch orchestration and a
//! blocking bridge for synchronous callers.

pub mod bridge;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod invoker;
pub mod manager;
pub mod orchestrator;
pub mod parser;
pub mod tools;

// Re-export commonly used types
pub use bridge::{ExecutionContext, SyncBridge};
pub use concurrency::{ConcurrencyLimiter, LimiterConfig, LimiterPermit};
pub use config::{LoggingConfig, ManagerConfig, ServerMap, SessionMode, ToolEntry, load_config};
pub use error::{CoreError, CoreResult};
pub use invoker::{Invocation, ToolInvoker};
pub use manager::{SessionConnector, SessionOptions, StaticToolCatalog, ToolManager, ToolManagerBuilder};
pub use orchestrator::{OrchestratorStats, ToolExecutionOrchestrator, TurnOutput};
pub use parser::{Action, ParsedResponse, ResponseParser, TOOL_CALL_END, TOOL_CALL_START};
pub use tools::{
    BlockingTool, BlockingToolAdapter, Role, Tool, ToolCall, ToolError, ToolRegistry, ToolResult,
    ToolSchema, ToolSettings,
};
