//! Toolweave
//!
//! Tool-call extraction and concurrent tool execution for agent training
//! loops. This crate re-exports the core library and, with the
//! `default-tools` feature, the built-in tools.
//!
//! ```no_run
//! use toolweave::{ExecutionContext, ManagerConfig, ToolManager};
//!
//! # async fn demo() -> toolweave::CoreResult<()> {
//! let manager = ToolManager::builder(ManagerConfig::default().with_config_path("tools.json"))
//!     .with_catalog(toolweave::default_catalog())
//!     .build()
//!     .await?;
//! let (actions, outputs) = manager.execute_actions_async(&["<answer>42</answer>"]).await;
//! # let _ = (actions, outputs, ExecutionContext::detect());
//! # Ok(())
//! # }
//! ```

pub use toolweave_core::*;

#[cfg(feature = "default-tools")]
pub use toolweave_tools::{CalculatorTool, SearchConfig, SearchTool, default_catalog};
