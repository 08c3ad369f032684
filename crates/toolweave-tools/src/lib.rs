//! Built-in tools for Toolweave

pub mod calculator;
pub mod search;

pub use calculator::CalculatorTool;
pub use search::{SearchConfig, SearchTool};

use std::sync::Arc;
use toolweave_core::StaticToolCatalog;
use toolweave_core::tools::{BlockingToolAdapter, Tool};

/// Catalog of every built-in tool, keyed by tool name
pub fn default_catalog() -> StaticToolCatalog {
    StaticToolCatalog::new()
        .register(calculator::TOOL_NAME, |_| {
            Ok(BlockingToolAdapter::shared(CalculatorTool::new()))
        })
        .register(search::TOOL_NAME, |settings| {
            Ok(Arc::new(SearchTool::from_settings(settings)?) as Arc<dyn Tool>)
        })
}
