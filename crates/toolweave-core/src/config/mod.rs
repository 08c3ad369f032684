//! Configuration for the tool manager

mod env_loader;
mod file_loader;
mod manager_config;
mod tool_entry;

pub use env_loader::{
    ENV_ENABLE_LIMITER, ENV_MAX_CONCURRENCY, ENV_TOOL_TIMEOUT_SECS, apply_env_overrides,
    apply_env_with,
};
pub use file_loader::{load_from_file, load_tool_entries};
pub use manager_config::{LoggingConfig, ManagerConfig, ParallelSessionConfig, SessionMode};
pub use tool_entry::{ServerMap, SessionServerConfig, ToolEntry};

use crate::error::CoreResult;
use std::path::Path;

/// Load a manager config file, then apply environment overrides
///
/// A relative `config_path` is resolved against the config file's directory.
pub fn load_config(path: &Path) -> CoreResult<ManagerConfig> {
    let mut config = load_from_file(path)?;
    apply_env_overrides(&mut config)?;

    if let (Some(tools), Some(dir)) = (config.config_path.as_ref(), path.parent()) {
        if tools.is_relative() {
            config.config_path = Some(dir.join(tools));
        }
    }

    config.validate()?;
    Ok(config)
}
