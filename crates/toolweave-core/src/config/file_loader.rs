//! File-based configuration loading

use crate::config::manager_config::ManagerConfig;
use crate::config::tool_entry::ToolEntry;
use crate::error::{CoreError, CoreResult};
use std::fs;
use std::path::Path;

fn read(path: &Path, what: &str) -> CoreResult<String> {
    fs::read_to_string(path).map_err(|e| {
        CoreError::config(format!(
            "Failed to read {} '{}': {}",
            what,
            path.display(),
            e
        ))
    })
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

/// Load manager configuration from a file
///
/// Supports JSON, TOML, and YAML formats based on file extension.
/// Returns default config if file doesn't exist.
pub fn load_from_file(path: &Path) -> CoreResult<ManagerConfig> {
    if !path.exists() {
        return Ok(ManagerConfig::default());
    }

    let content = read(path, "config file")?;

    let config: ManagerConfig = match extension(path) {
        Some("toml") => toml::from_str(&content).map_err(|e| {
            CoreError::config(format!(
                "Failed to parse TOML config '{}': {}",
                path.display(),
                e
            ))
        })?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
            CoreError::config(format!(
                "Failed to parse YAML config '{}': {}",
                path.display(),
                e
            ))
        })?,
        _ => serde_json::from_str(&content).map_err(|e| {
            CoreError::config(format!(
                "Failed to parse JSON config '{}': {}",
                path.display(),
                e
            ))
        })?,
    };

    Ok(config)
}

/// Load a tool list
///
/// YAML by extension, JSON5 otherwise. Unlike the manager config, a missing
/// tool list is an error.
pub fn load_tool_entries(path: &Path) -> CoreResult<Vec<ToolEntry>> {
    let content = read(path, "tool list")?;

    match extension(path) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
            CoreError::config(format!(
                "Failed to parse YAML tool list '{}': {}",
                path.display(),
                e
            ))
        }),
        _ => json5::from_str(&content).map_err(|e| {
            CoreError::config(format!(
                "Failed to parse tool list '{}': {}",
                path.display(),
                e
            ))
        }),
    }
}
