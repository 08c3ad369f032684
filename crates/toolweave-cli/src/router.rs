//! Command routing logic for CLI

use crate::args::Commands;
use anyhow::{Context, Result};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use toolweave_core::{ManagerConfig, ResponseParser, ToolManager};
use toolweave_tools::default_catalog;
use tracing::info;

/// Route a subcommand to its handler
pub async fn route(command: Commands, config: Option<ManagerConfig>) -> Result<()> {
    match command {
        Commands::Run {
            tools,
            input,
            pretty,
            ..
        } => {
            let manager = build_manager(config.unwrap_or_default(), tools).await?;
            let responses = read_responses(input.as_deref())?;
            info!("Running a batch of {} responses", responses.len());

            let (actions, results) = manager.execute_actions_async(&responses).await;
            print_json(&json!({ "actions": actions, "results": results }), pretty)
        }
        Commands::Parse {
            input,
            thought,
            pretty,
        } => {
            let parser = ResponseParser::new();
            let responses = read_responses(input.as_deref())?;
            let output = if thought {
                json!(
                    responses
                        .iter()
                        .map(|r| parser.parse_response(r))
                        .collect::<Vec<_>>()
                )
            } else {
                json!(responses.iter().map(|r| parser.parse(r)).collect::<Vec<_>>())
            };
            print_json(&output, pretty)
        }
        Commands::Tools { tools, .. } => {
            let manager = build_manager(config.unwrap_or_default(), tools).await?;
            print_json(&json!(manager.functions()), true)
        }
    }
}

async fn build_manager(mut config: ManagerConfig, tools: Option<PathBuf>) -> Result<ToolManager> {
    if let Some(tools) = tools {
        config.config_path = Some(tools);
    }
    ToolManager::builder(config)
        .with_catalog(default_catalog())
        .build()
        .await
        .context("Failed to build the tool manager")
}

fn read_responses(input: Option<&Path>) -> Result<Vec<String>> {
    let content = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input '{}'", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    parse_responses(&content)
}

/// Accept a JSON array of strings, or one JSON string per line
pub fn parse_responses(content: &str) -> Result<Vec<String>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("Input is not a JSON array of strings");
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<String>(line)
                .with_context(|| format!("Line {} is not a JSON string", index + 1))
        })
        .collect()
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}
