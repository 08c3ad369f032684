//! CLI argument definitions using clap
//!
//! - toolweave run --config manager.toml     # Parse and execute a batch
//! - toolweave parse                         # Parse only
//! - toolweave tools                         # List registered tools

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default manager configuration file used across all CLI commands.
pub const DEFAULT_CONFIG_FILE: &str = "toolweave.toml";

#[derive(Parser)]
#[command(name = "toolweave")]
#[command(about = "Parse model responses and execute the tool calls they contain")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a batch of responses and execute their tool calls
    Run {
        /// Path to the manager configuration file
        #[arg(long, short, default_value = DEFAULT_CONFIG_FILE, env = "TOOLWEAVE_CONFIG")]
        config: PathBuf,

        /// Tool list file, overriding `config_path`
        #[arg(long)]
        tools: Option<PathBuf>,

        /// Responses as a JSON array or JSON lines (stdin if omitted)
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// Parse a batch of responses without executing anything
    Parse {
        /// Responses as a JSON array or JSON lines (stdin if omitted)
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Include the prose preceding the first tool call
        #[arg(long)]
        thought: bool,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// List the tools a configuration registers
    Tools {
        /// Path to the manager configuration file
        #[arg(long, short, default_value = DEFAULT_CONFIG_FILE, env = "TOOLWEAVE_CONFIG")]
        config: PathBuf,

        /// Tool list file, overriding `config_path`
        #[arg(long)]
        tools: Option<PathBuf>,
    },
}

impl Commands {
    /// Manager config file for commands that build a manager
    pub fn config_file(&self) -> Option<&PathBuf> {
        match self {
            Commands::Run { config, .. } | Commands::Tools { config, .. } => Some(config),
            Commands::Parse { .. } => None,
        }
    }
}
