//! Tool manager configuration

use crate::concurrency::{ConcurrencyLimiter, LimiterConfig};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

fn default_max_concurrency() -> usize {
    100
}

fn default_instances() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Transport used to reach session-backed tool servers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    #[default]
    Sse,
    Stdio,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Sse => write!(f, "sse"),
            SessionMode::Stdio => write!(f, "stdio"),
        }
    }
}

impl FromStr for SessionMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sse" => Ok(SessionMode::Sse),
            "stdio" => Ok(SessionMode::Stdio),
            other => Err(CoreError::config(format!(
                "Unknown session mode '{}', expected 'sse' or 'stdio'",
                other
            ))),
        }
    }
}

/// Fan one session server out to several connections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelSessionConfig {
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default = "default_instances")]
    pub num_instances: usize,
}

impl Default for ParallelSessionConfig {
    fn default() -> Self {
        Self {
            is_enabled: false,
            num_instances: default_instances(),
        }
    }
}

impl ParallelSessionConfig {
    /// Number of connections to open per server
    pub fn instances(&self) -> usize {
        if self.is_enabled { self.num_instances } else { 1 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Configuration for a [`crate::ToolManager`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Tool list file (YAML or JSON5)
    #[serde(default)]
    pub config_path: Option<PathBuf>,
    /// Gate tool calls through the concurrency limiter
    #[serde(default)]
    pub enable_limiter: bool,
    /// Global limiter capacity
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Capacity for tools without an entry in `tool_limits`
    #[serde(default)]
    pub default_tool_limit: Option<usize>,
    #[serde(default)]
    pub tool_limits: HashMap<String, usize>,
    /// Per-call timeout; unset waits indefinitely
    #[serde(default)]
    pub tool_timeout_secs: Option<u64>,
    #[serde(default)]
    pub session_mode: SessionMode,
    #[serde(default)]
    pub parallel_sse_tool_call: ParallelSessionConfig,
    /// Restrict the registry to these names after loading
    #[serde(default)]
    pub tool_name_selected: Option<Vec<String>>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            enable_limiter: false,
            max_concurrency: default_max_concurrency(),
            default_tool_limit: None,
            tool_limits: HashMap::new(),
            tool_timeout_secs: None,
            session_mode: SessionMode::default(),
            parallel_sse_tool_call: ParallelSessionConfig::default(),
            tool_name_selected: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl ManagerConfig {
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_limiter(mut self, max_concurrency: usize) -> Self {
        self.enable_limiter = true;
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_tool_timeout_secs(mut self, secs: u64) -> Self {
        self.tool_timeout_secs = Some(secs);
        self
    }

    pub fn limiter_config(&self) -> LimiterConfig {
        LimiterConfig {
            global_limit: self.max_concurrency,
            default_tool_limit: self.default_tool_limit,
            tool_limits: self.tool_limits.clone(),
        }
    }

    /// Build the limiter this configuration asks for
    pub fn build_limiter(&self) -> CoreResult<ConcurrencyLimiter> {
        if self.enable_limiter {
            ConcurrencyLimiter::new(self.limiter_config())
        } else {
            Ok(ConcurrencyLimiter::disabled())
        }
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_secs.map(Duration::from_secs)
    }

    /// Reject settings that can never work
    pub fn validate(&self) -> CoreResult<()> {
        if self.enable_limiter {
            self.limiter_config().validate()?;
        }
        if self.tool_timeout_secs == Some(0) {
            return Err(CoreError::config("tool_timeout_secs must be at least 1"));
        }
        if self.parallel_sse_tool_call.is_enabled && self.parallel_sse_tool_call.num_instances == 0
        {
            return Err(CoreError::config(
                "parallel_sse_tool_call.num_instances must be at least 1",
            ));
        }
        Ok(())
    }
}
