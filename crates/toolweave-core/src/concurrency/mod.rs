//! Two-level admission control for tool calls
//!
//! A global semaphore bounds every in-flight tool call; a lazily created
//! per-name semaphore bounds calls to one tool. Waiting suspends the task,
//! never the thread, and each semaphore admits its waiters in FIFO order.

use crate::error::{CoreError, CoreResult};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

fn default_global_limit() -> usize {
    100
}

/// Capacities for the limiter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Maximum tool calls in flight across all tools
    #[serde(default = "default_global_limit")]
    pub global_limit: usize,
    /// Capacity for tools without an explicit entry; the global limit when unset
    #[serde(default)]
    pub default_tool_limit: Option<usize>,
    /// Per-tool capacities
    #[serde(default)]
    pub tool_limits: HashMap<String, usize>,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            global_limit: default_global_limit(),
            default_tool_limit: None,
            tool_limits: HashMap::new(),
        }
    }
}

impl LimiterConfig {
    pub fn with_global_limit(global_limit: usize) -> Self {
        Self {
            global_limit,
            ..Self::default()
        }
    }

    pub fn with_tool_limit(mut self, tool: impl Into<String>, limit: usize) -> Self {
        self.tool_limits.insert(tool.into(), limit);
        self
    }

    /// Capacity that applies to one tool name
    pub fn limit_for(&self, tool: &str) -> usize {
        self.tool_limits
            .get(tool)
            .copied()
            .or(self.default_tool_limit)
            .unwrap_or(self.global_limit)
    }

    /// Reject capacities that could never admit a call
    pub fn validate(&self) -> CoreResult<()> {
        if self.global_limit == 0 {
            return Err(CoreError::config("global concurrency limit must be at least 1"));
        }
        if self.default_tool_limit == Some(0) {
            return Err(CoreError::config("default tool limit must be at least 1"));
        }
        if let Some((tool, _)) = self.tool_limits.iter().find(|(_, limit)| **limit == 0) {
            return Err(CoreError::config(format!(
                "concurrency limit for tool '{}' must be at least 1",
                tool
            )));
        }
        Ok(())
    }
}

struct LimiterState {
    config: LimiterConfig,
    global: Arc<Semaphore>,
    per_tool: DashMap<String, Arc<Semaphore>>,
}

/// Global plus per-tool concurrency limiter
///
/// Cloning is cheap and clones share the same counters. A disabled limiter
/// admits every call immediately.
#[derive(Clone)]
pub struct ConcurrencyLimiter {
    state: Option<Arc<LimiterState>>,
}

impl ConcurrencyLimiter {
    /// Create an enabled limiter
    pub fn new(config: LimiterConfig) -> CoreResult<Self> {
        config.validate()?;
        let global = Arc::new(Semaphore::new(config.global_limit));
        Ok(Self {
            state: Some(Arc::new(LimiterState {
                config,
                global,
                per_tool: DashMap::new(),
            })),
        })
    }

    /// Create a limiter that never blocks
    pub fn disabled() -> Self {
        Self { state: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }

    /// Wait until both the tool's slot and a global slot are free
    ///
    /// The returned permit releases both slots when dropped, on every exit
    /// path of the guarded section.
    pub async fn acquire(&self, key: &str) -> LimiterPermit {
        let Some(state) = &self.state else {
            return LimiterPermit::unlimited();
        };

        let tool_semaphore = state.tool_semaphore(key);

        // The per-tool slot is taken first so a call queued behind its own
        // tool does not sit on global capacity. Semaphores are never closed,
        // so acquisition only ever waits.
        let tool = tool_semaphore.acquire_owned().await.ok();
        let global = Arc::clone(&state.global).acquire_owned().await.ok();
        trace!("Acquired limiter slot for '{}'", key);

        LimiterPermit {
            _tool: tool,
            _global: global,
        }
    }

    /// Free global slots, or `None` when disabled
    pub fn available_global(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.global.available_permits())
    }

    /// Number of tool names holding a semaphore, or `None` when disabled
    pub fn tracked_tools(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.per_tool.len())
    }

    /// Free slots for one tool, or `None` when disabled
    pub fn available_for(&self, key: &str) -> Option<usize> {
        self.state.as_ref().map(|s| match s.per_tool.get(key) {
            Some(semaphore) => semaphore.available_permits(),
            None => s.config.limit_for(key),
        })
    }
}

impl LimiterState {
    fn tool_semaphore(&self, key: &str) -> Arc<Semaphore> {
        if let Some(existing) = self.per_tool.get(key) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .per_tool
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.config.limit_for(key))));
        Arc::clone(entry.value())
    }
}

impl std::fmt::Debug for ConcurrencyLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            Some(state) => f
                .debug_struct("ConcurrencyLimiter")
                .field("global_limit", &state.config.global_limit)
                .field("available", &state.global.available_permits())
                .field("tracked_tools", &state.per_tool.len())
                .finish(),
            None => f.write_str("ConcurrencyLimiter(disabled)"),
        }
    }
}

/// RAII guard for limiter slots
pub struct LimiterPermit {
    _tool: Option<OwnedSemaphorePermit>,
    _global: Option<OwnedSemaphorePermit>,
}

impl LimiterPermit {
    fn unlimited() -> Self {
        Self {
            _tool: None,
            _global: None,
        }
    }
}
