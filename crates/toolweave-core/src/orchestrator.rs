//! Batch execution of parsed actions
//!
//! One output slot per input action. Actions run concurrently with each
//! other, and the calls inside one action run concurrently too, each gated by
//! the limiter under its tool name. Results always come back in input order.

use crate::concurrency::ConcurrencyLimiter;
use crate::invoker::{Invocation, ToolInvoker};
use crate::parser::Action;
use crate::tools::registry::ToolRegistry;
use crate::tools::types::{ToolCall, ToolResult};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Output slot for one action in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnOutput {
    /// Answer or extraction error
    Message(ToolResult),
    /// One tool message per call, in call order
    Messages(Vec<ToolResult>),
}

impl TurnOutput {
    pub fn messages(&self) -> &[ToolResult] {
        match self {
            TurnOutput::Message(message) => std::slice::from_ref(message),
            TurnOutput::Messages(messages) => messages,
        }
    }

    pub fn into_messages(self) -> Vec<ToolResult> {
        match self {
            TurnOutput::Message(message) => vec![message],
            TurnOutput::Messages(messages) => messages,
        }
    }
}

/// Snapshot of orchestrator counters
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OrchestratorStats {
    pub total_calls: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub unresolved: u64,
    pub total_wait_time: Duration,
}

#[derive(Debug, Default)]
struct StatsCounters {
    total_calls: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
    unresolved: AtomicU64,
    wait_micros: AtomicU64,
}

impl StatsCounters {
    fn record(&self, outcome: &Invocation, wait: Duration) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        let micros = u64::try_from(wait.as_micros()).unwrap_or(u64::MAX);
        self.wait_micros.fetch_add(micros, Ordering::Relaxed);
        let counter = match outcome {
            Invocation::Succeeded { .. } => &self.succeeded,
            Invocation::TimedOut { .. } => &self.timed_out,
            Invocation::Unresolved { .. } => &self.unresolved,
            Invocation::Failed { .. }
            | Invocation::Passthrough(_)
            | Invocation::UnexpectedArgs { .. } => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> OrchestratorStats {
        OrchestratorStats {
            total_calls: self.total_calls.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            unresolved: self.unresolved.load(Ordering::Relaxed),
            total_wait_time: Duration::from_micros(self.wait_micros.load(Ordering::Relaxed)),
        }
    }
}

/// Fans parsed actions out to the tool invoker
#[derive(Debug, Clone)]
pub struct ToolExecutionOrchestrator {
    invoker: ToolInvoker,
    limiter: ConcurrencyLimiter,
    stats: Arc<StatsCounters>,
}

impl ToolExecutionOrchestrator {
    pub fn new(registry: Arc<ToolRegistry>, limiter: ConcurrencyLimiter) -> Self {
        Self {
            invoker: ToolInvoker::new(registry),
            limiter,
            stats: Arc::new(StatsCounters::default()),
        }
    }

    /// Bound each tool run; `None` waits indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.invoker = self.invoker.with_timeout(timeout);
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.invoker.registry()
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    pub fn stats(&self) -> OrchestratorStats {
        self.stats.snapshot()
    }

    /// Execute a batch, one output slot per action in input order
    #[instrument(skip_all, fields(batch_size = actions.len()))]
    pub async fn execute_batch(&self, actions: &[Action]) -> Vec<TurnOutput> {
        let started = Instant::now();
        let outputs = join_all(actions.iter().map(|action| self.execute_action(action))).await;
        info!(
            "Executed batch of {} actions in {:?}",
            actions.len(),
            started.elapsed()
        );
        outputs
    }

    /// Execute one parsed action
    pub async fn execute_action(&self, action: &Action) -> TurnOutput {
        match action {
            Action::Answer(answer) => TurnOutput::Message(ToolResult::assistant(answer.clone())),
            Action::Error(reason) => TurnOutput::Message(ToolResult::assistant(format!(
                "# Extract the tools failed due to: {}",
                reason
            ))),
            Action::Actions(calls) => TurnOutput::Messages(self.execute_calls(calls).await),
        }
    }

    /// Execute tool calls concurrently, returning results index-aligned with `calls`
    pub async fn execute_calls(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        join_all(calls.iter().map(|call| self.execute_call(call))).await
    }

    async fn execute_call(&self, call: &ToolCall) -> ToolResult {
        let wait_start = Instant::now();
        // Only registered names get limiter slots; anything else resolves to
        // a feedback message without running a tool.
        let _permit = match self.registry().get(&call.name) {
            Some(_) => Some(self.limiter.acquire(&call.name).await),
            None => None,
        };
        let wait = wait_start.elapsed();

        let outcome = self.invoker.run(call).await;
        debug!(
            "Call to '{}' finished (success: {}, waited {:?})",
            call.name,
            outcome.is_success(),
            wait
        );
        self.stats.record(&outcome, wait);
        outcome.into_result()
    }
}
