//! Adapter that runs synchronous tools on the blocking thread pool

use crate::tools::base::{Tool, ToolError};
use crate::tools::types::ToolSchema;
use async_trait::async_trait;
use std::sync::Arc;

/// A tool whose work is synchronous or CPU bound
pub trait BlockingTool: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn schema(&self) -> ToolSchema;

    fn invoke_blocking(&self, args: &str) -> Result<String, ToolError>;
}

/// Wraps a [`BlockingTool`] so that each invocation is moved off the
/// scheduler thread with `spawn_blocking` and cannot stall sibling calls.
pub struct BlockingToolAdapter<T> {
    inner: Arc<T>,
}

impl<T: BlockingTool> BlockingToolAdapter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Wrap and erase into a registry-ready tool handle
    pub fn shared(inner: T) -> Arc<dyn Tool> {
        Arc::new(Self::new(inner))
    }
}

#[async_trait]
impl<T: BlockingTool> Tool for BlockingToolAdapter<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn schema(&self) -> ToolSchema {
        self.inner.schema()
    }

    async fn invoke(&self, args: &str) -> Result<String, ToolError> {
        let inner = Arc::clone(&self.inner);
        let args = args.to_string();
        tokio::task::spawn_blocking(move || inner.invoke_blocking(&args))
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("blocking worker failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    struct ThreadNameTool;

    impl BlockingTool for ThreadNameTool {
        fn name(&self) -> &str {
            "thread_name"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new("thread_name", "Reports the worker thread", vec![])
        }

        fn invoke_blocking(&self, _args: &str) -> Result<String, ToolError> {
            Ok(format!("{:?}", thread::current().id()))
        }
    }

    struct PanickingTool;

    impl BlockingTool for PanickingTool {
        fn name(&self) -> &str {
            "panics"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new("panics", "Always panics", vec![])
        }

        fn invoke_blocking(&self, _args: &str) -> Result<String, ToolError> {
            panic!("boom")
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_runs_off_the_calling_thread() {
        let tool = BlockingToolAdapter::new(ThreadNameTool);
        let caller = format!("{:?}", thread::current().id());

        let worker = tool.invoke("{}").await.unwrap();
        assert_ne!(worker, caller);
        assert_eq!(tool.name(), "thread_name");
    }

    #[tokio::test]
    async fn test_worker_panic_becomes_error() {
        let tool = BlockingToolAdapter::new(PanickingTool);
        let err = tool.invoke("{}").await.unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed(_)));
    }
}
