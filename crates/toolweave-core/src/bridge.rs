//! Blocking entry point for synchronous callers
//!
//! Callers state which runtime they are in through [`ExecutionContext`], or
//! let [`ExecutionContext::detect`] decide. Async callers should await the
//! orchestrator directly instead of coming through here.

use crate::error::{CoreError, CoreResult};
use std::future::Future;
use std::sync::mpsc;
use tokio::runtime::{Builder, Handle, RuntimeFlavor};
use tracing::debug;

/// Runtime the bridge should drive work on
#[derive(Debug, Clone)]
pub enum ExecutionContext {
    /// No runtime is available; build a short-lived one per call
    Standalone,
    /// Reuse an existing runtime
    Shared(Handle),
}

impl ExecutionContext {
    /// Use the ambient runtime when there is one
    pub fn detect() -> Self {
        match Handle::try_current() {
            Ok(handle) => ExecutionContext::Shared(handle),
            Err(_) => ExecutionContext::Standalone,
        }
    }

    pub fn is_standalone(&self) -> bool {
        matches!(self, ExecutionContext::Standalone)
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::detect()
    }
}

/// Runs async work to completion from synchronous code
pub struct SyncBridge;

impl SyncBridge {
    /// Block the calling thread until `future` completes
    ///
    /// Only failure to obtain a runtime is an error.
    pub fn run<F>(context: &ExecutionContext, future: F) -> CoreResult<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let ambient = Handle::try_current().ok();

        match (context, ambient) {
            (ExecutionContext::Standalone, None) => {
                let runtime = current_thread_runtime()?;
                Ok(runtime.block_on(future))
            }
            (ExecutionContext::Standalone, Some(_)) => run_on_dedicated_thread(future),
            (ExecutionContext::Shared(handle), Some(current)) => {
                match current.runtime_flavor() {
                    RuntimeFlavor::MultiThread => {
                        debug!("Bridging through block_in_place");
                        let handle = handle.clone();
                        Ok(tokio::task::block_in_place(move || handle.block_on(future)))
                    }
                    // Blocking a current-thread worker would stall its own driver
                    _ => run_on_dedicated_thread(future),
                }
            }
            (ExecutionContext::Shared(handle), None) => match handle.runtime_flavor() {
                RuntimeFlavor::MultiThread => Ok(handle.block_on(future)),
                // Handle::block_on cannot drive a current-thread runtime's timers
                _ => run_on_dedicated_thread(future),
            },
        }
    }
}

fn current_thread_runtime() -> CoreResult<tokio::runtime::Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CoreError::runtime(format!("failed to build runtime: {}", e)))
}

fn run_on_dedicated_thread<F>(future: F) -> CoreResult<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    debug!("Bridging through a dedicated runtime thread");
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("toolweave-bridge".to_string())
        .spawn(move || {
            let result = current_thread_runtime().map(|runtime| runtime.block_on(future));
            let _ = tx.send(result);
        })
        .map_err(|e| CoreError::runtime(format!("failed to spawn bridge thread: {}", e)))?;

    rx.recv()
        .map_err(|_| CoreError::runtime("bridge thread panicked or dropped"))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn slow_sum(a: u32, b: u32) -> u32 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        a + b
    }

    #[test]
    fn test_detect_outside_runtime() {
        let context = ExecutionContext::detect();
        assert!(context.is_standalone());
        assert_eq!(SyncBridge::run(&context, slow_sum(2, 3)).unwrap(), 5);
    }

    #[test]
    fn test_shared_handle_from_plain_thread() {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let context = ExecutionContext::Shared(runtime.handle().clone());

        assert_eq!(SyncBridge::run(&context, slow_sum(1, 1)).unwrap(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_detect_inside_multi_thread_runtime() {
        let context = ExecutionContext::detect();
        assert!(!context.is_standalone());
        assert_eq!(SyncBridge::run(&context, slow_sum(20, 22)).unwrap(), 42);
    }

    #[tokio::test]
    async fn test_detect_inside_current_thread_runtime() {
        let context = ExecutionContext::detect();
        assert_eq!(SyncBridge::run(&context, slow_sum(4, 4)).unwrap(), 8);
    }

    #[tokio::test]
    async fn test_standalone_inside_runtime_does_not_nest() {
        let result = SyncBridge::run(&ExecutionContext::Standalone, slow_sum(1, 2));
        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_panicking_future_is_runtime_error() {
        let result = SyncBridge::run(&ExecutionContext::Standalone, async {
            if slow_sum(0, 0).await == 0 {
                panic!("tool blew up");
            }
            0u32
        });
        assert!(matches!(result, Err(CoreError::Runtime(_))));
    }
}
