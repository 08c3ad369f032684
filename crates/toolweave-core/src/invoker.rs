//! Single tool-call execution
//!
//! Every path ends in an [`Invocation`]; nothing raised by a tool or caused
//! by malformed arguments escapes, so one bad call never aborts a batch.

use crate::tools::base::{Tool, ToolError};
use crate::tools::registry::ToolRegistry;
use crate::tools::types::{EMPTY_TOOL_NAME, ERROR_TOOL_NAME, ToolCall, ToolResult};
use futures::FutureExt;
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::io;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Outcome of invoking one tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// The tool ran and returned output
    Succeeded {
        tool: String,
        args: String,
        output: String,
    },
    /// The tool ran and reported an error
    Failed {
        tool: String,
        args: String,
        error: String,
    },
    /// The tool did not finish within the configured timeout
    TimedOut {
        tool: String,
        args: String,
        after: Duration,
    },
    /// The name is not in the registry
    Unresolved { name: String },
    /// Text forwarded as-is: sentinel explanations and non-JSON argument text
    Passthrough(String),
    /// Arguments decoded to JSON that is neither an object nor a string
    UnexpectedArgs { kind: &'static str, args: String },
}

impl Invocation {
    pub fn is_success(&self) -> bool {
        matches!(self, Invocation::Succeeded { .. })
    }

    /// Render into the tool message handed to the next turn
    pub fn into_result(self) -> ToolResult {
        ToolResult::tool(self.to_string())
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Succeeded { tool, args, output } => write!(
                f,
                "# Execute the tool {} succeeded\n  - The args are: {}\n  - The result is:\n{}",
                tool, args, output
            ),
            Invocation::Failed { tool, args, error } => write_failure(f, tool, args, error),
            Invocation::TimedOut { tool, args, after } => {
                write_failure(f, tool, args, &ToolError::Timeout(*after).to_string())
            }
            Invocation::Unresolved { name } => {
                write!(f, "# Failed to find the tool {} in the tool map", name)
            }
            Invocation::Passthrough(text) => f.write_str(text),
            Invocation::UnexpectedArgs { kind, args } => {
                write!(f, "Unexpected type of args: {} (args: {})", kind, args)
            }
        }
    }
}

fn write_failure(f: &mut fmt::Formatter<'_>, tool: &str, args: &str, error: &str) -> fmt::Result {
    write!(
        f,
        "# Execute the tool {} failed\n  - The original args are: {}\n  - Error message:\n{}",
        tool, args, error
    )
}

/// Single-line JSON with a space after `:` and `,`
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Render arguments for feedback messages
fn display_args(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, SpacedFormatter);
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Run a tool, turning a panic inside its future into an execution error
async fn invoke_guarded(tool: &dyn Tool, args: &str) -> Result<String, ToolError> {
    match AssertUnwindSafe(tool.invoke(args)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            warn!("Tool '{}' panicked: {}", tool.name(), message);
            Err(ToolError::ExecutionFailed(format!("tool panicked: {}", message)))
        }
    }
}

/// Resolves tool calls against a registry and runs them
#[derive(Debug, Clone)]
pub struct ToolInvoker {
    registry: Arc<ToolRegistry>,
    timeout: Option<Duration>,
}

impl ToolInvoker {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            timeout: None,
        }
    }

    /// Bound each tool run; `None` waits indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Invoke a call and render the outcome as a tool message
    pub async fn invoke(&self, call: &ToolCall) -> ToolResult {
        self.run(call).await.into_result()
    }

    /// Invoke a call and return the structured outcome
    pub async fn run(&self, call: &ToolCall) -> Invocation {
        match call.name.as_str() {
            EMPTY_TOOL_NAME => return Invocation::Passthrough(call.raw_args.clone()),
            ERROR_TOOL_NAME => {
                return Invocation::Unresolved {
                    name: call.name.clone(),
                };
            }
            _ => {}
        }

        let Some(tool) = self.registry.get(&call.name) else {
            debug!("Tool '{}' is not registered", call.name);
            return Invocation::Unresolved {
                name: call.name.clone(),
            };
        };

        let arguments = match serde_json::from_str::<Value>(&call.raw_args) {
            Ok(Value::Object(arguments)) => Value::Object(arguments),
            Ok(Value::String(text)) => return Invocation::Passthrough(text),
            Ok(other) => {
                return Invocation::UnexpectedArgs {
                    kind: json_kind(&other),
                    args: call.raw_args.clone(),
                };
            }
            Err(_) => return Invocation::Passthrough(call.raw_args.clone()),
        };

        let args = display_args(&arguments);
        let canonical = format!("{:#}", arguments);
        debug!("Invoking tool '{}' with {}", call.name, args);

        let outcome = match self.timeout {
            Some(limit) => match timeout(limit, invoke_guarded(&**tool, &canonical)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("Tool '{}' timed out after {:?}", call.name, limit);
                    return Invocation::TimedOut {
                        tool: call.name.clone(),
                        args,
                        after: limit,
                    };
                }
            },
            None => invoke_guarded(&**tool, &canonical).await,
        };

        match outcome {
            Ok(output) => Invocation::Succeeded {
                tool: call.name.clone(),
                args,
                output,
            },
            Err(err) => {
                debug!("Tool '{}' failed: {}", call.name, err);
                Invocation::Failed {
                    tool: call.name.clone(),
                    args,
                    error: err.to_string(),
                }
            }
        }
    }
}
