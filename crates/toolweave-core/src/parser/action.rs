use crate::tools::types::ToolCall;
use serde::{Deserialize, Serialize};

/// Classified outcome of parsing one raw model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Action {
    /// Final answer, or a plain reply with no tool syntax
    Answer(String),
    /// Extraction failed as a whole
    Error(String),
    /// Ordered tool calls, never empty
    Actions(Vec<ToolCall>),
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Answer(_) => "answer",
            Action::Error(_) => "error",
            Action::Actions(_) => "actions",
        }
    }

    pub fn is_answer(&self) -> bool {
        matches!(self, Action::Answer(_))
    }

    /// Tool calls carried by this action; empty for answers and errors
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Action::Actions(calls) => calls,
            _ => &[],
        }
    }
}

/// Parser output that also keeps the prose written before the first tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
    pub action: Action,
}

impl ParsedResponse {
    pub(crate) fn without_thought(action: Action) -> Self {
        Self {
            thought: None,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_calls() {
        let action = Action::Actions(vec![ToolCall::new("search", "{}")]);
        assert_eq!(action.kind(), "actions");
        assert_eq!(action.tool_calls().len(), 1);

        let answer = Action::Answer("hi".into());
        assert!(answer.is_answer());
        assert!(answer.tool_calls().is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Action::Error("bad".into())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "error", "value": "bad"}));
    }
}
