//! Response parsing: turns one raw model output into an [`Action`]
//!
//! The parser never fails. Malformed or truncated tool syntax degrades into
//! sentinel calls so the model sees its own mistake on the next turn.

mod action;

pub use action::{Action, ParsedResponse};

use crate::tools::types::ToolCall;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

pub const TOOL_CALL_START: &str = "<tool_call>";
pub const TOOL_CALL_END: &str = "</tool_call>";

static ANSWER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<answer>.*?</answer>").expect("answer pattern is valid")
});

/// Why a single tool-call block was rejected
#[derive(Debug, thiserror::Error)]
enum ExtractError {
    #[error("empty tool call content")]
    Empty,

    #[error("invalid tool call syntax: {0}")]
    Syntax(#[from] json5::Error),

    #[error("tool call is not an object")]
    NotAnObject,

    #[error("tool call is missing the '{0}' field")]
    MissingField(&'static str),

    #[error("arguments could not be re-serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Stateless parser for raw model outputs
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser;

impl ResponseParser {
    pub fn new() -> Self {
        Self
    }

    /// Classify one raw model output
    pub fn parse(&self, text: &str) -> Action {
        self.parse_response(text).action
    }

    /// Classify one raw model output, keeping the prose before the first tool call
    pub fn parse_response(&self, text: &str) -> ParsedResponse {
        if let Some(answer) = last_answer_block(text) {
            return ParsedResponse::without_thought(Action::Answer(answer.to_string()));
        }

        if !text.contains(TOOL_CALL_START) {
            let action = if text.contains(TOOL_CALL_END) {
                debug!("Closing tool-call tag without an opening tag");
                Action::Actions(vec![ToolCall::stray_close()])
            } else {
                Action::Answer(text.to_string())
            };
            return ParsedResponse::without_thought(action);
        }

        let mut segments = text.split(TOOL_CALL_START);
        let thought = segments
            .next()
            .map(str::trim)
            .filter(|pre| !pre.is_empty())
            .map(str::to_string);

        let mut calls: Vec<ToolCall> = segments
            .filter(|segment| !segment.trim().is_empty())
            .map(extract_call)
            .collect();

        // An opening tag as the very last token leaves nothing to extract
        if calls.is_empty() {
            calls.push(ToolCall::empty());
        }

        ParsedResponse {
            thought,
            action: Action::Actions(calls),
        }
    }
}

fn last_answer_block(text: &str) -> Option<&str> {
    ANSWER_BLOCK.find_iter(text).last().map(|m| m.as_str())
}

fn extract_call(segment: &str) -> ToolCall {
    let Some((payload, _)) = segment.split_once(TOOL_CALL_END) else {
        debug!("Tool-call block is not closed, treating it as truncated output");
        return ToolCall::empty();
    };

    decode_payload(payload.trim()).unwrap_or_else(|err| {
        debug!("Rejected tool-call block: {}", err);
        ToolCall::empty()
    })
}

/// JSON5 first; strict JSON as a second try because json5 rejects integers
/// above `i64::MAX` that plain JSON keeps as `u64`
fn decode_value(payload: &str) -> Result<Value, ExtractError> {
    match json5::from_str::<Value>(payload) {
        Ok(value) => Ok(value),
        Err(err) => serde_json::from_str::<Value>(payload).map_err(|_| ExtractError::Syntax(err)),
    }
}

fn decode_payload(payload: &str) -> Result<ToolCall, ExtractError> {
    if payload.is_empty() {
        return Err(ExtractError::Empty);
    }

    let Value::Object(mut object) = decode_value(payload)? else {
        return Err(ExtractError::NotAnObject);
    };

    let name = object.remove("name").ok_or(ExtractError::MissingField("name"))?;
    let arguments = object
        .remove("arguments")
        .ok_or(ExtractError::MissingField("arguments"))?;

    let name = match name {
        Value::String(name) => name,
        other => other.to_string(),
    };

    Ok(ToolCall::new(name, serde_json::to_string_pretty(&arguments)?))
}
