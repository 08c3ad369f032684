//! Entries of a tool list file

use crate::tools::types::ToolSettings;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Connection parameters for one session server
///
/// `url` is used by `sse` sessions, `command`/`args`/`env` by `stdio` ones.
/// Anything else is kept for the connector to interpret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
    #[serde(flatten)]
    pub extra: ToolSettings,
}

/// Session servers keyed by name
pub type ServerMap = BTreeMap<String, SessionServerConfig>;

/// One entry of a tool list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolEntry {
    /// Static tool with no configuration: `"calculator"`
    Named(String),
    /// Session servers: `{"mcpServers": {...}}`
    Sessions {
        #[serde(rename = "mcpServers")]
        servers: ServerMap,
    },
    /// Parametrized static tool: `{"name": "search", "url": ...}`
    Configured {
        name: String,
        #[serde(flatten)]
        settings: ToolSettings,
    },
}

impl ToolEntry {
    /// Static tool name, if this entry names one
    pub fn static_name(&self) -> Option<&str> {
        match self {
            ToolEntry::Named(name) | ToolEntry::Configured { name, .. } => Some(name),
            ToolEntry::Sessions { .. } => None,
        }
    }
}
