//! Retrieval tool backed by a RAG server's `/retrieve` endpoint

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::time::Duration;
use toolweave_core::tools::{Tool, ToolError, ToolParameter, ToolSchema, ToolSettings, parse_args};
use tracing::debug;

pub const TOOL_NAME: &str = "search";

fn default_topk() -> usize {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

/// Settings from a `{"name": "search", ...}` tool list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the retrieval server
    pub url: String,
    #[serde(default = "default_topk")]
    pub topk: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct SearchInput {
    query: String,
}

#[derive(Debug, Serialize)]
struct RetrieveRequest<'a> {
    queries: [&'a str; 1],
    topk: usize,
    return_scores: bool,
}

#[derive(Debug, Deserialize)]
struct RetrieveResponse {
    #[serde(default)]
    result: Vec<Vec<RetrievedItem>>,
}

#[derive(Debug, Deserialize)]
struct RetrievedItem {
    document: Document,
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Document {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    contents: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Queries a retrieval server and renders the top documents
#[derive(Debug, Clone)]
pub struct SearchTool {
    config: SearchConfig,
    client: reqwest::Client,
}

impl SearchTool {
    pub fn new(config: SearchConfig) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("Toolweave-Search/1.0")
            .build()
            .map_err(|e| ToolError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    /// Build from tool list settings; `url` is required
    pub fn from_settings(settings: Option<&ToolSettings>) -> Result<Self, ToolError> {
        let settings = settings.ok_or_else(|| {
            ToolError::InvalidArguments("search requires settings with a 'url'".to_string())
        })?;
        let object: serde_json::Map<String, serde_json::Value> = settings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let config: SearchConfig = serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| ToolError::InvalidArguments(format!("search settings: {}", e)))?;
        Self::new(config)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/retrieve", self.config.url.trim_end_matches('/'))
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedItem>, ToolError> {
        let endpoint = self.endpoint();
        debug!("Retrieving top {} for '{}' from {}", self.config.topk, query, endpoint);

        let request = RetrieveRequest {
            queries: [query],
            topk: self.config.topk,
            return_scores: true,
        };
        let response = self
            .client
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ToolError::Http(format!("Failed to reach {}: {}", endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Http(format!(
                "Retrieval request failed with status: {}",
                status
            )));
        }

        let body: RetrieveResponse = response
            .json()
            .await
            .map_err(|e| ToolError::Http(format!("Invalid retrieval response: {}", e)))?;
        Ok(body.result.into_iter().next().unwrap_or_default())
    }
}

fn render(items: &[RetrievedItem]) -> String {
    if items.is_empty() {
        return "No documents found.".to_string();
    }

    let mut out = String::new();
    for (index, item) in items.iter().enumerate() {
        let doc = &item.document;
        let title = doc.title.as_deref().unwrap_or("untitled");
        let body = doc
            .contents
            .as_deref()
            .or(doc.text.as_deref())
            .unwrap_or_default();
        let _ = write!(out, "Doc {} (Title: {})", index + 1, title);
        if let Some(score) = item.score {
            let _ = write!(out, " [score: {:.4}]", score);
        }
        let _ = writeln!(out, "\n{}", body.trim());
    }
    out.trim_end().to_string()
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Search the knowledge base and return the most relevant documents."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            self.name(),
            self.description(),
            vec![ToolParameter::string("query", "The search query")],
        )
    }

    async fn invoke(&self, args: &str) -> Result<String, ToolError> {
        let input: SearchInput = parse_args(args)?;
        let items = self.retrieve(&input.query).await?;
        Ok(render(&items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(value: serde_json::Value) -> ToolSettings {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_settings_defaults() {
        let tool =
            SearchTool::from_settings(Some(&settings(serde_json::json!({"url": "http://rag:8000/"}))))
                .unwrap();
        assert_eq!(tool.config().topk, 3);
        assert_eq!(tool.endpoint(), "http://rag:8000/retrieve");
    }

    #[test]
    fn test_settings_without_url_are_rejected() {
        let err = SearchTool::from_settings(Some(&settings(serde_json::json!({"topk": 5}))))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_render_documents() {
        let response: RetrieveResponse = serde_json::from_value(serde_json::json!({
            "result": [[
                {"document": {"title": "Rust", "contents": "A language."}, "score": 0.91234},
                {"document": {"text": "Untitled body"}}
            ]]
        }))
        .unwrap();

        let text = render(&response.result[0]);
        assert_eq!(
            text,
            "Doc 1 (Title: Rust) [score: 0.9123]\nA language.\nDoc 2 (Title: untitled)\nUntitled body"
        );
        assert_eq!(render(&[]), "No documents found.");
    }

    #[test]
    fn test_request_shape() {
        let request = RetrieveRequest {
            queries: ["weather"],
            topk: 2,
            return_scores: true,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"queries": ["weather"], "topk": 2, "return_scores": true})
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let tool = SearchTool::new(SearchConfig {
            url: "http://127.0.0.1:1".to_string(),
            topk: 1,
            timeout_secs: 2,
        })
        .unwrap();

        let err = tool.invoke(r#"{"query": "x"}"#).await.unwrap_err();
        assert!(matches!(err, ToolError::Http(_)));
    }
}
