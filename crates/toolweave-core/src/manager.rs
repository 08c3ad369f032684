//! Tool manager: builds the registry from a tool list and runs model turns
//!
//! Static tools come from a [`StaticToolCatalog`]; `mcpServers` entries are
//! handed to the [`SessionConnector`] registered for the configured mode.
//! Every problem found while building is fatal. Once built, nothing caused
//! by model output is an error.

use crate::bridge::{ExecutionContext, SyncBridge};
use crate::config::{ManagerConfig, ServerMap, SessionMode, ToolEntry, load_tool_entries};
use crate::error::{CoreError, CoreResult};
use crate::orchestrator::{OrchestratorStats, ToolExecutionOrchestrator, TurnOutput};
use crate::parser::{Action, ResponseParser};
use crate::tools::base::{Tool, ToolError};
use crate::tools::registry::ToolRegistry;
use crate::tools::types::{ToolSchema, ToolSettings};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Constructor for a static tool, given its optional settings
pub type ToolFactory =
    Box<dyn Fn(Option<&ToolSettings>) -> Result<Arc<dyn Tool>, ToolError> + Send + Sync>;

/// Name to constructor map for built-in tools
#[derive(Default)]
pub struct StaticToolCatalog {
    factories: HashMap<String, ToolFactory>,
}

impl StaticToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(Option<&ToolSettings>) -> Result<Arc<dyn Tool>, ToolError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Construct a tool by name
    pub fn create(&self, name: &str, settings: Option<&ToolSettings>) -> CoreResult<Arc<dyn Tool>> {
        let factory = self.factories.get(name).ok_or_else(|| {
            CoreError::config(format!(
                "Unknown static tool '{}'. Available static tools: {:?}",
                name,
                self.names()
            ))
        })?;
        factory(settings).map_err(|e| {
            CoreError::config(format!("Failed to construct tool '{}': {}", name, e))
        })
    }
}

impl std::fmt::Debug for StaticToolCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToolCatalog")
            .field("tools", &self.names())
            .finish()
    }
}

/// Options passed to a session connector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub mode: SessionMode,
    /// Connections to open per server
    pub instances: usize,
}

/// Turns `mcpServers` entries into tools
///
/// Implementations own the transport; the manager only sees the tools they
/// return.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn connect(
        &self,
        servers: &ServerMap,
        options: &SessionOptions,
    ) -> Result<Vec<Arc<dyn Tool>>, ToolError>;
}

/// Builder for [`ToolManager`]
pub struct ToolManagerBuilder {
    config: ManagerConfig,
    catalog: StaticToolCatalog,
    connectors: HashMap<SessionMode, Arc<dyn SessionConnector>>,
    entries: Option<Vec<ToolEntry>>,
    extra_tools: Vec<Arc<dyn Tool>>,
}

impl ToolManagerBuilder {
    fn new(config: ManagerConfig) -> Self {
        Self {
            config,
            catalog: StaticToolCatalog::new(),
            connectors: HashMap::new(),
            entries: None,
            extra_tools: Vec::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: StaticToolCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_connector(
        mut self,
        mode: SessionMode,
        connector: impl SessionConnector + 'static,
    ) -> Self {
        self.connectors.insert(mode, Arc::new(connector));
        self
    }

    /// Use these entries instead of reading `config_path`
    pub fn with_entries(mut self, entries: Vec<ToolEntry>) -> Self {
        self.entries = Some(entries);
        self
    }

    /// Register an already constructed tool
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.extra_tools.push(tool);
        self
    }

    pub async fn build(self) -> CoreResult<ToolManager> {
        let Self {
            config,
            catalog,
            connectors,
            entries,
            extra_tools,
        } = self;

        config.validate()?;

        let entries = match (entries, &config.config_path) {
            (Some(entries), _) => entries,
            (None, Some(path)) => load_tool_entries(path)?,
            (None, None) => Vec::new(),
        };

        let options = SessionOptions {
            mode: config.session_mode,
            instances: config.parallel_sse_tool_call.instances(),
        };

        let mut builder = ToolRegistry::builder();
        for entry in &entries {
            match entry {
                ToolEntry::Named(name) => builder.register(catalog.create(name, None)?),
                ToolEntry::Configured { name, settings } => {
                    builder.register(catalog.create(name, Some(settings))?)
                }
                ToolEntry::Sessions { servers } => {
                    let connector = connectors.get(&options.mode).ok_or_else(|| {
                        warn!("No session connector for mode '{}'", options.mode);
                        CoreError::config(format!(
                            "No session connector registered for mode '{}'",
                            options.mode
                        ))
                    })?;
                    let tools = connector.connect(servers, &options).await.map_err(|e| {
                        CoreError::runtime(format!("Failed to connect session servers: {}", e))
                    })?;
                    debug!(
                        "Connected {} session servers providing {} tools",
                        servers.len(),
                        tools.len()
                    );
                    for tool in tools {
                        builder.register(tool);
                    }
                }
            }
        }
        for tool in extra_tools {
            builder.register(tool);
        }

        let mut registry = builder.build();
        // An empty selection means no filter.
        if let Some(selected) = &config.tool_name_selected {
            if selected.is_empty() {
                debug!("Empty tool_name_selected, keeping all {} tools", registry.len());
            } else {
                registry = registry.select(selected)?;
            }
        }

        let limiter = config.build_limiter()?;
        info!(
            "Tool manager ready: {} tools, limiter {}",
            registry.len(),
            if limiter.is_enabled() { "enabled" } else { "disabled" }
        );

        let orchestrator = ToolExecutionOrchestrator::new(Arc::new(registry), limiter)
            .with_timeout(config.tool_timeout());

        Ok(ToolManager {
            config,
            parser: ResponseParser::new(),
            orchestrator,
        })
    }
}

/// Parses model responses and executes the tool calls they contain
#[derive(Debug, Clone)]
pub struct ToolManager {
    config: ManagerConfig,
    parser: ResponseParser,
    orchestrator: ToolExecutionOrchestrator,
}

impl ToolManager {
    pub fn builder(config: ManagerConfig) -> ToolManagerBuilder {
        ToolManagerBuilder::new(config)
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.orchestrator.registry().get(name).cloned()
    }

    pub fn all_tools(&self) -> Vec<String> {
        self.orchestrator.registry().tool_names()
    }

    /// Schemas of every registered tool
    pub fn functions(&self) -> Vec<ToolSchema> {
        self.orchestrator.registry().schemas()
    }

    pub fn stats(&self) -> OrchestratorStats {
        self.orchestrator.stats()
    }

    pub fn parse_response(&self, response: &str) -> Action {
        self.parser.parse(response)
    }

    pub fn parse_responses<S: AsRef<str>>(&self, responses: &[S]) -> Vec<Action> {
        responses
            .iter()
            .map(|response| self.parser.parse(response.as_ref()))
            .collect()
    }

    /// Parse and execute a batch from async code
    pub async fn execute_actions_async<S: AsRef<str>>(
        &self,
        responses: &[S],
    ) -> (Vec<Action>, Vec<TurnOutput>) {
        let actions = self.parse_responses(responses);
        let outputs = self.orchestrator.execute_batch(&actions).await;
        (actions, outputs)
    }

    /// Parse and execute a batch from synchronous code
    ///
    /// Fails only when no runtime can be obtained.
    pub fn execute_actions<S: AsRef<str>>(
        &self,
        responses: &[S],
        context: &ExecutionContext,
    ) -> CoreResult<(Vec<Action>, Vec<TurnOutput>)> {
        let actions = self.parse_responses(responses);
        let orchestrator = self.orchestrator.clone();
        SyncBridge::run(context, async move {
            let outputs = orchestrator.execute_batch(&actions).await;
            (actions, outputs)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionServerConfig;
    use crate::tools::types::Role;

    struct EchoTool {
        name: String,
        prefix: String,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            &self.name
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new(&self.name, "Echoes its arguments", vec![])
        }

        async fn invoke(&self, args: &str) -> Result<String, ToolError> {
            let value: serde_json::Value = serde_json::from_str(args)?;
            Ok(format!("{}{}", self.prefix, value["text"].as_str().unwrap_or_default()))
        }
    }

    fn echo(name: &str) -> Arc<dyn Tool> {
        Arc::new(EchoTool {
            name: name.to_string(),
            prefix: String::new(),
        })
    }

    fn catalog() -> StaticToolCatalog {
        StaticToolCatalog::new().register("echo", |settings| {
            let prefix = settings
                .and_then(|s| s.get("prefix"))
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Ok(Arc::new(EchoTool {
                name: "echo".to_string(),
                prefix,
            }) as Arc<dyn Tool>)
        })
    }

    fn servers() -> ServerMap {
        let mut servers = ServerMap::new();
        servers.insert(
            "remote".to_string(),
            SessionServerConfig {
                url: Some("http://127.0.0.1:9000/sse".to_string()),
                ..Default::default()
            },
        );
        servers
    }

    #[tokio::test]
    async fn test_build_from_entries_and_execute() {
        let manager = ToolManager::builder(ManagerConfig::default())
            .with_catalog(catalog())
            .with_entries(vec![ToolEntry::Named("echo".into())])
            .build()
            .await
            .unwrap();

        assert_eq!(manager.all_tools(), vec!["echo"]);
        assert_eq!(manager.functions()[0].name, "echo");

        let responses = [
            r#"<tool_call>{"name": "echo", "arguments": {"text": "hi"}}</tool_call>"#,
            "<answer>done</answer>",
        ];
        let (actions, outputs) = manager.execute_actions_async(&responses).await;

        assert_eq!(actions.len(), 2);
        assert!(actions[1].is_answer());
        let first = &outputs[0].messages()[0];
        assert_eq!(first.role, Role::Tool);
        assert!(first.content.ends_with("hi"));
        assert_eq!(outputs[1].messages()[0].content, "<answer>done</answer>");
    }

    #[tokio::test]
    async fn test_configured_entry_passes_settings() {
        let mut settings = ToolSettings::new();
        settings.insert("prefix".into(), serde_json::json!(">> "));

        let manager = ToolManager::builder(ManagerConfig::default())
            .with_catalog(catalog())
            .with_entries(vec![ToolEntry::Configured {
                name: "echo".into(),
                settings,
            }])
            .build()
            .await
            .unwrap();

        let (_, outputs) = manager
            .execute_actions_async(&[r#"<tool_call>{"name": "echo", "arguments": {"text": "x"}}</tool_call>"#])
            .await;
        assert!(outputs[0].messages()[0].content.ends_with(">> x"));
    }

    #[tokio::test]
    async fn test_unknown_static_tool_is_fatal() {
        let err = ToolManager::builder(ManagerConfig::default())
            .with_catalog(catalog())
            .with_entries(vec![ToolEntry::Named("nope".into())])
            .build()
            .await
            .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("nope"));
    }

    #[tokio::test]
    async fn test_sessions_use_connector_for_configured_mode() {
        let mut connector = MockSessionConnector::new();
        connector
            .expect_connect()
            .withf(|servers, options| {
                servers.contains_key("remote")
                    && options.mode == SessionMode::Sse
                    && options.instances == 1
            })
            .times(1)
            .returning(|_, _| Ok(vec![echo("remote_echo")]));

        let manager = ToolManager::builder(ManagerConfig::default())
            .with_connector(SessionMode::Sse, connector)
            .with_entries(vec![ToolEntry::Sessions { servers: servers() }])
            .build()
            .await
            .unwrap();

        assert!(manager.get_tool("remote_echo").is_some());
    }

    #[tokio::test]
    async fn test_sessions_without_connector_are_fatal() {
        let config = ManagerConfig {
            session_mode: SessionMode::Stdio,
            ..Default::default()
        };
        let err = ToolManager::builder(config)
            .with_connector(SessionMode::Sse, MockSessionConnector::new())
            .with_entries(vec![ToolEntry::Sessions { servers: servers() }])
            .build()
            .await
            .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("stdio"));
    }

    #[tokio::test]
    async fn test_connector_failure_aborts_build() {
        let mut connector = MockSessionConnector::new();
        connector
            .expect_connect()
            .returning(|_, _| Err(ToolError::Connection("refused".into())));

        let err = ToolManager::builder(ManagerConfig::default())
            .with_connector(SessionMode::Sse, connector)
            .with_entries(vec![ToolEntry::Sessions { servers: servers() }])
            .build()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("refused"));
    }

    #[tokio::test]
    async fn test_tool_name_selected_filters_and_validates() {
        let config = ManagerConfig {
            tool_name_selected: Some(vec!["b".into()]),
            ..Default::default()
        };
        let manager = ToolManager::builder(config)
            .with_tool(echo("a"))
            .with_tool(echo("b"))
            .build()
            .await
            .unwrap();
        assert_eq!(manager.all_tools(), vec!["b"]);

        let config = ManagerConfig {
            tool_name_selected: Some(vec!["c".into()]),
            ..Default::default()
        };
        let err = ToolManager::builder(config)
            .with_tool(echo("a"))
            .build()
            .await
            .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("Available tool names"));
    }

    #[tokio::test]
    async fn test_empty_selection_keeps_every_tool() {
        let config = ManagerConfig {
            tool_name_selected: Some(Vec::new()),
            ..Default::default()
        };
        let manager = ToolManager::builder(config)
            .with_tool(echo("a"))
            .with_tool(echo("b"))
            .build()
            .await
            .unwrap();

        let mut names = manager.all_tools();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_execute_actions_from_sync_code() {
        let manager = tokio_test::block_on(
            ToolManager::builder(ManagerConfig::default().with_limiter(2))
                .with_tool(echo("echo"))
                .build(),
        )
        .unwrap();

        let responses = vec![
            r#"<tool_call>{"name": "echo", "arguments": {"text": "one"}}</tool_call>"#.to_string(),
            "no tags here".to_string(),
        ];
        let (actions, outputs) = manager
            .execute_actions(&responses, &ExecutionContext::detect())
            .unwrap();

        assert_eq!(actions.len(), 2);
        assert!(outputs[0].messages()[0].content.ends_with("one"));
        assert_eq!(manager.stats().succeeded, 1);
    }
}
