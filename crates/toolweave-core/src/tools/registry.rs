//! Read-only registry of invocable tools

use crate::error::{CoreError, CoreResult};
use crate::tools::base::Tool;
use crate::tools::types::ToolSchema;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Registry mapping tool names to capabilities
///
/// Built once through [`ToolRegistryBuilder`] and shared behind `Arc`; there
/// is no way to mutate it after construction.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a registry
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Check if a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get all tool names, sorted
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get schemas for every registered tool, sorted by name
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tool_names()
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.schema())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Restrict the registry to the named tools
    ///
    /// Every requested name must exist; a miss means the deployment asked for
    /// a tool it never configured.
    pub fn select(&self, names: &[String]) -> CoreResult<ToolRegistry> {
        let missing: Vec<&String> = names.iter().filter(|n| !self.has_tool(n)).collect();
        if !missing.is_empty() {
            return Err(CoreError::config(format!(
                "Selected tool names are not available: {:?}. Available tool names: {:?}",
                missing,
                self.tool_names()
            )));
        }

        let tools = names
            .iter()
            .filter_map(|name| self.tools.get(name).map(|t| (name.clone(), Arc::clone(t))))
            .collect();
        Ok(ToolRegistry { tools })
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

/// Builder for tool registry
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool; a later tool with the same name replaces the earlier one
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Add multiple tools
    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        for tool in tools {
            self.register(tool);
        }
        self
    }

    /// Add a tool in place
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            debug!("Tool '{}' registered twice, keeping the latest", name);
        }
    }

    /// Build the registry
    pub fn build(self) -> ToolRegistry {
        ToolRegistry { tools: self.tools }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::base::ToolError;
    use async_trait::async_trait;

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.0
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new(self.0, "test tool", vec![])
        }

        async fn invoke(&self, _args: &str) -> Result<String, ToolError> {
            Ok(self.0.to_string())
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::builder()
            .with_tool(Arc::new(NamedTool("search")))
            .with_tools(vec![
                Arc::new(NamedTool("calculator")) as Arc<dyn Tool>,
                Arc::new(NamedTool("fetch")),
            ])
            .build()
    }

    #[test]
    fn test_lookup() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert!(registry.has_tool("search"));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.tool_names(), vec!["calculator", "fetch", "search"]);
    }

    #[test]
    fn test_select_subset() {
        let selected = registry()
            .select(&["search".to_string(), "fetch".to_string()])
            .unwrap();
        assert_eq!(selected.tool_names(), vec!["fetch", "search"]);
    }

    #[test]
    fn test_select_unknown_is_config_error() {
        let err = registry().select(&["nope".to_string()]).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("nope"));
        assert!(err.to_string().contains("calculator"));
    }

    #[test]
    fn test_schemas_sorted() {
        let names: Vec<String> = registry().schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["calculator", "fetch", "search"]);
    }
}
