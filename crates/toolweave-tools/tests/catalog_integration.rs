//! Built-in tools driven through the tool manager

use toolweave_core::{ExecutionContext, ManagerConfig, Role, ToolEntry, ToolManager};
use toolweave_tools::default_catalog;

fn manager(entries: Vec<ToolEntry>) -> ToolManager {
    tokio_test::block_on(
        ToolManager::builder(ManagerConfig::default().with_limiter(4))
            .with_catalog(default_catalog())
            .with_entries(entries)
            .build(),
    )
    .unwrap()
}

#[test]
fn test_calculator_through_manager() {
    let manager = manager(vec![ToolEntry::Named("calculator".into())]);
    assert_eq!(manager.all_tools(), vec!["calculator"]);

    let responses = [concat!(
        "Let me compute both.",
        r#"<tool_call>{"name": "calculator", "arguments": {"expression": "(3 + 4) * 2"}}</tool_call>"#,
        r#"<tool_call>{"name": "calculator", "arguments": {"expression": "1 / 0"}}</tool_call>"#,
    )];
    let (_, outputs) = manager
        .execute_actions(&responses, &ExecutionContext::Standalone)
        .unwrap();

    let messages = outputs[0].messages();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.role == Role::Tool));
    assert!(messages[0].content.starts_with("# Execute the tool calculator succeeded"));
    assert!(messages[0].content.ends_with("14"));
    assert!(messages[1].content.starts_with("# Execute the tool calculator failed"));
    assert!(messages[1].content.contains("division by zero"));
}

#[test]
fn test_search_entry_takes_settings() {
    let entries: Vec<ToolEntry> = serde_json::from_str(
        r#"["calculator", {"name": "search", "url": "http://127.0.0.1:8000", "topk": 5}]"#,
    )
    .unwrap();
    let manager = manager(entries);

    assert_eq!(manager.all_tools(), vec!["calculator", "search"]);
    let schemas = manager.functions();
    assert_eq!(schemas[1].parameters["required"], serde_json::json!(["query"]));
}

#[test]
fn test_unknown_builtin_is_fatal() {
    let result = tokio_test::block_on(
        ToolManager::builder(ManagerConfig::default())
            .with_catalog(default_catalog())
            .with_entries(vec![ToolEntry::Named("python".into())])
            .build(),
    );
    let err = result.unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("calculator"));
}
