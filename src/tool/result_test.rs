// ABOUTME: Tests for ToolResult - constructors, text joining, wire shape.
// ABOUTME: Verifies the error shape produced for contained failures.

use super::*;

#[test]
fn test_text_result() {
    let result = ToolResult::text("git_status", "clean");
    assert_eq!(result.tool, "git_status");
    assert_eq!(result.status, ToolStatus::Success);
    assert_eq!(result.content, vec![TextFragment::new("clean")]);
    assert!(!result.is_error());
}

#[test]
fn test_error_result() {
    let result = ToolResult::error("git_status", "Something went wrong");
    assert!(result.is_error());
    assert_eq!(result.joined_text(), "Something went wrong");
}

#[test]
fn test_joined_text_has_no_separator() {
    let result = ToolResult::success("git_log", ["commit a", "\n", "commit b"]);
    assert_eq!(result.joined_text(), "commit a\ncommit b");

    let result = ToolResult::success("split", ["8", "0"]);
    assert_eq!(result.joined_text(), "80");
}

#[test]
fn test_joined_text_empty() {
    let result = ToolResult::success("noop", Vec::<String>::new());
    assert_eq!(result.joined_text(), "");
}

#[test]
fn test_execution_failure_shape() {
    let err = anyhow::anyhow!("Test error");
    let result = ToolResult::execution_failure("failing_tool", &err);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "tool": "failing_tool",
            "status": "error",
            "content": [{"text": "Error executing tool: Test error"}]
        })
    );
}
