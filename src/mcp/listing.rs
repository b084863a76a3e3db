// ABOUTME: Decodes a tools/list result whose wrapper differs between hosts.
// ABOUTME: Tries known shapes in order and reports failure instead of panicking.

use serde_json::Value;

use super::McpToolInfo;
use crate::error::McpError;

/// How deep to look for a nested tool array.
const MAX_DEPTH: usize = 3;

/// Extract the flat tool list from a `tools/list` result.
///
/// Shapes tried, in order:
/// - `{"tools": [...]}`, with any sibling metadata (`_meta`, `nextCursor`);
/// - a bare array of tool descriptors;
/// - the first array of descriptors nested under another field or inside
///   `[key, value]` pairs, searched breadth-first a few levels down.
///
/// Outside a `tools` field, an array counts as descriptors when it is
/// non-empty and every element carries a string `name` and either an
/// `inputSchema` object or a string `description`.
pub fn decode_tool_listing(result: &Value) -> Result<Vec<McpToolInfo>, McpError> {
    let tools = find_tool_array(result).ok_or_else(|| {
        McpError::Protocol("no tool array found in tools/list result".into())
    })?;

    serde_json::from_value(Value::Array(tools.clone()))
        .map_err(|e| McpError::Protocol(format!("invalid tool descriptor: {e}")))
}

fn find_tool_array(root: &Value) -> Option<&Vec<Value>> {
    if let Some(tools) = root.get("tools").and_then(Value::as_array) {
        return Some(tools);
    }

    let mut level = vec![root];
    for _ in 0..=MAX_DEPTH {
        let mut next = Vec::new();
        for value in level {
            if let Some(items) = value.as_array() {
                if looks_like_descriptors(items) {
                    return Some(items);
                }
            }
            match value {
                Value::Object(map) => {
                    if let Some(tools) = map.get("tools").and_then(Value::as_array) {
                        return Some(tools);
                    }
                    next.extend(map.values());
                }
                Value::Array(items) => next.extend(items.iter()),
                _ => {}
            }
        }
        if next.is_empty() {
            break;
        }
        level = next;
    }

    None
}

fn looks_like_descriptors(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(is_descriptor)
}

/// A string `name` plus an `inputSchema` object or a string `description`.
fn is_descriptor(item: &Value) -> bool {
    item.get("name").is_some_and(Value::is_string)
        && (item.get("inputSchema").is_some_and(Value::is_object)
            || item.get("description").is_some_and(Value::is_string))
}
