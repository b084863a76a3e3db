// ABOUTME: McpInvoker binds registry tools to an MCP client, forwarding calls
// ABOUTME: and converting MCP content blocks into ToolResult fragments.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{McpClient, McpContentBlock, McpToolResult};
use crate::tool::{Arguments, ToolInvoker, ToolResult, ToolStatus, TextFragment};

/// Invokes tools on the MCP host behind a shared client.
pub struct McpInvoker {
    client: Arc<McpClient>,
}

impl McpInvoker {
    pub fn new(client: Arc<McpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolInvoker for McpInvoker {
    async fn invoke(&self, name: &str, arguments: Arguments) -> Result<ToolResult, anyhow::Error> {
        let result = self.client.call_tool(name, Value::Object(arguments)).await?;
        Ok(to_tool_result(name, result))
    }
}

/// Convert an MCP call result. Fragment order is preserved; blocks with no
/// textual rendering are dropped.
pub fn to_tool_result(name: &str, result: McpToolResult) -> ToolResult {
    let content = result
        .content
        .into_iter()
        .filter_map(|block| match block {
            McpContentBlock::Text { text } => Some(text),
            McpContentBlock::Image { mime_type, .. } => Some(format!("[Image: {mime_type}]")),
            McpContentBlock::Resource { resource } => {
                Some(resource.text.unwrap_or_else(|| format!("[Resource: {}]", resource.uri)))
            }
            McpContentBlock::Unsupported => None,
        })
        .map(TextFragment::new)
        .collect();

    ToolResult {
        tool: name.to_string(),
        status: if result.is_error {
            ToolStatus::Error
        } else {
            ToolStatus::Success
        },
        content,
    }
}
