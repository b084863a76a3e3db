// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use toolbridge::prelude::*;` to get started quickly.

pub use crate::agent::{AgentState, ConversationAgent, DEFAULT_SYSTEM_PROMPT};
pub use crate::config::BridgeConfig;
pub use crate::error::{AgentError, BridgeError, ConfigError, LlmError, McpError, ToolError};
pub use crate::llm::{
    ChatBackend, ChatMessage, ChatRequest, ChatResponse, OllamaClient, Role, ToolCall, ToolSchema,
};
pub use crate::mcp::{
    McpClient, McpContentBlock, McpServerConfig, McpToolInfo, McpToolResult, StdioTransport,
    Transport,
};
pub use crate::tool::{Arguments, Registry, Tool, ToolInvoker, ToolResult, ToolStatus};
