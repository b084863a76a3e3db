// ABOUTME: Defines all error types for toolbridge using thiserror.
// ABOUTME: Each component has its own error enum, unified under BridgeError.

use std::path::PathBuf;

/// Top-level error type for toolbridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("MCP error: {0}")]
    Mcp(#[from] McpError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),
}

/// Errors from chat backend operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Errors from tool dispatch.
///
/// Only a lookup miss is reported this way. Failures raised while a tool runs
/// are folded into an error-status `ToolResult` instead.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    NotFound(String),
}

/// Errors from MCP operations.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Not connected to MCP server")]
    NotConnected,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("RPC error ({code}): {message}")]
    Rpc { code: i32, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("MCP server '{0}' is not configured")]
    UnknownServer(String),

    #[error("could not determine working directory: {0}")]
    WorkingDir(#[source] std::io::Error),
}

/// Errors that end a single conversation turn.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Backend error: {0}")]
    Backend(#[from] LlmError),

    #[error("Malformed backend reply: {0}")]
    MalformedReply(String),

    #[error("Backend reply carried neither a tool call nor text")]
    EmptyReply,

    #[error(transparent)]
    Tool(#[from] ToolError),
}
