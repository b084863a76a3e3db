// ABOUTME: MCP module - Model Context Protocol client implementation.
// ABOUTME: Connects to a tool host over stdio and exposes its tools.

mod client;
mod invoker;
mod listing;
mod transport;
mod types;

pub use client::McpClient;
pub use invoker::{McpInvoker, to_tool_result};
pub use listing::decode_tool_listing;
pub use transport::{StdioTransport, Transport};
pub use types::*;

#[cfg(test)]
mod client_test;
