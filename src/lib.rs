// ABOUTME: Root module for toolbridge - connects chat model function calling
// ABOUTME: to tools discovered on an MCP host. Re-exports the public surface.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod mcp;
pub mod prelude;
pub mod tool;

pub use error::BridgeError;
