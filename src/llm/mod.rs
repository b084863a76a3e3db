// ABOUTME: LLM module - chat backend abstraction and the Ollama provider.
// ABOUTME: Defines message, tool schema, and tool call types.

mod client;
mod ollama;
mod types;

pub use client::*;
pub use ollama::*;
pub use types::*;
