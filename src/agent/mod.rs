// ABOUTME: Agent module - the conversation state machine that connects the
// ABOUTME: chat backend's tool calls to the tool registry.

mod conversation;

pub use conversation::{AgentState, ConversationAgent, DEFAULT_SYSTEM_PROMPT};
