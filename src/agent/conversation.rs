// ABOUTME: ConversationAgent - owns the chat history, asks the backend for a
// ABOUTME: reply each turn, and resolves at most one tool call per reply.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::error::AgentError;
use crate::llm::{ChatBackend, ChatMessage, ChatRequest, ChatResponse};
use crate::tool::Registry;

/// System prompt used when none is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant who can use available tools to solve problems";

/// Where the agent is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// No turn in progress.
    Idle,
    /// The conversation has been sent and a reply is pending.
    AwaitingBackend,
    /// The reply named a tool, which is being dispatched.
    ProcessingToolCall,
    /// The reply was plain text.
    PlainResponse,
}

/// Drives one conversation against a chat backend and a tool registry.
///
/// History grows without bound for the life of the agent.
pub struct ConversationAgent {
    model: String,
    system_prompt: String,
    backend: Arc<dyn ChatBackend>,
    registry: Registry,
    history: Vec<ChatMessage>,
    state: AgentState,
}

impl ConversationAgent {
    pub fn new(model: impl Into<String>, backend: Arc<dyn ChatBackend>, registry: Registry) -> Self {
        Self {
            model: model.into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            backend,
            registry,
            history: Vec::new(),
            state: AgentState::Idle,
        }
    }

    /// Replace the system prompt sent ahead of the history.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Run one turn, logging any failure instead of returning it.
    ///
    /// Returns `None` when the turn produced no usable text.
    pub async fn submit(&mut self, content: &str) -> Option<String> {
        match self.respond(content).await {
            Ok(text) => Some(text),
            Err(e) => {
                error!(model = %self.model, error = %e, "turn failed");
                None
            }
        }
    }

    /// Run one turn and return the answer text.
    pub async fn respond(&mut self, content: &str) -> Result<String, AgentError> {
        self.history.push(ChatMessage::user(content));
        let result = self.run_turn().await;
        self.state = AgentState::Idle;
        result
    }

    async fn run_turn(&mut self) -> Result<String, AgentError> {
        self.state = AgentState::AwaitingBackend;

        let request = ChatRequest::new(self.model.as_str())
            .system(self.system_prompt.as_str())
            .messages(self.history.iter().cloned())
            .tools(self.registry.schema_snapshot().await);

        let reply = self.backend.chat(&request).await?;
        self.handle_reply(reply).await
    }

    async fn handle_reply(&mut self, reply: ChatResponse) -> Result<String, AgentError> {
        let Some(message) = reply.message.as_ref() else {
            return Err(AgentError::MalformedReply("reply has no message".into()));
        };

        let Some(call) = reply.first_tool_call().cloned() else {
            self.state = AgentState::PlainResponse;
            let text = reply.text().ok_or(AgentError::EmptyReply)?.to_string();
            self.history.push(ChatMessage::assistant(text.as_str()));
            return Ok(text);
        };

        self.state = AgentState::ProcessingToolCall;
        if message.tool_calls.len() > 1 {
            debug!(ignored = message.tool_calls.len() - 1, "only the first tool call is honored");
        }

        let raw = serde_json::to_string(message)
            .map_err(|e| AgentError::MalformedReply(e.to_string()))?;
        self.history.push(ChatMessage::tool(raw));

        let name = call.function.name;
        info!(tool = %name, "model requested tool");
        let result = self.registry.dispatch(&name, call.function.arguments).await?;
        Ok(result.joined_text())
    }
}
