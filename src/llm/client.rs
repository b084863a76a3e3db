// ABOUTME: Defines the ChatBackend trait - the seam between the agent and
// ABOUTME: whichever chat model server answers requests.

use async_trait::async_trait;

use super::{ChatRequest, ChatResponse};
use crate::error::LlmError;

/// Trait for chat backend implementations.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the conversation and tool catalog, get one reply.
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Names of the models the backend can serve.
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;
}
