// ABOUTME: Ollama API client using the native chat and tags endpoints.
// ABOUTME: Connects to an Ollama server (default localhost:11434).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatBackend, ChatMessage, ChatRequest, ChatResponse, ToolSchema};
use crate::error::LlmError;

/// Default Ollama server address.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Wire format of `POST /api/chat`.
#[derive(Debug, Serialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<OllamaTool>,
    pub stream: bool,
}

/// Ollama tool definition.
#[derive(Debug, Serialize)]
pub struct OllamaTool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: OllamaFunction,
}

/// Ollama function definition.
#[derive(Debug, Serialize)]
pub struct OllamaFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl From<&ToolSchema> for OllamaTool {
    fn from(tool: &ToolSchema) -> Self {
        OllamaTool {
            tool_type: "function".to_string(),
            function: OllamaFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": tool.parameters.properties,
                    "required": tool.parameters.required,
                }),
            },
        }
    }
}

impl From<&ChatRequest> for OllamaChatRequest {
    fn from(req: &ChatRequest) -> Self {
        let system = req.system.as_ref().map(|s| ChatMessage::system(s.as_str()));
        OllamaChatRequest {
            model: req.model.clone(),
            messages: system.into_iter().chain(req.messages.iter().cloned()).collect(),
            tools: req.tools.iter().map(OllamaTool::from).collect(),
            stream: false,
        }
    }
}

/// Wire format of `GET /api/tags`.
#[derive(Debug, Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}

/// Ollama error body.
#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// Client for the Ollama API.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    http: reqwest::Client,
}

impl OllamaClient {
    /// Create a client for the server at `base_url`.
    ///
    /// A bare `host:port` gets an `http://` scheme; trailing slashes are dropped.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check(response: reqwest::Response) -> Result<String, LlmError> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<OllamaError>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        Err(LlmError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(OLLAMA_BASE_URL)
    }
}

fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}

#[async_trait]
impl ChatBackend for OllamaClient {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let body = OllamaChatRequest::from(req);
        debug!(model = %body.model, messages = body.messages.len(), tools = body.tools.len(), "sending chat request");

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        let text = Self::check(response).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let response = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        let text = Self::check(response).await?;
        let tags: OllamaTags = serde_json::from_str(&text)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}
