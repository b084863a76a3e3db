// ABOUTME: Implements the Registry - the in-memory catalog of invocable tools,
// ABOUTME: its schema snapshot for the model, and the dispatch contract.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{Arguments, Tool, ToolResult};
use crate::error::{McpError, ToolError};
use crate::llm::{ToolParameters, ToolSchema};
use crate::mcp::{McpClient, McpInvoker};

/// Argument that dispatch fills in when the model leaves it out.
pub const REPO_PATH_ARG: &str = "repo_path";

/// Tools keyed by name, remembering first-registration order.
#[derive(Default)]
struct Catalog {
    order: Vec<String>,
    tools: HashMap<String, Arc<Tool>>,
}

/// A registry of tools shared between the bootstrap phase and the agent.
///
/// Clones share the same catalog.
#[derive(Clone, Default)]
pub struct Registry {
    catalog: Arc<RwLock<Catalog>>,
    default_repo_path: Option<String>,
}

impl Registry {
    /// Create a new empty registry with no `repo_path` default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty registry that injects `path` as `repo_path` on
    /// dispatch when the model omits it.
    pub fn with_default_repo_path(path: impl Into<String>) -> Self {
        Self {
            catalog: Arc::default(),
            default_repo_path: Some(path.into()),
        }
    }

    pub fn default_repo_path(&self) -> Option<&str> {
        self.default_repo_path.as_deref()
    }

    /// Register a tool, replacing any tool already registered under its name.
    ///
    /// A replaced tool keeps its original position in the snapshot order.
    pub async fn register(&self, tool: Tool) {
        let mut catalog = self.catalog.write().await;
        let name = tool.name().to_string();
        if catalog.tools.insert(name.clone(), Arc::new(tool)).is_none() {
            catalog.order.push(name);
        } else {
            debug!(tool = %name, "replaced registered tool");
        }
    }

    /// Look a tool up by exact name.
    pub async fn get(&self, name: &str) -> Option<Arc<Tool>> {
        let catalog = self.catalog.read().await;
        catalog.tools.get(name).cloned()
    }

    /// All tool names, in registration order.
    pub async fn list(&self) -> Vec<String> {
        self.catalog.read().await.order.clone()
    }

    pub async fn count(&self) -> usize {
        self.catalog.read().await.tools.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.count().await == 0
    }

    /// Remove every tool.
    pub async fn clear(&self) {
        let mut catalog = self.catalog.write().await;
        catalog.order.clear();
        catalog.tools.clear();
    }

    /// The catalog in the shape the chat backend expects, in registration order.
    pub async fn schema_snapshot(&self) -> Vec<ToolSchema> {
        let catalog = self.catalog.read().await;
        catalog
            .order
            .iter()
            .filter_map(|name| catalog.tools.get(name))
            .map(|t| ToolSchema {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: ToolParameters {
                    properties: t.properties().clone(),
                    required: t.required().to_vec(),
                },
            })
            .collect()
    }

    /// Execute a tool call.
    ///
    /// Fills in `repo_path` when it is missing and a default is configured.
    /// An unregistered name is an error; any failure raised by the tool itself
    /// comes back as an error-status result.
    pub async fn dispatch(
        &self,
        name: &str,
        mut arguments: Arguments,
    ) -> Result<ToolResult, ToolError> {
        if let Some(path) = &self.default_repo_path {
            if !arguments.contains_key(REPO_PATH_ARG) {
                arguments.insert(REPO_PATH_ARG.to_string(), Value::String(path.clone()));
            }
        }

        let tool = self
            .get(name)
            .await
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let shown = Value::Object(arguments.clone());
        info!(tool = %name, arguments = %shown, "dispatching tool call");

        match tool.invoke(arguments).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(tool = %name, error = %e, "tool execution failed");
                Ok(ToolResult::execution_failure(name, &e))
            }
        }
    }

    /// Discover the tools on a connected MCP host and register each one.
    pub async fn merge_mcp(&self, client: Arc<McpClient>) -> Result<usize, McpError> {
        let tools = client.list_tools().await?;
        let count = tools.len();
        let invoker = Arc::new(McpInvoker::new(client.clone()));

        for info in tools {
            let tool =
                Tool::from_input_schema(info.name, invoker.clone(), info.description, &info.input_schema);
            self.register(tool).await;
        }

        info!(server = %client.name(), count, "registered MCP tools");
        Ok(count)
    }
}
