// ABOUTME: Defines the ToolInvoker trait and the Tool record - what the
// ABOUTME: registry stores and how a registered tool is executed.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::ToolResult;

/// Argument map passed to a tool: parameter name to value.
pub type Arguments = Map<String, Value>;

/// Anything that can execute a named tool with an argument map.
///
/// The MCP adapter implements this for tools discovered on a host; tests and
/// embedders can implement it for local callables.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Execute `name` with `arguments`.
    async fn invoke(&self, name: &str, arguments: Arguments) -> Result<ToolResult, anyhow::Error>;
}

/// A registered capability.
#[derive(Clone)]
pub struct Tool {
    name: String,
    invoker: Arc<dyn ToolInvoker>,
    description: String,
    properties: Value,
    required: Vec<String>,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        invoker: Arc<dyn ToolInvoker>,
        description: impl Into<String>,
        properties: Value,
        required: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            invoker,
            description: description.into(),
            properties,
            required,
        }
    }

    /// Build a tool from a JSON-Schema-like input schema.
    ///
    /// `properties` and `required` are taken as-is. A missing `properties`
    /// becomes an empty object, and a missing or non-array `required` becomes
    /// an empty list; non-string entries in `required` are skipped.
    pub fn from_input_schema(
        name: impl Into<String>,
        invoker: Arc<dyn ToolInvoker>,
        description: impl Into<String>,
        input_schema: &Value,
    ) -> Self {
        let properties = input_schema
            .get("properties")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let required = input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(|n| n.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Self::new(name, invoker, description, properties, required)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parameter name to type descriptor, as registered.
    pub fn properties(&self) -> &Value {
        &self.properties
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Run the bound operation.
    pub async fn invoke(&self, arguments: Arguments) -> Result<ToolResult, anyhow::Error> {
        self.invoker.invoke(&self.name, arguments).await
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("properties", &self.properties)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}
