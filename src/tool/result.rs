// ABOUTME: Defines the ToolResult type - the uniform outcome of a tool
// ABOUTME: invocation, with a status and ordered text fragments.

use serde::{Deserialize, Serialize};

/// Prefix applied to failures contained by dispatch.
pub const EXECUTION_ERROR_PREFIX: &str = "Error executing tool: ";

/// Whether an invocation succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

/// One piece of a multi-part result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
}

impl TextFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Result of a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that produced this result.
    pub tool: String,

    pub status: ToolStatus,

    /// Output fragments, in the order the host returned them.
    pub content: Vec<TextFragment>,
}

impl ToolResult {
    /// Create a successful result from fragments.
    pub fn success<I, S>(tool: impl Into<String>, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tool: tool.into(),
            status: ToolStatus::Success,
            content: fragments.into_iter().map(TextFragment::new).collect(),
        }
    }

    /// Create a successful result with a single fragment.
    pub fn text(tool: impl Into<String>, text: impl Into<String>) -> Self {
        Self::success(tool, [text.into()])
    }

    /// Create an error result with a single fragment.
    pub fn error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            status: ToolStatus::Error,
            content: vec![TextFragment::new(message)],
        }
    }

    /// Wrap an invocation failure the way dispatch reports it.
    pub fn execution_failure(tool: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::error(tool, format!("{EXECUTION_ERROR_PREFIX}{err}"))
    }

    pub fn is_error(&self) -> bool {
        self.status == ToolStatus::Error
    }

    /// Concatenate every fragment with no separator.
    pub fn joined_text(&self) -> String {
        self.content.iter().map(|f| f.text.as_str()).collect()
    }
}
