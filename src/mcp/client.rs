// ABOUTME: MCP client owning the connection to one tool host for a session:
// ABOUTME: handshake, tool discovery, tool invocation, and teardown.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::listing::decode_tool_listing;
use super::transport::{StdioTransport, Transport};
use super::{
    McpClientInfo, McpInitializeParams, McpInitializeResult, McpNotification, McpRequest,
    McpServerCapabilities, McpServerConfig, McpToolCallParams, McpToolInfo, McpToolResult,
    PROTOCOL_VERSION,
};
use crate::error::McpError;

/// Client for communicating with an MCP server.
///
/// Created disconnected; `connect` spawns the host (unless a transport was
/// supplied) and performs the handshake. Tool calls before that fail with
/// `McpError::NotConnected`.
pub struct McpClient {
    config: McpServerConfig,
    transport: Option<Arc<dyn Transport>>,
    initialized: bool,
    capabilities: McpServerCapabilities,
    server_info: Option<McpClientInfo>,
}

impl McpClient {
    /// Create a client for the host described by `config`.
    pub fn new(config: McpServerConfig) -> Self {
        Self {
            config,
            transport: None,
            initialized: false,
            capabilities: McpServerCapabilities::default(),
            server_info: None,
        }
    }

    /// Create a client over an already established transport.
    pub fn with_transport(config: McpServerConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport: Some(transport),
            ..Self::new(config)
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn is_connected(&self) -> bool {
        self.initialized
    }

    /// Get the server capabilities (available after connect).
    pub fn capabilities(&self) -> &McpServerCapabilities {
        &self.capabilities
    }

    /// Name and version the server reported, if any.
    pub fn server_info(&self) -> Option<&McpClientInfo> {
        self.server_info.as_ref()
    }

    /// Establish the transport and perform the initialize handshake.
    ///
    /// A transport that was spawned is kept even when the handshake fails, so
    /// `close` can still release it.
    pub async fn connect(&mut self) -> Result<(), McpError> {
        if self.initialized {
            warn!(server = %self.config.name, "connect called on a connected client");
            return Ok(());
        }

        let transport = match &self.transport {
            Some(t) => t.clone(),
            None => {
                let t: Arc<dyn Transport> = Arc::new(
                    StdioTransport::connect(&self.config.command, &self.config.args, &self.config.env)
                        .await?,
                );
                self.transport = Some(t.clone());
                t
            }
        };

        let init = self.initialize(transport.as_ref()).await?;
        info!(
            server = %self.config.name,
            protocol = %init.protocol_version,
            remote = init.server_info.as_ref().map(|i| i.name.as_str()).unwrap_or("unknown"),
            "connected to MCP server"
        );

        self.capabilities = init.capabilities;
        self.server_info = init.server_info;
        self.initialized = true;
        Ok(())
    }

    async fn initialize(&self, transport: &dyn Transport) -> Result<McpInitializeResult, McpError> {
        let params = McpInitializeParams {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: serde_json::json!({}),
            client_info: McpClientInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        let result = send_request(transport, "initialize", Some(serde_json::to_value(params)?)).await?;
        let init: McpInitializeResult = serde_json::from_value(result)?;

        transport
            .notify(McpNotification::new("notifications/initialized", None))
            .await?;

        Ok(init)
    }

    fn session(&self) -> Result<&dyn Transport, McpError> {
        match &self.transport {
            Some(t) if self.initialized => Ok(t.as_ref()),
            _ => Err(McpError::NotConnected),
        }
    }

    /// List available tools from the server.
    ///
    /// A result whose shape cannot be decoded is logged and yields no tools.
    pub async fn list_tools(&self) -> Result<Vec<McpToolInfo>, McpError> {
        let result = send_request(self.session()?, "tools/list", None).await?;

        match decode_tool_listing(&result) {
            Ok(tools) => {
                debug!(server = %self.config.name, count = tools.len(), "listed tools");
                Ok(tools)
            }
            Err(e) => {
                warn!(server = %self.config.name, error = %e, raw = %result, "could not parse tools response");
                Ok(Vec::new())
            }
        }
    }

    /// Call a tool on the server.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<McpToolResult, McpError> {
        let params = McpToolCallParams {
            name: name.to_string(),
            arguments,
        };

        let result = send_request(self.session()?, "tools/call", Some(serde_json::to_value(params)?)).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Release the transport. Safe to call repeatedly and after a failed connect.
    pub async fn close(&self) -> Result<(), McpError> {
        match &self.transport {
            Some(t) => {
                debug!(server = %self.config.name, "closing MCP connection");
                t.shutdown().await
            }
            None => Ok(()),
        }
    }
}

/// Send a request and unwrap its result.
async fn send_request(
    transport: &dyn Transport,
    method: &str,
    params: Option<Value>,
) -> Result<Value, McpError> {
    let response = transport.send(McpRequest::new(method, params)).await?;

    if let Some(error) = response.error {
        return Err(McpError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    response
        .result
        .ok_or_else(|| McpError::Protocol(format!("No result in response to '{method}'")))
}
