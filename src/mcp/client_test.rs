// ABOUTME: Tests for McpClient - handshake, discovery, invocation, teardown.
// ABOUTME: Uses a scripted in-memory transport instead of a subprocess.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use super::*;
use crate::error::McpError;
use crate::tool::{Registry, ToolStatus};

/// Answers requests from a per-method script and records traffic.
#[derive(Default)]
struct ScriptedTransport {
    replies: HashMap<String, Result<Value, (i32, String)>>,
    requests: Mutex<Vec<McpRequest>>,
    notifications: Mutex<Vec<String>>,
    shutdowns: AtomicUsize,
}

impl ScriptedTransport {
    fn reply(mut self, method: &str, result: Value) -> Self {
        self.replies.insert(method.to_string(), Ok(result));
        self
    }

    fn fail(mut self, method: &str, code: i32, message: &str) -> Self {
        self.replies
            .insert(method.to_string(), Err((code, message.to_string())));
        self
    }

    fn git_host() -> Self {
        Self::default().reply(
            "initialize",
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {"tools": {}},
                "serverInfo": {"name": "mcp-git", "version": "1.0.0"}
            }),
        )
    }

    async fn methods(&self) -> Vec<String> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|r| r.method.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: McpRequest) -> Result<McpResponse, McpError> {
        let id = request.id;
        let reply = self.replies.get(&request.method).cloned();
        self.requests.lock().await.push(request);

        match reply {
            Some(Ok(result)) => Ok(McpResponse::success(id, result)),
            Some(Err((code, message))) => Ok(McpResponse::failure(id, code, message)),
            None => Ok(McpResponse::failure(id, -32601, "Method not found")),
        }
    }

    async fn notify(&self, notification: McpNotification) -> Result<(), McpError> {
        self.notifications.lock().await.push(notification.method);
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), McpError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn config() -> McpServerConfig {
    McpServerConfig {
        name: "git".into(),
        command: "uvx".into(),
        args: vec!["mcp-server-git".into()],
        env: HashMap::new(),
    }
}

fn three_tools() -> Value {
    json!({
        "_meta": null,
        "nextCursor": null,
        "tools": [
            {
                "name": "git_status",
                "description": "Shows the working tree status",
                "inputSchema": {"properties": {"repo_path": {"type": "string"}}, "required": ["repo_path"]}
            },
            {
                "name": "git_diff_staged",
                "description": "Shows changes that are staged for commit",
                "inputSchema": {"properties": {"repo_path": {"type": "string"}}, "required": ["repo_path"]}
            },
            {
                "name": "git_commit",
                "description": "Records changes to the repository",
                "inputSchema": {
                    "properties": {"repo_path": {"type": "string"}, "message": {"type": "string"}},
                    "required": ["repo_path", "message"]
                }
            }
        ]
    })
}

async fn connected(transport: Arc<ScriptedTransport>) -> McpClient {
    let mut client = McpClient::with_transport(config(), transport);
    client.connect().await.expect("handshake");
    client
}

#[tokio::test]
async fn test_calls_before_connect_fail() {
    let transport = Arc::new(ScriptedTransport::git_host());
    let client = McpClient::with_transport(config(), transport.clone());

    assert!(!client.is_connected());
    assert!(matches!(client.list_tools().await, Err(McpError::NotConnected)));
    assert!(matches!(
        client.call_tool("git_status", json!({})).await,
        Err(McpError::NotConnected)
    ));
    assert!(transport.methods().await.is_empty());
}

#[tokio::test]
async fn test_connect_performs_handshake() {
    let transport = Arc::new(ScriptedTransport::git_host());
    let client = connected(transport.clone()).await;

    assert!(client.is_connected());
    assert_eq!(client.name(), "git");
    assert_eq!(client.server_info().unwrap().name, "mcp-git");
    assert!(client.capabilities().tools.is_some());
    assert_eq!(transport.methods().await, vec!["initialize"]);
    assert_eq!(
        *transport.notifications.lock().await,
        vec!["notifications/initialized"]
    );

    let init = &transport.requests.lock().await[0];
    let params = init.params.as_ref().unwrap();
    assert_eq!(params["protocolVersion"], PROTOCOL_VERSION);
    assert_eq!(params["clientInfo"]["name"], "toolbridge");
}

#[tokio::test]
async fn test_second_connect_is_noop() {
    let transport = Arc::new(ScriptedTransport::git_host());
    let mut client = connected(transport.clone()).await;

    client.connect().await.unwrap();
    assert_eq!(transport.methods().await, vec!["initialize"]);
}

#[tokio::test]
async fn test_failed_handshake_still_closes() {
    let transport = Arc::new(ScriptedTransport::default().fail("initialize", -32603, "boom"));
    let mut client = McpClient::with_transport(config(), transport.clone());

    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, McpError::Rpc { code: -32603, .. }));
    assert!(!client.is_connected());

    client.close().await.unwrap();
    assert_eq!(transport.shutdowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_spawn_failure_then_close() {
    let mut client = McpClient::new(McpServerConfig {
        command: "/nonexistent/mcp-server".into(),
        ..config()
    });

    assert!(matches!(client.connect().await, Err(McpError::Connection(_))));
    assert!(client.close().await.is_ok());
}

#[tokio::test]
async fn test_list_tools() {
    let transport = Arc::new(ScriptedTransport::git_host().reply("tools/list", three_tools()));
    let client = connected(transport).await;

    let tools = client.list_tools().await.unwrap();
    let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["git_status", "git_diff_staged", "git_commit"]);
}

#[tokio::test]
async fn test_list_tools_malformed_is_empty() {
    let transport = Arc::new(
        ScriptedTransport::git_host().reply("tools/list", json!({"unexpected": "shape"})),
    );
    let client = connected(transport).await;

    assert!(client.list_tools().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_tools_rpc_error_propagates() {
    let transport =
        Arc::new(ScriptedTransport::git_host().fail("tools/list", -32000, "server crashed"));
    let client = connected(transport).await;

    assert!(matches!(client.list_tools().await, Err(McpError::Rpc { .. })));
}

#[tokio::test]
async fn test_merge_populates_registry() {
    let transport = Arc::new(ScriptedTransport::git_host().reply("tools/list", three_tools()));
    let client = Arc::new(connected(transport).await);
    let registry = Registry::new();

    let count = registry.merge_mcp(client).await.unwrap();
    assert_eq!(count, 3);
    assert_eq!(registry.count().await, 3);

    let snapshot = registry.schema_snapshot().await;
    assert_eq!(snapshot[2].name, "git_commit");
    assert_eq!(snapshot[2].description, "Records changes to the repository");
    assert_eq!(snapshot[2].parameters.properties["message"]["type"], "string");
    assert_eq!(snapshot[2].parameters.required, vec!["repo_path", "message"]);
}

#[tokio::test]
async fn test_merge_malformed_registers_nothing() {
    let transport = Arc::new(ScriptedTransport::git_host().reply("tools/list", json!([1, 2])));
    let client = Arc::new(connected(transport).await);
    let registry = Registry::new();

    assert_eq!(registry.merge_mcp(client).await.unwrap(), 0);
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_call_tool_forwards_arguments() {
    let transport = Arc::new(
        ScriptedTransport::git_host()
            .reply("tools/list", three_tools())
            .reply(
                "tools/call",
                json!({"content": [{"type": "text", "text": "On branch main"}], "isError": false}),
            ),
    );
    let client = connected(transport.clone()).await;

    let result = client
        .call_tool("git_status", json!({"repo_path": "/repo"}))
        .await
        .unwrap();
    assert_eq!(result.content.len(), 1);

    let requests = transport.requests.lock().await;
    let call = requests.last().unwrap();
    assert_eq!(call.method, "tools/call");
    assert_eq!(
        call.params,
        Some(json!({"name": "git_status", "arguments": {"repo_path": "/repo"}}))
    );
}

#[tokio::test]
async fn test_dispatch_through_mcp() {
    let transport = Arc::new(
        ScriptedTransport::git_host()
            .reply("tools/list", three_tools())
            .reply(
                "tools/call",
                json!({"content": [{"type": "text", "text": "On branch "}, {"type": "text", "text": "main"}]}),
            ),
    );
    let client = Arc::new(connected(transport.clone()).await);
    let registry = Registry::with_default_repo_path("/repo");
    registry.merge_mcp(client).await.unwrap();

    let result = registry
        .dispatch("git_status", serde_json::Map::new())
        .await
        .unwrap();
    assert_eq!(result.status, ToolStatus::Success);
    assert_eq!(result.joined_text(), "On branch main");

    let requests = transport.requests.lock().await;
    let params = requests.last().unwrap().params.clone().unwrap();
    assert_eq!(params["arguments"]["repo_path"], "/repo");
}

#[tokio::test]
async fn test_remote_failure_is_contained() {
    let transport = Arc::new(
        ScriptedTransport::git_host()
            .reply("tools/list", three_tools())
            .fail("tools/call", -32000, "not a git repository"),
    );
    let client = Arc::new(connected(transport).await);
    let registry = Registry::with_default_repo_path("/repo");
    registry.merge_mcp(client).await.unwrap();

    let result = registry
        .dispatch("git_status", serde_json::Map::new())
        .await
        .unwrap();
    assert_eq!(result.status, ToolStatus::Error);
    assert_eq!(
        result.joined_text(),
        "Error executing tool: RPC error (-32000): not a git repository"
    );
}

#[tokio::test]
async fn test_close_is_repeatable() {
    let transport = Arc::new(ScriptedTransport::git_host());
    let client = connected(transport.clone()).await;

    client.close().await.unwrap();
    client.close().await.unwrap();
    assert_eq!(transport.shutdowns.load(Ordering::SeqCst), 2);
}
