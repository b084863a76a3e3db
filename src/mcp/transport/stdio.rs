// ABOUTME: Stdio transport for MCP communication.
// ABOUTME: Spawns a subprocess and communicates via JSON-RPC over stdin/stdout.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::Transport;
use crate::error::McpError;
use crate::mcp::{McpNotification, McpRequest, McpResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const EXIT_GRACE: Duration = Duration::from_millis(500);

type PendingMap = Arc<Mutex<HashMap<u64, mpsc::Sender<McpResponse>>>>;

/// Stdio transport - spawns a subprocess and communicates via JSON-RPC over stdin/stdout.
///
/// The child is killed if the transport is dropped without `shutdown`.
pub struct StdioTransport {
    child: Mutex<Option<Child>>,
    stdin: Mutex<Option<ChildStdin>>,
    pending: PendingMap,
    reader_handle: Mutex<Option<JoinHandle<()>>>,
}

impl StdioTransport {
    /// Create a new stdio transport by spawning a subprocess.
    pub async fn connect(
        command: &str,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> Result<Self, McpError> {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .envs(env.iter())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| McpError::Connection(format!("failed to spawn '{command}': {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::Connection("Failed to open stdin".into()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::Connection("Failed to open stdout".into()))?;

        debug!(command, pid = child.id(), "spawned MCP server");

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let pending_clone = pending.clone();
        let reader_handle = tokio::spawn(async move {
            let mut reader = BufReader::new(stdout).lines();
            loop {
                match reader.next_line().await {
                    Ok(Some(line)) => match serde_json::from_str::<McpResponse>(&line) {
                        Ok(response) => {
                            let mut pending = pending_clone.lock().await;
                            if let Some(tx) = pending.remove(&response.id) {
                                let _ = tx.send(response).await;
                            } else {
                                debug!(id = response.id, "response for unknown request");
                            }
                        }
                        Err(_) => trace!(%line, "ignoring non-response line"),
                    },
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "failed reading MCP server output");
                        break;
                    }
                }
            }
            // Dropping the senders wakes every waiter with a closed channel.
            pending_clone.lock().await.clear();
        });

        Ok(Self {
            child: Mutex::new(Some(child)),
            stdin: Mutex::new(Some(stdin)),
            pending,
            reader_handle: Mutex::new(Some(reader_handle)),
        })
    }

    async fn write_line(&self, json: String) -> Result<(), McpError> {
        let mut stdin = self.stdin.lock().await;
        let stdin_ref = stdin
            .as_mut()
            .ok_or_else(|| McpError::Connection("Server connection closed".into()))?;
        stdin_ref.write_all(json.as_bytes()).await?;
        stdin_ref.write_all(b"\n").await?;
        stdin_ref.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn send(&self, request: McpRequest) -> Result<McpResponse, McpError> {
        let id = request.id;

        let (tx, mut rx) = mpsc::channel(1);
        self.pending.lock().await.insert(id, tx);

        let write_result = match serde_json::to_string(&request) {
            Ok(json) => self.write_line(json).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = write_result {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(REQUEST_TIMEOUT, rx.recv()).await {
            Ok(Some(response)) => Ok(response),
            Ok(None) => Err(McpError::Protocol("No response received".into())),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(McpError::Protocol(format!(
                    "Request '{}' timed out",
                    request.method
                )))
            }
        }
    }

    async fn notify(&self, notification: McpNotification) -> Result<(), McpError> {
        let json = serde_json::to_string(&notification)?;
        self.write_line(json).await
    }

    async fn shutdown(&self) -> Result<(), McpError> {
        // Closing stdin is the polite stop signal for stdio servers.
        self.stdin.lock().await.take();

        if let Some(handle) = self.reader_handle.lock().await.take() {
            handle.abort();
        }

        if let Some(mut child) = self.child.lock().await.take() {
            if tokio::time::timeout(EXIT_GRACE, child.wait()).await.is_err() {
                debug!("MCP server did not exit in time, killing");
                let _ = child.kill().await;
            }
        }

        Ok(())
    }
}
