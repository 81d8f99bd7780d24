//! MCP server core: request routing and the stdio transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use music_mcp_types::{
    CallToolParams, CancelledNotification, Implementation, InitializeParams, InitializeResult,
    JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, ListToolsResult, LogLevel,
    RequestId, ServerCapabilities, SetLogLevelParams, methods,
};

use crate::handlers::ToolService;

/// Queue depth between request tasks and the stdout writer.
const OUTBOUND_QUEUE: usize = 64;

/// Lifecycle of a client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// No `initialize` seen yet.
    Uninitialized,
    /// `initialize` answered, waiting for `notifications/initialized`.
    Initializing,
    /// Handshake complete.
    Ready,
    /// `stop` was called.
    ShuttingDown,
    /// The transport loop has returned.
    Stopped,
}

/// MCP server bound to a single [`ToolService`].
pub struct McpServer {
    pub(crate) info: Implementation,
    pub(crate) capabilities: ServerCapabilities,
    pub(crate) service: Arc<dyn ToolService>,
    pub(crate) log_level: RwLock<LogLevel>,
    pub(crate) state: RwLock<ServerState>,
    pub(crate) running: AtomicBool,
    pub(crate) client_info: RwLock<Option<Implementation>>,
    pub(crate) instructions: Option<String>,
}

impl McpServer {
    /// Create a server. Prefer [`crate::McpServerBuilder`].
    pub fn new(
        info: Implementation,
        capabilities: ServerCapabilities,
        service: Arc<dyn ToolService>,
    ) -> Self {
        Self {
            info,
            capabilities,
            service,
            log_level: RwLock::new(LogLevel::Info),
            state: RwLock::new(ServerState::Uninitialized),
            running: AtomicBool::new(false),
            client_info: RwLock::new(None),
            instructions: None,
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> ServerState {
        *self.state.read().await
    }

    /// Level last requested through `logging/setLevel`.
    pub async fn log_level(&self) -> LogLevel {
        *self.log_level.read().await
    }

    /// Client identity, once `initialize` has been received.
    pub async fn client_info(&self) -> Option<Implementation> {
        self.client_info.read().await.clone()
    }

    /// Ask the transport loop to stop after the current line.
    pub async fn stop(&self) {
        info!("Stopping MCP server");
        *self.state.write().await = ServerState::ShuttingDown;
        self.running.store(false, Ordering::SeqCst);
    }

    // ========================================================================
    // Request handling
    // ========================================================================

    /// Route one request to its handler. Never fails: protocol problems are
    /// returned as JSON-RPC errors, tool problems inside the call result.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!(method = %request.method, id = %request.id, "Handling request");

        let result = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(request.params).await,
            methods::PING => Ok(json!({})),
            methods::TOOLS_LIST => self.handle_list_tools(),
            methods::TOOLS_CALL => self.handle_call_tool(request.params).await,
            methods::LOGGING_SET_LEVEL => self.handle_set_log_level(request.params).await,
            _ => Err(JsonRpcError::method_not_found(&request.method)),
        };

        match result {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(error) => JsonRpcResponse::error(request.id, error),
        }
    }

    /// Handle a notification. Nothing is written back.
    pub async fn handle_notification(&self, notification: JsonRpcNotification) {
        debug!(method = %notification.method, "Handling notification");

        match notification.method.as_str() {
            methods::INITIALIZED => {
                *self.state.write().await = ServerState::Ready;
                info!("Client handshake complete");
            }
            methods::CANCELLED => {
                // Tool calls cannot be interrupted; their own timeout bounds them.
                let cancelled = notification
                    .params
                    .and_then(|p| serde_json::from_value::<CancelledNotification>(p).ok());
                if let Some(cancelled) = cancelled {
                    debug!(
                        request_id = %cancelled.request_id,
                        reason = cancelled.reason.as_deref().unwrap_or(""),
                        "Ignoring cancellation, tool calls run to completion or timeout"
                    );
                }
            }
            _ => {
                warn!(method = %notification.method, "Unknown notification");
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        {
            let mut state = self.state.write().await;
            if *state != ServerState::Uninitialized {
                return Err(JsonRpcError::invalid_request("Server already initialized"));
            }
            *state = ServerState::Initializing;
        }

        let init: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))?
            .unwrap_or_default();

        info!(
            client = %init.client_info.name,
            version = %init.client_info.version,
            protocol = %init.protocol_version,
            "Client connected"
        );
        *self.client_info.write().await = Some(init.client_info);

        let result = InitializeResult {
            protocol_version: music_mcp_types::PROTOCOL_VERSION.to_string(),
            capabilities: self.capabilities.clone(),
            server_info: self.info.clone(),
            instructions: self.instructions.clone(),
        };
        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    fn handle_list_tools(&self) -> Result<Value, JsonRpcError> {
        let result = ListToolsResult::new(self.service.tools());
        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    async fn handle_call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("Missing params"))
            .and_then(|p| {
                serde_json::from_value(p)
                    .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))
            })?;

        let started = Instant::now();
        let arguments = params.arguments.unwrap_or(Value::Null);
        let result = self.service.call(&params.name, arguments).await;
        debug!(
            tool = %params.name,
            is_error = result.is_error(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tool call finished"
        );

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    async fn handle_set_log_level(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: SetLogLevelParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("Missing params"))
            .and_then(|p| {
                serde_json::from_value(p)
                    .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))
            })?;

        *self.log_level.write().await = params.level;
        debug!(level = %params.level, "Client log level changed");
        Ok(json!({}))
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Serve newline-delimited JSON-RPC on stdin/stdout until EOF or `stop`.
    pub async fn run_stdio(self: Arc<Self>) -> Result<()> {
        info!(server = %self.info.name, "Starting MCP server on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve newline-delimited JSON-RPC over any reader/writer pair.
    ///
    /// `tools/call` requests run as independent tasks so a slow script does
    /// not hold up later requests. All output goes through one writer task,
    /// so every response is a whole line. On EOF the loop waits for in-flight
    /// calls before returning.
    pub async fn serve<R, W>(self: Arc<Self>, mut reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        self.running.store(true, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel::<JsonRpcResponse>(OUTBOUND_QUEUE);
        let writer_task = tokio::spawn(write_responses(rx, writer));
        let mut in_flight = JoinSet::new();

        let mut line = String::new();
        while self.running.load(Ordering::SeqCst) {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    debug!("EOF on input, shutting down");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "Error reading input");
                    break;
                }
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Ok(request) = serde_json::from_str::<JsonRpcRequest>(trimmed) {
                if request.method == methods::TOOLS_CALL {
                    let server = Arc::clone(&self);
                    let tx = tx.clone();
                    in_flight.spawn(async move {
                        let response = server.handle_request(request).await;
                        let _ = tx.send(response).await;
                    });
                } else {
                    let response = self.handle_request(request).await;
                    if tx.send(response).await.is_err() {
                        break;
                    }
                }
            } else if let Ok(notification) = serde_json::from_str::<JsonRpcNotification>(trimmed)
            {
                self.handle_notification(notification).await;
            } else {
                warn!(line = %trimmed, "Invalid JSON-RPC message");
                let response = JsonRpcResponse::error(
                    RequestId::Number(0),
                    JsonRpcError::parse_error("Invalid JSON"),
                );
                if tx.send(response).await.is_err() {
                    break;
                }
            }

            // Reap finished calls so the set does not grow without bound.
            while let Some(joined) = in_flight.try_join_next() {
                if let Err(e) = joined {
                    error!(error = %e, "Tool call task failed");
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Tool call task failed");
            }
        }
        drop(tx);
        writer_task
            .await
            .context("Response writer task panicked")?
            .context("Failed to write response")?;

        *self.state.write().await = ServerState::Stopped;
        self.running.store(false, Ordering::SeqCst);
        info!("MCP server stopped");
        Ok(())
    }
}

async fn write_responses<W>(mut rx: mpsc::Receiver<JsonRpcResponse>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response).context("Failed to serialize response")?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
