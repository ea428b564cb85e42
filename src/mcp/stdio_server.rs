// Line-delimited JSON-RPC over stdin/stdout.
//
// Each line on the reader is one message; each response is one line on the
// writer. stdout is reserved for protocol traffic, so all logging goes to
// stderr (set up in main).

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, INVALID_REQUEST, PARSE_ERROR,
    PROTOCOL_VERSION,
};
use super::tool_catalog::tool_catalog;
use super::tool_handler::ToolHandler;
use crate::core::documents::DocsApi;
use crate::core::scripts::ScriptsApi;
use crate::core::sheets::SheetsApi;

pub const SERVER_NAME: &str = "docmcp";

pub struct StdioServer<D: DocsApi, S: SheetsApi, P: ScriptsApi> {
    handler: ToolHandler<D, S, P>,
}

impl<D: DocsApi, S: SheetsApi, P: ScriptsApi> StdioServer<D, S, P> {
    pub fn new(handler: ToolHandler<D, S, P>) -> Self {
        Self { handler }
    }

    /// Serve until the reader reaches EOF.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("MCP server listening on stdio");

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if let Some(response) = self.handle_line(&line).await {
                let mut encoded = serde_json::to_string(&response)?;
                encoded.push('\n');
                writer.write_all(encoded.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle one message. Notifications and blank lines produce no response.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Unparseable message: {}", e);
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    JsonRpcError::new(PARSE_ERROR, format!("Parse error: {}", e)),
                ));
            }
        };

        let fallback_id = message.get("id").cloned().unwrap_or(Value::Null);
        let request = match serde_json::from_value::<JsonRpcRequest>(message) {
            Ok(request) if request.jsonrpc == "2.0" => request,
            Ok(_) => {
                return Some(JsonRpcResponse::failure(
                    fallback_id,
                    JsonRpcError::new(INVALID_REQUEST, "jsonrpc must be \"2.0\""),
                ))
            }
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    fallback_id,
                    JsonRpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e)),
                ))
            }
        };

        let Some(id) = request.id.clone() else {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        };

        Some(match self.handle_request(&request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    async fn handle_request(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        let params = request.params.clone().unwrap_or_else(|| json!({}));

        match request.method.as_str() {
            "initialize" => {
                let version = params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(PROTOCOL_VERSION);
                tracing::info!(protocol_version = version, "Client initialised");
                Ok(json!({
                    "protocolVersion": version,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }))
            }
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_catalog() })),
            "tools/call" => {
                let name = params
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| JsonRpcError::invalid_params("Missing tool name"))?;
                let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

                let result = self.handler.call(name, &arguments).await?;
                serde_json::to_value(result)
                    .map_err(|e| JsonRpcError::new(INVALID_REQUEST, e.to_string()))
            }
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }
}
