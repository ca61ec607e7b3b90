// MCP server: newline-delimited JSON-RPC over stdio

use crate::protocol::{
    CallToolParams, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, ServerCapabilities, ServerInfo, ToolsCapability,
    DEFAULT_PROTOCOL_VERSION,
};
use crate::tools::ToolRegistry;
use anyhow::{Context, Result};
use futures::StreamExt;
use serde::Serialize;
use std::io::Write;
use tokio::io::AsyncRead;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};

/// Longest accepted request line
const MAX_LINE_LENGTH: usize = 1024 * 1024;

pub struct McpServer {
    registry: ToolRegistry,
    info: ServerInfo,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            info: ServerInfo::default(),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Serve stdin/stdout until stdin closes
    pub async fn start(&self) -> Result<()> {
        tracing::info!("PingMCP server running");
        self.serve(tokio::io::stdin(), std::io::stdout()).await
    }

    /// Read one request per line from `reader`, write one response line per
    /// request to `writer`. Requests are handled strictly in order.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: Write,
    {
        // Framed on raw bytes so a line that is not UTF-8 only fails itself
        let codec = AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), b"\n".to_vec(), MAX_LINE_LENGTH);
        let mut lines = FramedRead::new(reader, codec);

        while let Some(line) = lines.next().await {
            let response = match line {
                Ok(bytes) => match std::str::from_utf8(&bytes) {
                    Ok(line) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match self.handle_message(line).await {
                            Some(response) => response,
                            None => continue,
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Request line is not valid UTF-8");
                        JsonRpcResponse::error(serde_json::Value::Null, JsonRpcError::parse_error())
                    }
                },
                Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => {
                    tracing::warn!("Request line exceeds {} bytes, discarding", MAX_LINE_LENGTH);
                    JsonRpcResponse::error(serde_json::Value::Null, JsonRpcError::parse_error())
                }
                Err(AnyDelimiterCodecError::Io(e)) => {
                    return Err(e).context("Failed to read request");
                }
            };

            write_frame(&mut writer, &response)?;
        }

        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Handle one raw request line. Returns `None` for notifications.
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse request");
                return Some(JsonRpcResponse::error(
                    serde_json::Value::Null,
                    JsonRpcError::parse_error(),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(serde_json::Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid request");
                return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
            }
        };

        let Some(id) = request.id.clone() else {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        };

        tracing::debug!(method = %request.method, "Request received");
        let response = match self.dispatch(&request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => {
                tracing::warn!(method = %request.method, error = %error.message, "Request failed");
                JsonRpcResponse::error(id, error)
            }
        };

        Some(response)
    }

    async fn dispatch(&self, request: &JsonRpcRequest) -> Result<serde_json::Value, JsonRpcError> {
        match request.method.as_str() {
            "initialize" => {
                let params: InitializeParams = parse_params(request.params.clone())?.unwrap_or_default();
                if let Some(client) = &params.client_info {
                    tracing::info!(client = %client.name, version = %client.version, "Client connected");
                }

                to_result(InitializeResult {
                    protocol_version: params
                        .protocol_version
                        .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string()),
                    capabilities: ServerCapabilities {
                        tools: Some(ToolsCapability {
                            list_changed: false,
                        }),
                    },
                    server_info: self.info.clone(),
                })
            }
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => to_result(ListToolsResult {
                tools: self.registry.list_schemas(),
            }),
            "tools/call" => {
                let params: CallToolParams = parse_params(request.params.clone())?
                    .ok_or_else(|| JsonRpcError::invalid_params("Missing params for tools/call"))?;

                let result = self.registry.call(&params.name, params.arguments).await?;
                to_result(result)
            }
            method => Err(JsonRpcError::method_not_found(method)),
        }
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(
    params: Option<serde_json::Value>,
) -> Result<Option<T>, JsonRpcError> {
    match params {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(params) => serde_json::from_value(params)
            .map(Some)
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e))),
    }
}

fn to_result(result: impl Serialize) -> Result<serde_json::Value, JsonRpcError> {
    serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

/// Write one response as a single line. The whole frame goes out in one
/// `write_all`, so for stdout it is emitted under one lock acquisition.
fn write_frame<W: Write>(writer: &mut W, response: &JsonRpcResponse) -> Result<()> {
    let mut frame = serde_json::to_vec(response).context("Failed to serialize response")?;
    frame.push(b'\n');
    writer.write_all(&frame).context("Failed to write response")?;
    writer.flush().context("Failed to flush response")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::NotifyTool;
    use pingmcp_core::playback::{Bell, PlaybackDriver, PlayerCommand, PlayerTable};
    use pingmcp_core::sound::{CacheMode, SoundResolver, SoundSource};
    use pingmcp_core::Platform;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    struct SilentBell;

    impl Bell for SilentBell {
        fn ring(&self) {}
    }

    fn server(root: &Path, players: Vec<PlayerCommand>) -> McpServer {
        let sounds = Arc::new(SoundSource::new(SoundResolver::new(root), CacheMode::PerCall));
        let driver = Arc::new(
            PlaybackDriver::for_platform(Platform::Linux, &PlayerTable::new(), Arc::new(SilentBell))
                .with_players(players),
        );

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NotifyTool::new(sounds, driver)));
        McpServer::new(registry)
    }

    async fn call(server: &McpServer, request: serde_json::Value) -> serde_json::Value {
        let response = server
            .handle_message(&request.to_string())
            .await
            .expect("expected a response");
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let temp_dir = TempDir::new().unwrap();
        let server = server(temp_dir.path(), vec![]);

        let response = call(
            &server,
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2025-03-26",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "1.0"}
                }
            }),
        )
        .await;

        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(response["result"]["serverInfo"]["name"], "pingmcp");
        assert_eq!(response["result"]["capabilities"]["tools"]["listChanged"], false);
    }

    #[tokio::test]
    async fn test_tools_list_has_only_notify() {
        let temp_dir = TempDir::new().unwrap();
        let server = server(temp_dir.path(), vec![]);

        let response = call(
            &server,
            serde_json::json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        )
        .await;

        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "notify");
        assert!(tools[0]["description"].is_string());
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
        assert_eq!(tools[0]["inputSchema"]["properties"]["message"]["type"], "string");
    }

    #[tokio::test]
    async fn test_call_notify() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("custom")).unwrap();
        std::fs::write(temp_dir.path().join("custom/default.mp3"), b"ID3").unwrap();
        let server = server(temp_dir.path(), vec![]);

        let response = call(
            &server,
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": {"name": "notify", "arguments": {"message": "done"}}
            }),
        )
        .await;

        assert!(response.get("error").is_none());
        let content = &response["result"]["content"][0];
        assert_eq!(content["type"], "text");
        let text = content["text"].as_str().unwrap();
        assert!(text.contains("done"));
        assert!(text.contains("custom/default.mp3"));
    }

    #[tokio::test]
    async fn test_call_without_arguments() {
        let temp_dir = TempDir::new().unwrap();
        let server = server(temp_dir.path(), vec![]);

        let response = call(
            &server,
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": {"name": "notify"}
            }),
        )
        .await;

        assert_eq!(
            response["result"]["content"][0]["text"],
            "Notification sound played: system beep"
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let server = server(temp_dir.path(), vec![]);

        let response = call(
            &server,
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 5,
                "method": "tools/call",
                "params": {"name": "bogus", "arguments": {}}
            }),
        )
        .await;

        assert!(response.get("result").is_none());
        assert_eq!(response["id"], 5);
        assert_eq!(response["error"]["code"], JsonRpcError::INVALID_PARAMS);
        assert!(response["error"]["message"].as_str().unwrap().contains("bogus"));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let temp_dir = TempDir::new().unwrap();
        let server = server(temp_dir.path(), vec![]);

        let response = call(
            &server,
            serde_json::json!({"jsonrpc": "2.0", "id": 6, "method": "resources/list"}),
        )
        .await;

        assert_eq!(response["error"]["code"], JsonRpcError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_parse_error_and_notifications() {
        let temp_dir = TempDir::new().unwrap();
        let server = server(temp_dir.path(), vec![]);

        let response = server.handle_message("{not json").await.unwrap();
        assert_eq!(response.error.unwrap().code, JsonRpcError::PARSE_ERROR);
        assert!(response.id.is_null());

        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());

        let response = server.handle_message(r#"{"jsonrpc":"2.0","id":7}"#).await.unwrap();
        assert_eq!(response.error.unwrap().code, JsonRpcError::INVALID_REQUEST);
        assert_eq!(response.id, 7);
    }

    #[tokio::test]
    async fn test_serve_answers_each_line_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let server = server(temp_dir.path(), vec![]);

        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"bogus"}}"#,
            "\n",
        );

        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).await.unwrap();

        let responses: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["result"]["protocolVersion"], DEFAULT_PROTOCOL_VERSION);
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[2]["id"], 3);
        assert!(responses[2]["error"].is_object());
    }

    #[tokio::test]
    async fn test_serve_survives_invalid_utf8_line() {
        let temp_dir = TempDir::new().unwrap();
        let server = server(temp_dir.path(), vec![]);

        let mut input = Vec::new();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":1,"method":"ping","x":""#);
        input.push(0xff);
        input.extend_from_slice(b"\"}\n");
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#);
        input.extend_from_slice(b"\r\n");

        let mut output = Vec::new();
        server.serve(input.as_slice(), &mut output).await.unwrap();

        let responses: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], JsonRpcError::PARSE_ERROR);
        assert!(responses[0]["id"].is_null());
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["result"], serde_json::json!({}));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_notify_does_not_wait_for_player() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("notification.mp3"), b"ID3").unwrap();
        let server = server(temp_dir.path(), vec![PlayerCommand::new("sleep", ["3"])]);

        let started = Instant::now();
        let response = call(
            &server,
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 8,
                "method": "tools/call",
                "params": {"name": "notify", "arguments": {}}
            }),
        )
        .await;

        assert!(started.elapsed() < Duration::from_millis(200));
        assert_eq!(
            response["result"]["content"][0]["text"],
            "Notification sound played: notification.mp3"
        );
    }
}
