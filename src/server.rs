//! MCP server over newline-delimited JSON-RPC 2.0
//!
//! Requests are read one line at a time. `tools/call` runs in its own
//! task, everything else is answered inline. All replies go through one
//! channel to a writer task that owns the output stream, so overlapping
//! calls never interleave their frames.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use log::{debug, trace, error, info, warn};

use crate::adapter::Adapter;
use crate::tools::tool_definitions;

pub const SERVER_NAME: &str = "gpt5-mcp-server";
pub const SERVER_VERSION: &str = "1.0.0";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

const INSTRUCTIONS: &str
  = "MCP server for GPT-5 API integration - provides text generation and conversation tools";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

// ===== JSON-RPC Types =====

/// Keeps an explicit `null` id distinct from a missing one.
fn deserialize_present<'de, D>(deserializer: D)
  -> Result<Option<Value>, D::Error>
where
  D: Deserializer<'de>
{   Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest
{   /// Absent for notifications, `Some(Null)` when sent as `null`
    #[serde(default, deserialize_with = "deserialize_present")]
    pub id: Option<Value>
  , pub method: String
  , #[serde(default)]
    pub params: Value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError
{   pub code: i64
  , pub message: String
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse
{   pub jsonrpc: String
  , pub id: Value
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>
}

impl JsonRpcResponse
{   pub fn success(id: Value, result: Value) -> Self
    {   JsonRpcResponse
        {   jsonrpc: "2.0".to_string()
          , id
          , result: Some(result)
          , error: None
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>)
      -> Self
    {   JsonRpcResponse
        {   jsonrpc: "2.0".to_string()
          , id
          , result: None
          , error: Some(JsonRpcError
            {   code
              , message: message.into()
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallToolParams
{   name: String
  , #[serde(default)]
    arguments: Value
}

// ===== Server =====

/// Stdio-facing MCP server wrapping one [`Adapter`]
#[derive(Clone)]
pub struct McpServer
{   adapter: Adapter
}

impl McpServer
{   pub fn new(adapter: Adapter) -> Self
    {   McpServer
        {   adapter
        }
    }

    /// Serve until the reader hits EOF
    ///
    /// Returns once every in-flight tool call has been answered.
    pub async fn serve<R, W>(&self, mut reader: R, writer: W)
      -> std::io::Result<()>
    where
      R: AsyncBufRead + Unpin
    , W: AsyncWrite + Unpin + Send + 'static
    {   debug!("Starting MCP server loop");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel::<JsonRpcResponse>();
        let writer_task = tokio::spawn(run_writer_loop(reply_rx, writer));

        // Raw bytes, so a frame that is not UTF-8 gets a parse error
        // instead of ending the stream.
        let mut buf = Vec::new();
        loop
        {   buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0
            {   break;
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim();
            if line.is_empty()
            {   continue;
            }
            trace!("<- {}", line);
            self.handle_line(line, &reply_tx);
        }

        info!("Input closed, waiting for pending replies");
        drop(reply_tx);
        writer_task.await.map_err(|e| {
          std::io::Error::new(std::io::ErrorKind::Other, e)
        })?
    }

    fn handle_line(
      &self
    , line: &str
    , reply_tx: &mpsc::UnboundedSender<JsonRpcResponse>
    )
    {   let value: Value = match serde_json::from_str(line)
        {   Ok(v) => v
          , Err(e) => {
              warn!("Unparsable frame: {}", e);
              let _ = reply_tx.send(JsonRpcResponse::failure(
                Value::Null, PARSE_ERROR, format!("Parse error: {}", e)
              ));
              return;
            }
        };

        if !value.is_object()
        {   warn!("Frame is not a JSON object");
            let _ = reply_tx.send(JsonRpcResponse::failure(
              Value::Null, INVALID_REQUEST,
              "Invalid request: expected a JSON-RPC object"
            ));
            return;
        }

        let request: JsonRpcRequest = match serde_json::from_value(value.clone())
        {   Ok(r) => r
          , Err(e) => {
              // Replies from the client carry no method and need no answer.
              if let Some(id) = value.get("id").filter(|_| {
                value.get("result").is_none() && value.get("error").is_none()
              })
              {   let _ = reply_tx.send(JsonRpcResponse::failure(
                    id.clone(), INVALID_REQUEST,
                    format!("Invalid request: {}", e)
                  ));
              }
              return;
            }
        };

        let id = match request.id
        {   Some(id) => id
          , None => {
              debug!("Notification: {}", request.method);
              return;
            }
        };

        match request.method.as_str()
        {   "tools/call" => {
              let params: CallToolParams
                = match serde_json::from_value(request.params)
              {   Ok(p) => p
                , Err(e) => {
                    let _ = reply_tx.send(JsonRpcResponse::failure(
                      id, INVALID_PARAMS, format!("Invalid params: {}", e)
                    ));
                    return;
                  }
              };
              let adapter = self.adapter.clone();
              let reply_tx = reply_tx.clone();
              tokio::spawn(async move {
                let result = adapter
                  .dispatch(&params.name, params.arguments)
                  .await;
                let reply = match serde_json::to_value(&result)
                {   Ok(v) => JsonRpcResponse::success(id, v)
                  , Err(e) => JsonRpcResponse::failure(
                      id, INVALID_REQUEST, e.to_string()
                    )
                };
                let _ = reply_tx.send(reply);
              });
            }
          , method => {
              let reply = self.handle_method(id, method, &request.params);
              let _ = reply_tx.send(reply);
            }
        }
    }

    fn handle_method(&self, id: Value, method: &str, params: &Value)
      -> JsonRpcResponse
    {   match method
        {   "initialize" => {
              let version = params.get("protocolVersion")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_PROTOCOL_VERSION);
              debug!("Initializing with protocol {}", version);
              JsonRpcResponse::success(id, json!({
                "protocolVersion": version,
                "capabilities": { "tools": {} },
                "serverInfo": {
                  "name": SERVER_NAME,
                  "version": SERVER_VERSION
                },
                "instructions": INSTRUCTIONS
              }))
            }
          , "ping" => JsonRpcResponse::success(id, json!({}))
          , "tools/list" => JsonRpcResponse::success(id, json!({
              "tools": tool_definitions()
            }))
          , other => {
              warn!("Unknown method: {}", other);
              JsonRpcResponse::failure(
                id, METHOD_NOT_FOUND, format!("Method not found: {}", other)
              )
            }
        }
    }
}

/// Owns the output stream, one frame per line
async fn run_writer_loop<W>(
  mut reply_rx: mpsc::UnboundedReceiver<JsonRpcResponse>
, mut writer: W
) -> std::io::Result<()>
where
  W: AsyncWrite + Unpin
{   while let Some(reply) = reply_rx.recv().await
    {   let mut frame = serde_json::to_string(&reply)?;
        trace!("-> {}", frame);
        frame.push('\n');
        if let Err(e) = writer.write_all(frame.as_bytes()).await
        {   error!("Failed to write reply: {}", e);
            return Err(e);
        }
        writer.flush().await?;
    }
    debug!("Reply channel closed");
    writer.shutdown().await
}
