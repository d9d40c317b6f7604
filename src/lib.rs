//! gpt5-mcp: an MCP server exposing GPT-5 as two tools
//!
//! ```text
//! gpt5-mcp/
//! ├── src/
//! │   ├── lib.rs          # Re-exports and wiring
//! │   ├── main.rs         # Binary entry point
//! │   ├── error.rs        # Error taxonomy
//! │   ├── config.rs       # Startup configuration
//! │   ├── request.rs      # Tool arguments and results
//! │   ├── adapter.rs      # Tool dispatch and in-band errors
//! │   ├── tools.rs        # Tool declarations
//! │   ├── server.rs       # JSON-RPC stdio loop
//! │   └── providers/
//! │       ├── mod.rs      # ChatBackend trait
//! │       └── openai.rs   # Chat-completion client
//! └── tests/
//! ```
//!
//! `gpt5_generate` sends one prompt, `gpt5_messages` sends a whole
//! conversation. Each call is one POST to the chat-completion endpoint,
//! and any failure is returned as `"Error: ..."` text rather than a
//! protocol error.

pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod adapter;
pub mod tools;
pub mod server;

use std::sync::Arc;
use log::debug;

pub use adapter::Adapter;
pub use config::AdapterConfig;
pub use error::Error;
pub use providers::{ChatBackend, OpenAiClient};
pub use request::{Message, Role, ToolContent, ToolResult};
pub use server::McpServer;

/// Build a ready-to-serve server from validated configuration
pub fn build_server(config: &AdapterConfig)
  -> Result<McpServer, Error>
{   debug!("Wiring server");
    let client = OpenAiClient::new(config)?;
    Ok(McpServer::new(Adapter::new(Arc::new(client))))
}
