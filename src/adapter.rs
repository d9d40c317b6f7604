use std::sync::Arc;

use serde_json::Value;
use log::{debug, trace, error};

use crate::error::Error;
use crate::providers::ChatBackend;
use crate::request::{ConversationRequest, GenerateRequest, ToolResult};
use crate::tools::{TOOL_GENERATE, TOOL_MESSAGES};

/// Maps tool calls onto single chat-completion requests
///
/// Holds nothing but the backend handle, each call stands alone.
#[derive(Clone)]
pub struct Adapter
{   backend: Arc<dyn ChatBackend>
}

impl Adapter
{   pub fn new(backend: Arc<dyn ChatBackend>) -> Self
    {   Adapter
        {   backend
        }
    }

    /// `gpt5_generate`: one prompt, one user turn
    pub async fn generate(&self, args: Value)
      -> Result<ToolResult, Error>
    {   let request = GenerateRequest::from_arguments(args)?;
        let messages = request.messages()?;
        debug!("generate with max_tokens={}", request.max_tokens);
        trace!(
          "Ignoring requested temperature {:?}",
          request.temperature
        );

        let text = self.backend
          .complete(messages, request.max_tokens)
          .await?;
        Ok(ToolResult::text(text))
    }

    /// `gpt5_messages`: a full conversation, optional system prompt first
    pub async fn converse(&self, args: Value)
      -> Result<ToolResult, Error>
    {   let request = ConversationRequest::from_arguments(args)?;
        let messages = request.messages()?;
        debug!(
          "converse with {} messages, max_tokens={}",
          messages.len(), request.max_tokens
        );
        trace!(
          "Ignoring requested temperature {:?}",
          request.temperature
        );

        let text = self.backend
          .complete(messages, request.max_tokens)
          .await?;
        Ok(ToolResult::text(text))
    }

    /// Route a tool call by name
    ///
    /// Never fails: every error comes back as text content.
    pub async fn dispatch(&self, name: &str, args: Value)
      -> ToolResult
    {   debug!("Dispatching tool call: {}", name);
        let result = match name
        {   TOOL_GENERATE => self.generate(args).await
          , TOOL_MESSAGES => self.converse(args).await
          , other => Err(Error::UnknownOperation(other.to_string()))
        };

        result.unwrap_or_else(|e| Self::error_result(&e))
    }

    /// In-band rendering of a failed call
    pub fn error_result(err: &Error) -> ToolResult
    {   error!("Tool call failed: {}", err);
        ToolResult::text(format!("Error: {}", err))
    }
}
