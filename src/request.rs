//! Tool argument and result types

use serde::{Deserialize, Deserializer, Serialize};
use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;

use crate::error::Error;

pub const DEFAULT_MAX_TOKENS: u32 = 1000;
/// Advertised in the tool schema only.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

fn default_max_tokens() -> u32 { DEFAULT_MAX_TOKENS }

/// Any JSON number, truncated; `null` falls back to the default.
fn deserialize_max_tokens<'de, D>(deserializer: D)
  -> Result<u32, D::Error>
where
  D: Deserializer<'de>
{   match Option::<f64>::deserialize(deserializer)?
    {   None => Ok(DEFAULT_MAX_TOKENS)
      , Some(n) if n.is_finite() && n >= 0.0 && n <= u32::MAX as f64 => {
          Ok(n.trunc() as u32)
        }
      , Some(n) => Err(D::Error::custom(format!(
          "max_tokens must be a non-negative number, got {}", n
        )))
    }
}

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   System
  , User
  , Assistant
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message
{   pub role: Role
  , pub content: String
}

impl Message
{   pub fn new(role: Role, content: impl Into<String>) -> Self
    {   Message
        {   role
          , content: content.into()
        }
    }

    pub fn system(content: impl Into<String>) -> Self
    {   Message::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self
    {   Message::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self
    {   Message::new(Role::Assistant, content)
    }
}

/// Arguments of `gpt5_generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest
{   #[serde(default)]
    pub prompt: Option<String>
  , #[serde(
      default = "default_max_tokens",
      deserialize_with = "deserialize_max_tokens"
    )]
    pub max_tokens: u32
  , /// Accepted for schema compatibility, never sent upstream
    #[serde(default)]
    pub temperature: Option<Value>
}

impl GenerateRequest
{   pub fn from_arguments(args: Value) -> Result<Self, Error>
    {   parse_arguments(args)
    }

    /// Single user turn built from the prompt
    pub fn messages(&self) -> Result<Vec<Message>, Error>
    {   match self.prompt.as_deref()
        {   Some(prompt) if !prompt.is_empty() => {
              Ok(vec![Message::user(prompt)])
            }
          , _ => Err(Error::Validation(
              "Prompt is required".to_string()
            ))
        }
    }
}

/// Arguments of `gpt5_messages`
///
/// `messages` stays untyped until [`ConversationRequest::messages`] so that
/// a missing field, a non-array and an empty array all report the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRequest
{   #[serde(default)]
    pub messages: Option<Value>
  , #[serde(
      default = "default_max_tokens",
      deserialize_with = "deserialize_max_tokens"
    )]
    pub max_tokens: u32
  , /// Accepted for schema compatibility, never sent upstream
    #[serde(default)]
    pub temperature: Option<Value>
  , #[serde(default)]
    pub system_prompt: Option<String>
}

impl ConversationRequest
{   pub fn from_arguments(args: Value) -> Result<Self, Error>
    {   parse_arguments(args)
    }

    /// Conversation turns, with the system prompt prepended when given
    pub fn messages(&self) -> Result<Vec<Message>, Error>
    {   let raw = match &self.messages
        {   Some(Value::Array(items)) if !items.is_empty() => items
          , _ => return Err(Error::Validation(
              "Messages array is required".to_string()
            ))
        };

        let mut messages = Vec::with_capacity(raw.len() + 1);
        if let Some(system) = self.system_prompt.as_deref()
        {   if !system.is_empty()
            {   messages.push(Message::system(system));
            }
        }
        for (i, item) in raw.iter().enumerate()
        {   let message = Message::deserialize(item).map_err(|e| {
              Error::Validation(format!("Invalid message at index {}: {}", i, e))
            })?;
            messages.push(message);
        }
        Ok(messages)
    }
}

/// Missing arguments behave like an empty object.
fn parse_arguments<T: DeserializeOwned>(args: Value)
  -> Result<T, Error>
{   let args = match args
    {   Value::Null => Value::Object(Default::default())
      , other => other
    };
    serde_json::from_value(args).map_err(|e| {
      Error::Validation(format!("Invalid arguments: {}", e))
    })
}

/// One block of tool output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent
{   Text
    {   text: String
    }
}

/// Output envelope shared by success and failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult
{   pub content: Vec<ToolContent>
}

impl ToolResult
{   pub fn text(text: impl Into<String>) -> Self
    {   ToolResult
        {   content: vec![ToolContent::Text { text: text.into() }]
        }
    }

    /// Text of the first content block
    pub fn first_text(&self) -> Option<&str>
    {   self.content.first().map(|c| match c
        {   ToolContent::Text { text } => text.as_str()
        })
    }
}
