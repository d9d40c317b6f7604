//! Tool declarations returned by `tools/list`

use serde_json::{json, Value};

use crate::request::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

pub const TOOL_GENERATE: &str = "gpt5_generate";
pub const TOOL_MESSAGES: &str = "gpt5_messages";

fn max_tokens_schema() -> Value
{   json!({
      "type": "number",
      "description": "Maximum number of tokens to generate (default: 1000)",
      "default": DEFAULT_MAX_TOKENS
    })
}

fn temperature_schema() -> Value
{   json!({
      "type": "number",
      "description": "Sampling temperature (0-2, default: 0.7)",
      "default": DEFAULT_TEMPERATURE
    })
}

pub fn generate_schema() -> Value
{   json!({
      "type": "object",
      "properties": {
        "prompt": {
          "type": "string",
          "description": "The prompt to send to GPT-5"
        },
        "max_tokens": max_tokens_schema(),
        "temperature": temperature_schema()
      },
      "required": ["prompt"]
    })
}

pub fn messages_schema() -> Value
{   json!({
      "type": "object",
      "properties": {
        "messages": {
          "type": "array",
          "description": "Array of message objects with role and content",
          "items": {
            "type": "object",
            "properties": {
              "role": {
                "type": "string",
                "enum": ["system", "user", "assistant"],
                "description": "The role of the message sender"
              },
              "content": {
                "type": "string",
                "description": "The content of the message"
              }
            },
            "required": ["role", "content"]
          }
        },
        "max_tokens": max_tokens_schema(),
        "temperature": temperature_schema(),
        "system_prompt": {
          "type": "string",
          "description": "Optional system prompt to prepend to messages"
        }
      },
      "required": ["messages"]
    })
}

pub fn tool_definitions() -> Vec<Value>
{   vec![
      json!({
        "name": TOOL_GENERATE,
        "description": "Generate text using GPT-5 with a simple prompt",
        "inputSchema": generate_schema()
      }),
      json!({
        "name": TOOL_MESSAGES,
        "description": "Send a conversation with multiple messages to GPT-5",
        "inputSchema": messages_schema()
      }),
    ]
}
