use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};

use crate::config::AdapterConfig;
use crate::error::Error;
use crate::request::Message;

pub const MODEL: &str = "gpt-5";

/// GPT-5 rejects any other sampling temperature.
pub const REMOTE_TEMPERATURE: f64 = 1.0;

pub const EMPTY_RESPONSE_TEXT: &str = "No response from GPT-5";

// ===== Wire Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<Message>
  , /// GPT-5 uses `max_completion_tokens` instead of `max_tokens`
    pub max_completion_tokens: u32
  , pub temperature: f64
}

impl ChatCompletionRequest
{   pub fn new(messages: Vec<Message>, max_tokens: u32) -> Self
    {   ChatCompletionRequest
        {   model: MODEL.to_string()
          , messages
          , max_completion_tokens: max_tokens
          , temperature: REMOTE_TEMPERATURE
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse
{   #[serde(default)]
    pub choices: Option<Vec<Choice>>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   #[serde(default)]
    pub message: Option<ResponseMessage>
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub role: Option<String>
  , #[serde(default)]
    pub content: Option<String>
}

impl ChatCompletionResponse
{   /// Content of the first choice, or the placeholder when there is none
    pub fn into_text(self) -> String
    {   self.choices.unwrap_or_default()
          .into_iter()
          .next()
          .and_then(|c| c.message)
          .and_then(|m| m.content)
          .filter(|text| !text.is_empty())
          .unwrap_or_else(|| EMPTY_RESPONSE_TEXT.to_string())
    }
}

// ===== Client =====

/// Chat-completion client for the OpenAI API
#[derive(Clone)]
pub struct OpenAiClient
{   api_key: String
  , url: String
  , http_client: reqwest::Client
}

impl OpenAiClient
{   pub fn new(config: &AdapterConfig) -> Result<Self, Error>
    {   debug!("Creating OpenAiClient for {}", config.api_base());
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs
        {   builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(|e| {
          Error::InvalidConfiguration(e.to_string())
        })?;

        Ok(OpenAiClient
        {   api_key: config.api_key.clone()
          , url: config.completions_url()
          , http_client
        })
    }

    pub fn url(&self) -> &str
    {   &self.url
    }
}

#[async_trait]
impl super::ChatBackend for OpenAiClient
{   async fn complete(
      &self
    , messages: Vec<Message>
    , max_tokens: u32
    ) -> Result<String, Error>
    {   let request = ChatCompletionRequest::new(messages, max_tokens);
        debug!(
          "Sending {} messages to {}",
          request.messages.len(), self.url
        );
        trace!("Chat request: {:?}", request);

        let response = self.http_client
          .post(&self.url)
          .header("Authorization", format!("Bearer {}", self.api_key))
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            Error::from(e)
          })?;

        let status = response.status();
        trace!("Chat response status: {}", status);

        let body = response.text().await.map_err(|e| {
          error!("Failed to read response body: {}", e);
          Error::from(e)
        })?;

        if !status.is_success()
        {   error!("GPT-5 API error ({}): {}", status.as_u16(), body);
            return Err(Error::RemoteApi
            {   status: status.as_u16()
              , body
            });
        }

        let chat_response: ChatCompletionResponse
          = serde_json::from_str(&body).map_err(|e| {
            error!("Parse error: {}", e);
            Error::Transport(format!("invalid response body: {}", e))
          })?;

        Ok(chat_response.into_text())
    }
}
