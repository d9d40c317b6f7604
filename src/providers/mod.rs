//! Remote chat-completion backends

pub mod openai;

use async_trait::async_trait;

use crate::error::Error;
use crate::request::Message;

// Re-export for convenience
pub use openai::OpenAiClient;

/// One outbound completion call
///
/// Takes no temperature: the value sent upstream is fixed by the
/// implementation, whatever the caller asked for.
#[async_trait]
pub trait ChatBackend: Send + Sync
{   async fn complete(
      &self
    , messages: Vec<Message>
    , max_tokens: u32
    ) -> Result<String, Error>;
}
