//! Completion provider implementations

pub mod openai;
pub mod sse;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use crate::config::GenerationSettings;

// Re-export for convenience
pub use openai::OpenAiClient;

/// One `{role, content}` pair in the provider's request shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: crate::Role
  , pub content: String
}

/// Item delivered on an increment channel
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent
{   /// One increment; `None` when the provider sent no text
    Delta(Option<String>)
  , /// Provider signalled end of stream
    Done
}

pub type IncrementItem = Result<StreamEvent, crate::error::Error>;
pub type IncrementSender = mpsc::UnboundedSender<IncrementItem>;
pub type IncrementReceiver = mpsc::UnboundedReceiver<IncrementItem>;

/// A chat-completion backend that delivers its answer incrementally.
///
/// `open_stream` returns immediately with the receiving end of a channel;
/// the exchange itself runs on a spawned task. The channel yields
/// `Delta` items, then exactly one terminal item: `Ok(Done)` or `Err(_)`.
/// Dropping the receiver asks the producer to stop.
pub trait CompletionProvider
{   /// Identifier recorded in the prompt audit record
    fn id(&self) -> &str;

    fn open_stream(
      &self
    , messages: Vec<ChatMessage>
    , settings: &GenerationSettings
    ) -> Result<IncrementReceiver, crate::error::Error>;
}
