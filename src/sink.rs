//! Output sink and the outgoing message it displays

use serde::Serialize;
use log::{debug, trace};
use crate::request::PromptRecord;

/// Live output surface for one message.
///
/// `append` is called once per increment, in arrival order.
/// `finalize` is called at most once, after the last `append`;
/// it is skipped when the exchange fails.
pub trait MessageSink
{   fn append(&mut self, fragment: &str)
      -> Result<(), crate::error::Error>;

    fn finalize(&mut self, message: &Message)
      -> Result<(), crate::error::Error>;
}

/// Outgoing assistant message
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Message
{   /// Text streamed so far
    pub content: String
  , /// Audit record, attached once the stream is drained
    pub prompt: Option<PromptRecord>
}

impl Message
{   pub fn new() -> Self
    {   Message::default()
    }

    /// Append a token to the content and forward it to the sink.
    pub fn stream_token<S: MessageSink + ?Sized>(
      &mut self
    , token: &str
    , sink: &mut S
    ) -> Result<(), crate::error::Error>
    {   trace!("Streaming token ({} bytes)", token.len());
        self.content.push_str(token);
        sink.append(token)
    }
}

/// What a [`ChannelSink`] reports to its consumer
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent
{   /// One streamed fragment
    Token(String)
  , /// Message complete; carries the audit record
    Finalized(Message)
  , /// Exchange failed; text already streamed stays visible
    Failed(crate::error::Error)
}

/// Sink that forwards fragments over an unbounded channel.
/// A dropped receiver surfaces as [`crate::error::Error::SinkClosed`].
pub struct ChannelSink
{   tx: crate::SinkEventSender
  , finalized: bool
}

impl ChannelSink
{   pub fn new(tx: crate::SinkEventSender) -> Self
    {   ChannelSink
        {   tx
          , finalized: false
        }
    }

    pub fn is_finalized(&self) -> bool
    {   self.finalized
    }

    fn send(&self, event: SinkEvent)
      -> Result<(), crate::error::Error>
    {   self.tx.send(event).map_err(|_| {
          debug!("Sink receiver dropped");
          crate::error::Error::SinkClosed
        })
    }
}

impl MessageSink for ChannelSink
{   fn append(&mut self, fragment: &str)
      -> Result<(), crate::error::Error>
    {   if self.finalized
        {   return Err(crate::error::Error::Other(
              "append after finalize".to_string()
            ));
        }
        self.send(SinkEvent::Token(fragment.to_string()))
    }

    fn finalize(&mut self, message: &Message)
      -> Result<(), crate::error::Error>
    {   if self.finalized
        {   return Err(crate::error::Error::Other(
              "message already finalized".to_string()
            ));
        }
        self.finalized = true;
        self.send(SinkEvent::Finalized(message.clone()))
    }
}
