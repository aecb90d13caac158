//! Message handler: prompt assembly and token relay

use log::{debug, trace, error};
use crate::config::GenerationSettings;
use crate::providers::{CompletionProvider, StreamEvent};
use crate::request::PromptRecord;
use crate::session::SessionContext;
use crate::sink::{Message, MessageSink};

/// Per-message lifecycle, strictly linear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase
{   Idle
  , SettingsLoaded
  , PromptBuilt
  , Streaming
  , Completed
}

fn enter(phase: Phase)
{   debug!("Relay phase: {:?}", phase);
}

/// Relays one provider stream per user message
pub struct Relay<P>
{   provider: P
}

impl<P: CompletionProvider> Relay<P>
{   pub fn new(provider: P) -> Self
    {   Relay
        {   provider
        }
    }

    /// Load the fixed generation settings into the session.
    pub fn on_session_start<'a>(
      &self
    , session: &'a mut SessionContext
    ) -> &'a GenerationSettings
    {   debug!("Session start");
        session.store_settings(GenerationSettings::default())
    }

    /// Handle one user message.
    ///
    /// Tokens reach `sink` as they arrive. On success the sink is
    /// finalized with the full text and the audit record, and the same
    /// message is returned. Provider failures propagate unchanged; text
    /// already appended stays in the sink and no record is produced.
    pub async fn on_message<S: MessageSink + ?Sized>(
      &self
    , session: &SessionContext
    , user_text: &str
    , sink: &mut S
    ) -> Result<Message, crate::error::Error>
    {   enter(Phase::Idle);
        debug!("Received message: {}", user_text);

        let settings = session.settings().map_err(|e| {
          error!("Message received before session start");
          e
        })?;
        enter(Phase::SettingsLoaded);

        let mut prompt = PromptRecord::build(
          self.provider.id(),
          user_text,
          settings
        );
        let wire_messages = prompt.to_openai();
        debug!("Prompt messages: {:?}", wire_messages);
        enter(Phase::PromptBuilt);

        let mut increments = self.provider
          .open_stream(wire_messages, settings)
          .map_err(|e| {
            error!("Failed to open stream: {}", e);
            e
          })?;
        enter(Phase::Streaming);

        let mut message = Message::new();
        loop
        { match increments.recv().await
          {   Some(Ok(StreamEvent::Delta(fragment))) => {
                let token = fragment.unwrap_or_default();
                trace!("Increment: {:?}", token);
                message.stream_token(&token, &mut *sink)?;
              }
            , Some(Ok(StreamEvent::Done)) => {
                break;
              }
            , Some(Err(e)) => {
                error!("Provider stream failed: {}", e);
                return Err(e);
              }
            , None => {
                error!("Provider stream closed without end signal");
                return Err(crate::error::Error::StreamClosed);
              }
          }
        }

        prompt.set_completion(message.content.clone());
        message.prompt = Some(prompt);
        sink.finalize(&message)?;
        enter(Phase::Completed);

        Ok(message)
    }
}
