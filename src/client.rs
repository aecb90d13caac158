use tokio::sync::mpsc;
use log::{debug, error, info};
use crate::providers::CompletionProvider;
use crate::relay::Relay;
use crate::session::SessionContext;
use crate::sink::{ChannelSink, SinkEvent};
use crate::ChatFoot;

/// Backend state for one chat session
pub struct ChatBackendState<P>
{   pub session: SessionContext
  , pub relay: Relay<P>
}

impl<P: CompletionProvider> ChatBackendState<P>
{   pub fn new(provider: P) -> Self
    {   debug!("Initializing ChatBackendState");
        ChatBackendState
        {   session: SessionContext::new()
          , relay: Relay::new(provider)
        }
    }
}

/// Public API for one chat session - owns the task
pub struct ChatBackend
{   hand: crate::ChatHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl ChatBackend
{   /// Create and spawn a new session backend
    /// Returns immediately - spawns background task
    pub fn new<P>(provider: P) -> Self
    where P: CompletionProvider + Send + Sync + 'static
    {   debug!("Creating ChatBackend with task ownership");

        let (start_session_tx, start_session_rx)
          = mpsc::unbounded_channel();
        let (send_message_tx, send_message_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::ChatHand
        {   start_session_tx
          , send_message_tx
          , kill_process_tx
        };

        let foot = crate::ChatFoot
        {   start_session_rx
          , send_message_rx
          , kill_process_rx
        };

        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, provider).await
        });

        ChatBackend
        {   hand
          , _task_handle
        }
    }

    /// Start the session and wait for its settings
    pub async fn start_session(&self)
      -> crate::StartSessionReply
    {   debug!("start_session queuing command");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        self.hand.start_session_tx
          .send(crate::StartSessionArgs { reply: reply_tx })
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::Other(
              "Backend disconnected".to_string()
            )
          })?;

        reply_rx.recv().await.unwrap_or_else(|| {
          error!("Backend dropped start_session reply");
          Err(crate::error::Error::Other(
            "Backend disconnected".to_string()
          ))
        })
    }

    /// Send a user message - returns almost immediately.
    ///
    /// The receiver yields `Token` events as the reply streams in,
    /// then one `Finalized` or `Failed`.
    pub async fn send_message(
      &self
    , text: String
    ) -> Result<
        mpsc::UnboundedReceiver<SinkEvent>,
        crate::error::Error
      >
    {   debug!("send_message queuing {} bytes", text.len());
        let (events_tx, events_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::SendMessageArgs
        {   text
          , events: events_tx
        };

        self.hand.send_message_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::Other(
              "Backend disconnected".to_string()
            )
          })?;

        Ok(events_rx)
    }

    /// Gracefully shutdown the backend
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down ChatBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::KillProcessArgs
        {   reply: reply_tx
        };

        self.hand.kill_process_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::Other(
              "Backend already shutdown".to_string()
            )
          })?;

        // Wait for shutdown confirmation
        if let Some(result) = reply_rx.recv().await
        {   debug!("Backend shutdown confirmed");
            result
        } else
        {   error!("Backend dropped shutdown reply");
            Err(crate::error::Error::Other(
              "Backend disconnected".to_string()
            ))
        }
    }
}

/// Main backend event loop
///
/// Messages are handled one at a time, in arrival order: the
/// SendMessage arm runs the whole exchange before the next select.
/// Polling is biased so queued messages drain before a shutdown.
async fn run_backend_loop<P: CompletionProvider>(
  foot: crate::ChatFoot
, provider: P
)
{   debug!("Starting ChatBackend event loop");
    let mut state = ChatBackendState::new(provider);
    let ChatFoot
    {   mut start_session_rx
      , mut send_message_rx
      , mut kill_process_rx
    } = foot;

    loop
    { tokio::select!
      { biased;
        Some(cmd) = start_session_rx.recv() => {
          debug!("Received StartSession");
          let settings = state.relay
            .on_session_start(&mut state.session)
            .clone();
          let _ = cmd.reply.send(Ok(settings));
        }
      , Some(cmd) = send_message_rx.recv() => {
          debug!("Received SendMessage");
          let mut sink = ChannelSink::new(cmd.events.clone());
          match state.relay
            .on_message(&state.session, &cmd.text, &mut sink)
            .await
          {   Ok(message) => {
                if let Some(prompt) = &message.prompt
                {   match serde_json::to_string(prompt)
                    {   Ok(audit) => debug!("Prompt audit: {}", audit)
                      , Err(e) => error!("Audit encode failed: {}", e)
                    }
                }
              }
            , Err(e) => {
                error!("Message failed: {}", e);
                let _ = cmd.events.send(SinkEvent::Failed(e));
              }
          }
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess");
          while let Ok(pending) = send_message_rx.try_recv()
          {   debug!("Failing message queued behind shutdown");
              let _ = pending.events.send(SinkEvent::Failed(
                crate::error::Error::Other(
                  "Backend shutdown".to_string()
                )
              ));
          }
          let _ = cmd.reply.send(Ok(()));
          info!("ChatBackend shutting down");
          break;
        }
      , else => {
          debug!("All command channels closed");
          break;
        }
      }
    }
}
