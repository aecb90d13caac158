pub mod error;
pub mod config;
pub mod prompts;
pub mod request;
pub mod providers;
pub mod sink;
pub mod session;
pub mod relay;
pub mod client;
use serde::{Deserialize, Serialize};

pub use client::ChatBackend;
pub use config::{GenerationSettings, ProviderConfig};
pub use error::Error;
pub use relay::Relay;
pub use request::{PromptMessage, PromptRecord};
pub use session::SessionContext;
pub use sink::{ChannelSink, Message, MessageSink, SinkEvent};

/*

chatrelay: an async-only streaming chat relay.

One user message in, one fixed two-message prompt out to a chat
completion provider, tokens relayed to the caller's sink as they
arrive, and the exact prompt/completion pair attached to the final
message for auditing.

chatrelay/
├── Cargo.toml
├── prompts/            # system.txt, user.txt (compiled in)
├── src/
│   ├── lib.rs          # Re-exports and backend channel API
│   ├── error.rs        # Error type
│   ├── config.rs       # GenerationSettings, ProviderConfig
│   ├── prompts.rs      # Templates and placeholder rendering
│   ├── request.rs      # PromptMessage, PromptRecord
│   ├── sink.rs         # Output sink trait and outgoing Message
│   ├── session.rs      # Per-session context
│   ├── relay.rs        # on_session_start / on_message
│   ├── client.rs       # Session backend task
│   ├── providers/
│   │   ├── mod.rs      # CompletionProvider trait, StreamEvent
│   │   ├── sse.rs      # text/event-stream decoding
│   │   └── openai.rs   # OpenAI chat completions
│   └── main.rs         # Terminal front-end
└── tests/

*/

/// CHATRELAY BACKEND INTERFACE:

// ===== StartSession =====

pub type StartSessionReply = Result<GenerationSettings, crate::error::Error>;
pub type StartSessionReplySender
  = tokio::sync::mpsc::UnboundedSender<StartSessionReply>;

pub struct StartSessionArgs
{   pub reply: StartSessionReplySender
}

// ===== SendMessage =====

pub type SinkEventSender
  = tokio::sync::mpsc::UnboundedSender<crate::SinkEvent>;

pub struct SendMessageArgs
{   pub text: String
  , pub events: SinkEventSender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== ChatHand (sender side) =====

pub struct ChatHand
{   pub start_session_tx
      : tokio::sync::mpsc::UnboundedSender<StartSessionArgs>
  , pub send_message_tx
      : tokio::sync::mpsc::UnboundedSender<SendMessageArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== ChatFoot (receiver side) =====

pub struct ChatFoot
{   pub start_session_rx
      : tokio::sync::mpsc::UnboundedReceiver<StartSessionArgs>
  , pub send_message_rx
      : tokio::sync::mpsc::UnboundedReceiver<SendMessageArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}

/// CHATRELAY STRUCTURES:

/// Author of a prompt message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   /// Persona / instructions
    System
  , /// End user
    User
}
