#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use chatrelay::providers::{ChatMessage, CompletionProvider,
  IncrementItem, IncrementReceiver, StreamEvent};
use chatrelay::{Error, GenerationSettings, Message, MessageSink};

/// What a scripted provider was asked to send
#[derive(Debug, Clone)]
pub struct OpenedStream
{   pub messages: Vec<ChatMessage>
  , pub settings: GenerationSettings
}

/// Provider that replays a fixed list of channel items
#[derive(Clone)]
pub struct ScriptedProvider
{   script: Vec<IncrementItem>
  , open_error: Option<Error>
  , pub opened: Arc<Mutex<Vec<OpenedStream>>>
}

impl ScriptedProvider
{   pub fn new(script: Vec<IncrementItem>) -> Self
    {   ScriptedProvider
        {   script
          , open_error: None
          , opened: Arc::new(Mutex::new(Vec::new()))
        }
    }

    /// Deltas from `fragments`, then `Done`
    pub fn from_fragments(fragments: &[Option<&str>]) -> Self
    {   let mut script: Vec<IncrementItem> = fragments
          .iter()
          .map(|f| Ok(StreamEvent::Delta(f.map(str::to_string))))
          .collect();
        script.push(Ok(StreamEvent::Done));
        ScriptedProvider::new(script)
    }

    pub fn failing_open(error: Error) -> Self
    {   ScriptedProvider
        {   open_error: Some(error)
          , ..ScriptedProvider::new(vec![])
        }
    }

    pub fn open_count(&self) -> usize
    {   self.opened.lock().unwrap().len()
    }
}

impl CompletionProvider for ScriptedProvider
{   fn id(&self) -> &str
    {   "scripted"
    }

    fn open_stream(
      &self
    , messages: Vec<ChatMessage>
    , settings: &GenerationSettings
    ) -> Result<IncrementReceiver, Error>
    {   self.opened.lock().unwrap().push(OpenedStream
        {   messages
          , settings: settings.clone()
        });
        if let Some(e) = &self.open_error
        {   return Err(e.clone());
        }
        let (tx, rx) = mpsc::unbounded_channel();
        for item in self.script.clone()
        {   tx.send(item).unwrap();
        }
        Ok(rx)
    }
}

/// Sink that records what a viewer would see after every append
#[derive(Debug, Default)]
pub struct RecordingSink
{   pub visible: String
  , pub snapshots: Vec<String>
  , pub finalized: Option<Message>
  , pub finalize_calls: usize
}

impl MessageSink for RecordingSink
{   fn append(&mut self, fragment: &str) -> Result<(), Error>
    {   assert!(self.finalized.is_none(), "append after finalize");
        self.visible.push_str(fragment);
        self.snapshots.push(self.visible.clone());
        Ok(())
    }

    fn finalize(&mut self, message: &Message) -> Result<(), Error>
    {   self.finalize_calls += 1;
        self.finalized = Some(message.clone());
        Ok(())
    }
}
