use std::time::Duration;
use serde::Serialize;
use serde_json::Value;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use log::{debug, trace, error};

use crate::config::{GenerationSettings, ProviderConfig};
use crate::error::Error;
use super::sse::SseDecoder;
use super::{ChatMessage, CompletionProvider, IncrementReceiver,
  IncrementSender, StreamEvent};

pub const PROVIDER_ID: &str = "openai-chat";
const DONE_SENTINEL: &str = "[DONE]";

// ===== Message Types =====

#[derive(Debug, Clone, Serialize)]
pub struct OpenAiChatRequest
{   pub messages: Vec<ChatMessage>
  , #[serde(flatten)]
    pub settings: GenerationSettings
  , pub stream: bool
}

/// Error carried inside a streamed envelope, if any.
fn envelope_error(envelope: &Value) -> Option<String>
{   let err = envelope.get("error")?;
    match err
    {   Value::Null => None
      , Value::String(message) => Some(message.clone())
      , _ => {
          let message = err.get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
          Some(match err.get("type").and_then(Value::as_str)
          {   Some(kind) => format!("{}: {}", kind, message)
            , None => message.to_string()
          })
        }
    }
}

/// Parse one SSE data payload into a stream event.
///
/// Only a payload that is not JSON at all is an error. Any JSON
/// without a string at `choices[0].delta.content` is an empty increment.
pub fn parse_event(data: &str) -> Result<StreamEvent, Error>
{   if data.trim() == DONE_SENTINEL
    {   return Ok(StreamEvent::Done);
    }

    let envelope: Value = serde_json::from_str(data)
      .map_err(|e| {
        error!("Malformed stream chunk: {}", e);
        Error::ParseError(e.to_string())
      })?;

    if let Some(message) = envelope_error(&envelope)
    {   error!("OpenAI stream error: {}", message);
        return Err(Error::ApiError(message));
    }

    if let Some(reason) = envelope
      .pointer("/choices/0/finish_reason")
      .and_then(Value::as_str)
    {   debug!("Finish reason: {}", reason);
    }

    Ok(StreamEvent::Delta(
      envelope
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .map(str::to_string)
    ))
}

// ===== OpenAI Client =====

/// Streaming client for the OpenAI chat-completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiClient
{   config: ProviderConfig
  , http_client: reqwest::Client
}

impl OpenAiClient
{   pub fn new(config: ProviderConfig) -> Result<Self, Error>
    {   debug!("Creating OpenAiClient for {}", config.api_base);
        let http_client = reqwest::Client::builder()
          .connect_timeout(Duration::from_secs(
            config.connect_timeout_secs
          ))
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::InvalidConfiguration(e.to_string())
          })?;
        Ok(OpenAiClient
        {   config
          , http_client
        })
    }

    pub fn from_env() -> Result<Self, Error>
    {   OpenAiClient::new(ProviderConfig::from_env())
    }
}

impl CompletionProvider for OpenAiClient
{   fn id(&self) -> &str
    {   PROVIDER_ID
    }

    fn open_stream(
      &self
    , messages: Vec<ChatMessage>
    , settings: &GenerationSettings
    ) -> Result<IncrementReceiver, Error>
    {   let api_key = self.config.api_key.clone()
          .ok_or_else(|| {
            error!("No API key configured");
            Error::MissingApiKey(PROVIDER_ID.to_string())
          })?;

        let request = OpenAiChatRequest
        {   messages
          , settings: settings.clone()
          , stream: true
        };
        trace!("OpenAI request: {:?}", request);

        let (tx, rx) = mpsc::unbounded_channel();
        let http_client = self.http_client.clone();
        let url = self.config.completions_url();
        let organization = self.config.organization.clone();

        tokio::spawn(async move {
          let exchange = StreamExchange
          {   http_client
            , url
            , api_key
            , organization
          };
          if let Err(e) = exchange.run(request, &tx).await
          {   let _ = tx.send(Err(e));
          }
        });

        Ok(rx)
    }
}

/// One in-flight streaming request, owned by its spawned task
struct StreamExchange
{   http_client: reqwest::Client
  , url: String
  , api_key: String
  , organization: Option<String>
}

impl StreamExchange
{   async fn run(
      self
    , request: OpenAiChatRequest
    , tx: &IncrementSender
    ) -> Result<(), Error>
    {   debug!("Opening stream to {}", self.url);

        let mut builder = self.http_client
          .post(&self.url)
          .bearer_auth(&self.api_key)
          .header("Accept", "text/event-stream")
          .json(&request);
        if let Some(org) = &self.organization
        {   builder = builder.header("OpenAI-Organization", org);
        }

        let response = builder
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            Error::HttpError(e.to_string())
          })?;

        let status = response.status();
        trace!("OpenAI response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("OpenAI API error {}: {}", status, error_text);
            return Err(match status.as_u16()
            {   401 | 403 => Error::AuthenticationFailed(error_text)
              , 429 => Error::RateLimitExceeded
              , _ => Error::ApiError(
                  format!("{}: {}", status, error_text)
                )
            });
        }

        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        let mut increments = 0usize;

        while let Some(chunk) = body.next().await
        {   let chunk = chunk.map_err(|e| {
              error!("Stream read error: {}", e);
              Error::HttpError(e.to_string())
            })?;
            for data in decoder.feed(&chunk)?
            {   if !forward(parse_event(&data)?, tx, &mut increments)
                {   return Ok(());
                }
            }
        }

        if let Some(data) = decoder.finish()?
        {   if !forward(parse_event(&data)?, tx, &mut increments)
            {   return Ok(());
            }
        }

        debug!(
          "Stream ended without [DONE] after {} increments",
          increments
        );
        let _ = tx.send(Ok(StreamEvent::Done));
        Ok(())
    }
}

/// Push one event downstream. Returns false once the exchange is over,
/// either because the provider finished or the receiver went away.
fn forward(
  event: StreamEvent
, tx: &IncrementSender
, increments: &mut usize
) -> bool
{   let done = event == StreamEvent::Done;
    if done
    {   debug!("Stream finished after {} increments", increments);
    } else
    {   *increments += 1;
    }

    if tx.send(Ok(event)).is_err()
    {   debug!("Increment receiver dropped; abandoning stream");
        return false;
    }
    !done
}
