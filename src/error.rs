use std::fmt;

/// Custom error type for relay operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Message handling began before the session stored its settings
    MissingSettings
  , /// API key is missing for a provider
    MissingApiKey(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// HTTP transport error (connect, send, body read)
    HttpError(String)
  , /// Provider rejected the credentials
    AuthenticationFailed(String)
  , /// Rate limit exceeded
    RateLimitExceeded
  , /// API returned an error response
    ApiError(String)
  , /// Failed to parse a streamed envelope
    ParseError(String)
  , /// Increment channel closed without an end-of-stream signal
    StreamClosed
  , /// The output sink's consumer went away
    SinkClosed
  , /// Generic error
    Other(String)
}

impl Error
{   /// True for failures raised while opening or reading the provider stream.
    pub fn is_transport(&self) -> bool
    {   matches!(
          self
        , Error::MissingApiKey(_)
          | Error::HttpError(_)
          | Error::AuthenticationFailed(_)
          | Error::RateLimitExceeded
          | Error::ApiError(_)
          | Error::ParseError(_)
          | Error::StreamClosed
        )
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingSettings => {
              write!(f,
                "Session settings not loaded; start the session first"
              )
            }
          , Error::MissingApiKey(provider) => {
              write!(f, "Missing API key for: {}", provider)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::AuthenticationFailed(msg) => {
              write!(f, "Authentication failed: {}", msg)
            }
          , Error::RateLimitExceeded => {
              write!(f, "API rate limit exceeded")
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::StreamClosed => {
              write!(f,
                "Completion stream closed before end-of-stream"
              )
            }
          , Error::SinkClosed => {
              write!(f, "Output sink closed")
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
