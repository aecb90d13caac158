//! Generation settings and provider configuration

use serde::{Deserialize, Serialize};
use log::{debug, warn};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Generation parameters sent with every completion request.
/// Built once at session start and read-only afterwards.
/// Field names match the provider's wire names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings
{   /// Model identifier
    pub model: String
  , /// Sampling temperature
    pub temperature: f32
  , /// Maximum output length, in tokens
    pub max_tokens: u32
  , /// Nucleus sampling cutoff
    pub top_p: f32
  , pub frequency_penalty: f32
  , pub presence_penalty: f32
}

impl Default for GenerationSettings
{   fn default() -> Self
    {   GenerationSettings
        {   model: DEFAULT_MODEL.to_string()
          , temperature: 0.0
          , max_tokens: 500
          , top_p: 1.0
          , frequency_penalty: 0.0
          , presence_penalty: 0.0
        }
    }
}

/// Completion provider endpoint and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// API base URL, without the trailing endpoint path
    pub api_base: String
  , /// Bearer token
    pub api_key: Option<String>
  , /// Optional organization header
    pub organization: Option<String>
  , /// TCP connect timeout in seconds.
    /// No total timeout is applied; streams may run long.
    pub connect_timeout_secs: u64
}

impl Default for ProviderConfig
{   fn default() -> Self
    {   ProviderConfig
        {   api_base: DEFAULT_API_BASE.to_string()
          , api_key: None
          , organization: None
          , connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS
        }
    }
}

impl ProviderConfig
{   /// Read the provider configuration from the process environment.
    ///
    /// | Variable                      | Default                     |
    /// |-------------------------------|-----------------------------|
    /// | `OPENAI_API_KEY`              | unset                       |
    /// | `OPENAI_BASE_URL`             | `https://api.openai.com/v1` |
    /// | `OPENAI_ORG_ID`               | unset                       |
    /// | `OPENAI_CONNECT_TIMEOUT_SECS` | `10`                        |
    pub fn from_env() -> Self
    {   let defaults = ProviderConfig::default();
        let api_base = std::env::var("OPENAI_BASE_URL")
          .ok()
          .filter(|v| !v.trim().is_empty())
          .unwrap_or(defaults.api_base);
        let api_key = std::env::var("OPENAI_API_KEY")
          .ok()
          .filter(|v| !v.trim().is_empty());
        let organization = std::env::var("OPENAI_ORG_ID")
          .ok()
          .filter(|v| !v.trim().is_empty());
        let connect_timeout_secs
          = match std::env::var("OPENAI_CONNECT_TIMEOUT_SECS")
            {   Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                  warn!(
                    "Ignoring invalid OPENAI_CONNECT_TIMEOUT_SECS: {}",
                    raw
                  );
                  defaults.connect_timeout_secs
                })
              , Err(_) => defaults.connect_timeout_secs
            };

        debug!(
          "Provider config: base={} key_set={} org_set={}",
          api_base,
          api_key.is_some(),
          organization.is_some()
        );

        ProviderConfig
        {   api_base
          , api_key
          , organization
          , connect_timeout_secs
        }
    }

    /// Full chat-completions endpoint URL
    pub fn completions_url(&self) -> String
    {   format!(
          "{}/chat/completions",
          self.api_base.trim_end_matches('/')
        )
    }
}
