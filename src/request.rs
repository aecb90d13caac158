//! Prompt and audit record types

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::config::GenerationSettings;
use crate::prompts;
use crate::providers::ChatMessage;

/// One rendered message of a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage
{   pub role: crate::Role
  , /// Template before substitution
    pub template: String
  , /// Text actually sent to the provider
    pub formatted: String
}

impl PromptMessage
{   /// System message: formatted text is the template verbatim
    pub fn system(template: &str) -> Self
    {   PromptMessage
        {   role: crate::Role::System
          , template: template.to_string()
          , formatted: template.to_string()
        }
    }

    /// User message: template with its placeholder replaced by `input`
    pub fn user(template: &str, input: &str) -> Self
    {   PromptMessage
        {   role: crate::Role::User
          , template: template.to_string()
          , formatted: prompts::render(template, input)
        }
    }

    /// Convert to the provider's `{role, content}` shape
    pub fn to_openai(&self) -> ChatMessage
    {   ChatMessage
        {   role: self.role
          , content: self.formatted.clone()
        }
    }
}

/// Audit record of one message exchange: what was sent, with which
/// settings, and (once the stream is drained) what came back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord
{   provider: String
  , messages: [PromptMessage; 2]
  , inputs: BTreeMap<String, String>
  , settings: GenerationSettings
  , completion: Option<String>
}

impl PromptRecord
{   /// Build the fixed system + user prompt for `user_text`.
    pub fn build(
      provider: &str
    , user_text: &str
    , settings: &GenerationSettings
    ) -> Self
    {   let mut inputs = BTreeMap::new();
        inputs.insert(
          prompts::INPUT_KEY.to_string(),
          user_text.to_string()
        );
        PromptRecord
        {   provider: provider.to_string()
          , messages: [
              PromptMessage::system(prompts::SYSTEM_TEMPLATE)
            , PromptMessage::user(prompts::USER_TEMPLATE, user_text)
            ]
          , inputs
          , settings: settings.clone()
          , completion: None
        }
    }

    pub fn provider(&self) -> &str
    {   &self.provider
    }

    /// System message first, then user message
    pub fn messages(&self) -> &[PromptMessage; 2]
    {   &self.messages
    }

    pub fn inputs(&self) -> &BTreeMap<String, String>
    {   &self.inputs
    }

    pub fn settings(&self) -> &GenerationSettings
    {   &self.settings
    }

    /// Full response text; `None` until the stream has been drained
    pub fn completion(&self) -> Option<&str>
    {   self.completion.as_deref()
    }

    /// Messages in the provider's wire shape, in prompt order
    pub fn to_openai(&self) -> Vec<ChatMessage>
    {   self.messages.iter().map(PromptMessage::to_openai).collect()
    }

    pub(crate) fn set_completion(&mut self, completion: String)
    {   debug_assert!(self.completion.is_none());
        self.completion = Some(completion);
    }
}
