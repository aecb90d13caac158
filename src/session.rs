//! Per-session state handed to the message handler

use log::{debug, warn};
use crate::config::GenerationSettings;

/// State owned by one chat session.
///
/// Settings are written once when the session starts and only read
/// afterwards; nothing here is shared between sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionContext
{   settings: Option<GenerationSettings>
}

impl SessionContext
{   pub fn new() -> Self
    {   SessionContext::default()
    }

    /// Store the session's settings. A second call keeps the
    /// settings already stored and returns them.
    pub fn store_settings(
      &mut self
    , settings: GenerationSettings
    ) -> &GenerationSettings
    {   if self.settings.is_some()
        {   warn!("Session settings already stored; keeping originals");
        } else
        {   debug!("Storing session settings: {:?}", settings);
        }
        self.settings.get_or_insert(settings)
    }

    /// Settings for this session, or `MissingSettings` before start.
    pub fn settings(&self)
      -> Result<&GenerationSettings, crate::error::Error>
    {   self.settings.as_ref()
          .ok_or(crate::error::Error::MissingSettings)
    }

    pub fn is_started(&self) -> bool
    {   self.settings.is_some()
    }
}
