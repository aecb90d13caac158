//! Incremental decoder for `text/event-stream` bodies

use log::trace;

/// Splits a byte stream into server-sent-event `data` payloads.
///
/// Chunks may cut lines anywhere, including inside a multi-byte
/// character; only complete lines are decoded.
#[derive(Debug, Default)]
pub struct SseDecoder
{   buffer: Vec<u8>
  , data: Vec<String>
}

impl SseDecoder
{   pub fn new() -> Self
    {   SseDecoder::default()
    }

    /// Feed one body chunk, returning every event completed by it.
    pub fn feed(
      &mut self
    , chunk: &[u8]
    ) -> Result<Vec<String>, crate::error::Error>
    {   self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n')
        {   let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = std::str::from_utf8(&line[..line.len() - 1])
              .map_err(|e| {
                crate::error::Error::ParseError(e.to_string())
              })?;
            if let Some(event) = self.process_line(
              line.strip_suffix('\r').unwrap_or(line)
            )
            {   events.push(event);
            }
        }

        Ok(events)
    }

    /// Flush whatever is left once the body has ended.
    pub fn finish(
      &mut self
    ) -> Result<Option<String>, crate::error::Error>
    {   if !self.buffer.is_empty()
        {   let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8(rest).map_err(|e| {
              crate::error::Error::ParseError(e.to_string())
            })?;
            if let Some(event) = self.process_line(
              line.trim_end_matches('\r')
            )
            {   return Ok(Some(event));
            }
        }
        Ok(self.take_event())
    }

    fn process_line(&mut self, line: &str) -> Option<String>
    {   if line.is_empty()
        {   return self.take_event();
        }
        if line.starts_with(':')
        {   trace!("SSE comment: {}", line);
            return None;
        }

        let (field, value) = match line.split_once(':')
        {   Some((field, value)) => {
              (field, value.strip_prefix(' ').unwrap_or(value))
            }
          , None => (line, "")
        };

        if field == "data"
        {   self.data.push(value.to_string());
        } else
        {   trace!("Ignoring SSE field: {}", field);
        }
        None
    }

    fn take_event(&mut self) -> Option<String>
    {   if self.data.is_empty()
        {   return None;
        }
        let event = self.data.join("\n");
        self.data.clear();
        Some(event)
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn decodes_events_split_across_chunks()
    {   let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"a\"").unwrap().is_empty());
        assert!(decoder.feed(b":1}\n").unwrap().is_empty());
        let events = decoder.feed(b"\ndata: [DONE]\n\n").unwrap();
        assert_eq!(events, vec!["{\"a\":1}", "[DONE]"]);
    }

    #[test]
    fn tolerates_crlf_and_comments()
    {   let mut decoder = SseDecoder::new();
        let events = decoder
          .feed(b": keep-alive\r\n\r\ndata: x\r\n\r\n")
          .unwrap();
        assert_eq!(events, vec!["x"]);
    }

    #[test]
    fn joins_multi_line_data()
    {   let mut decoder = SseDecoder::new();
        let events = decoder
          .feed(b"event: message\ndata: one\ndata: two\n\n")
          .unwrap();
        assert_eq!(events, vec!["one\ntwo"]);
    }

    #[test]
    fn keeps_multibyte_characters_split_between_chunks()
    {   let bytes = "data: héllo\n\n".as_bytes();
        let split = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(&bytes[..split]).unwrap().is_empty());
        let events = decoder.feed(&bytes[split..]).unwrap();
        assert_eq!(events, vec!["héllo"]);
    }

    #[test]
    fn finish_flushes_unterminated_event()
    {   let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: tail").unwrap().is_empty());
        assert_eq!(decoder.finish().unwrap(), Some("tail".to_string()));
        assert_eq!(decoder.finish().unwrap(), None);
    }

    #[test]
    fn rejects_invalid_utf8_line()
    {   let mut decoder = SseDecoder::new();
        let result = decoder.feed(b"data: \xFF\xFE\n");
        assert!(matches!(
          result,
          Err(crate::error::Error::ParseError(_))
        ));
    }
}
