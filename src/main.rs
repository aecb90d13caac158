use std::io::Write;
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};
use chatrelay::providers::OpenAiClient;
use chatrelay::{ChatBackend, SinkEvent};

#[tokio::main]
async fn main() -> Result<(), chatrelay::Error>
{   dotenvy::dotenv().ok();
    env_logger::init();

    let provider = OpenAiClient::from_env()?;
    let backend = ChatBackend::new(provider);
    let settings = backend.start_session().await?;
    info!("Session started with model {}", settings.model);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    loop
    {   print!("> ");
        let _ = stdout.flush();

        let line = match lines.next_line().await
        {   Ok(Some(line)) => line
          , Ok(None) => break
          , Err(e) => {
              eprintln!("stdin error: {}", e);
              break;
            }
        };
        let text = match outgoing_text(line)
        {   Some(text) => text
          , None => continue
        };

        let mut events = backend.send_message(text).await?;
        while let Some(event) = events.recv().await
        {   match event
            {   SinkEvent::Token(token) => {
                  print!("{}", token);
                  let _ = stdout.flush();
                }
              , SinkEvent::Finalized(message) => {
                  println!();
                  debug!("Reply complete: {} bytes", message.content.len());
                }
              , SinkEvent::Failed(e) => {
                  println!();
                  eprintln!("error: {}", e);
                }
            }
        }
    }

    backend.shutdown().await
}

/// Text to send for one input line; blank lines send nothing.
/// The line reader already strips the line terminator.
fn outgoing_text(line: String) -> Option<String>
{   if line.trim().is_empty()
    {   None
    } else
    {   Some(line)
    }
}
