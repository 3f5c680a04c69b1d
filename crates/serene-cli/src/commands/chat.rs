//! Interactive chat over stdin.

use crate::config::Config;
use crate::render;
use anyhow::{Context, Result};
use serene_core::{ApiClient, ChatView, Credentials, SendOutcome};
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

const HELP: &str = "Commands: /new (fresh conversation), /mood, /dismiss (close crisis notice), /quit";

/// A line of input: either a slash command or text for the assistant.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Quit,
    New,
    Mood,
    Dismiss,
    Help,
    Blank,
    Say(&'a str),
}

impl<'a> Input<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.trim() {
            "" => Input::Blank,
            "/quit" | "/exit" => Input::Quit,
            "/new" => Input::New,
            "/mood" => Input::Mood,
            "/dismiss" => Input::Dismiss,
            "/help" | "/?" => Input::Help,
            _ => Input::Say(line),
        }
    }
}

fn prompt() -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}

/// Send `text`, giving up if `interrupt` resolves first.
///
/// `None` means the send was abandoned; the view already ends with the
/// safety notice and is ready for the next message.
pub async fn send_or_interrupt(
    view: &mut ChatView,
    text: &str,
    interrupt: impl Future<Output = ()>,
) -> Option<serene_core::Result<SendOutcome>> {
    tokio::select! {
        result = view.send_user_message(text) => Some(result),
        _ = interrupt => None,
    }
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

pub async fn run(config: &Config, credentials: Credentials) -> Result<()> {
    let api = ApiClient::new(&config.api_url, config.request_timeout())?;
    info!(target: "serene::startup", "Chatting with {}", api.base_url());
    let mut view = ChatView::new(Arc::new(api), credentials);

    for message in view.messages() {
        println!("{}\n", render::message(message));
    }
    println!("{}\n", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = ctrl_c() => None,
        };
        let Some(line) = line else { break };

        let text = match Input::parse(&line) {
            Input::Quit => break,
            Input::Blank => continue,
            Input::Help => {
                println!("{}", HELP);
                continue;
            }
            Input::New => {
                view.new_conversation();
                for message in view.messages() {
                    println!("{}\n", render::message(message));
                }
                continue;
            }
            Input::Mood => {
                println!("{}", render::mood_indicator(view.mood().category(), view.mood().sentiment()));
                continue;
            }
            Input::Dismiss => {
                if view.dismiss_crisis().is_none() {
                    println!("No notice to dismiss.");
                }
                continue;
            }
            Input::Say(text) => text,
        };

        let before = view.messages().len();
        let Some(sent) = send_or_interrupt(&mut view, text, ctrl_c()).await else {
            info!(target: "serene::chat", "Send interrupted");
            for message in view.messages().iter().skip(before + 1) {
                println!("\n{}\n", render::message(message));
            }
            break;
        };
        match sent {
            Ok(SendOutcome::Stale) => {}
            Ok(outcome) => {
                // Skip the echoed user message.
                for message in view.messages().iter().skip(before + 1) {
                    println!("\n{}\n", render::message(message));
                }
                if matches!(outcome, SendOutcome::Delivered(ref d) if d.crisis.is_some()) {
                    if let Some(banner) = render::crisis_banner(view.crisis()) {
                        println!("{}\n", banner);
                    }
                }
            }
            Err(e) if e.is_auth() => {
                view.close();
                return Err(e).context("your session has expired; sign in again and update your token");
            }
            Err(e) => warn!(target: "serene::chat", "{}", e),
        }
    }

    view.close();
    println!("\nTake care of yourself.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serene_core::{ChatBackend, fallback_notice};
    use serene_types::{ChatRequest, ChatResponse};

    struct SilentBackend;

    #[async_trait]
    impl ChatBackend for SilentBackend {
        async fn send_message(
            &self,
            _credentials: &Credentials,
            _request: &ChatRequest,
        ) -> serene_core::Result<ChatResponse> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Input::parse("/quit"), Input::Quit);
        assert_eq!(Input::parse("  /new "), Input::New);
        assert_eq!(Input::parse("   "), Input::Blank);
        assert_eq!(Input::parse("/dismiss"), Input::Dismiss);
    }

    #[test]
    fn test_plain_text_is_sent_as_typed() {
        assert_eq!(Input::parse(" I feel off today"), Input::Say(" I feel off today"));
        assert_eq!(Input::parse("/unknown"), Input::Say("/unknown"));
    }

    #[tokio::test]
    async fn test_interrupt_abandons_pending_send() {
        let mut view = ChatView::new(Arc::new(SilentBackend), Credentials::bearer("token"));

        let sent = send_or_interrupt(&mut view, "hello?", std::future::ready(())).await;
        assert!(sent.is_none());
        assert!(!view.session().is_sending());
        assert_eq!(view.messages().len(), 3);
        assert_eq!(view.messages()[2].content, fallback_notice());
    }
}
