//! Terminal host for the chat widget.
//!
//! Reads lines from stdin, relays them through the conversation controller
//! and draws the transcript on stdout.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use chatbot_widget::chat::ConversationController;
use chatbot_widget::config::AppConfig;
use chatbot_widget::render::{Renderer, TerminalRenderer};
use chatbot_widget::session::{FileStorage, MemoryStorage, SessionStore, Storage};
use chatbot_widget::telemetry;
use chatbot_widget::transport::HttpTransport;

/// A line typed by the user.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Open,
    Close,
    Toggle,
    Quit,
    Send(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "/open" => Self::Open,
            "/close" => Self::Close,
            "/toggle" => Self::Toggle,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Send(line),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    telemetry::init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let storage: Arc<dyn Storage> = match &config.storage.session_file {
        Some(path) => Arc::new(FileStorage::new(path)),
        None => Arc::new(MemoryStorage::new()),
    };
    let session = SessionStore::new(storage).get_or_create();

    let ansi = !config.no_color && std::io::stdout().is_terminal();
    let renderer = Arc::new(TerminalRenderer::new(
        std::io::stdout(),
        config.chrome(),
        ansi,
    ));

    let panel: Arc<dyn Renderer> = Arc::clone(&renderer) as Arc<dyn Renderer>;
    let controller = ConversationController::initialize(
        config.controller(),
        session,
        Arc::new(HttpTransport::new()),
        panel,
    );

    info!(
        name: "widget.started",
        endpoint = %controller.endpoint_url(),
        session_id = %controller.session(),
        "Chat widget started"
    );

    if config.widget.start_open {
        renderer.set_open(true);
    } else {
        println!("💬  type /open to chat, /quit to leave");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match Command::parse(&line) {
            Command::Open => {
                renderer.set_open(true);
            }
            Command::Close => {
                renderer.set_open(false);
            }
            Command::Toggle => {
                renderer.toggle();
            }
            Command::Quit => break,
            Command::Send(text) => {
                if !renderer.is_open() {
                    renderer.set_open(true);
                }

                let submit = controller.submit(text);
                tokio::pin!(submit);
                let outcome = loop {
                    tokio::select! {
                        outcome = &mut submit => break outcome,
                        _ = tokio::signal::ctrl_c() => {
                            controller.cancel();
                        }
                    }
                };
                tracing::debug!(?outcome, "Submit finished");
            }
        }
    }

    info!(name: "widget.stopped", "Chat widget stopped");
    Ok(())
}
