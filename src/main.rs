//! gptchat - terminal chat client for OpenAI-compatible APIs
//!
//! Prompts on the terminal (or reads piped stdin once), sends the
//! conversation to a chat completion endpoint and keeps interactive
//! transcripts as JSON files under `~/.openai/conversations/`.

use std::io::{IsTerminal, Write};

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod conversation;
mod core;
mod providers;

use cli::Cli;
use config::{load_api_key, Config};
use conversation::ConversationStore;
use crate::core::{ChatSession, InputMode, SessionOptions, SessionSummary};
use providers::{OpenAICompatConfig, OpenAICompatProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gptchat=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let api_key = match load_api_key(config.api_key_env.as_deref(), &config.api_key_path) {
        Ok(key) => key,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{}", e.hint());
            std::process::exit(1);
        }
    };

    let provider = OpenAICompatProvider::new(
        OpenAICompatConfig::openai(api_key)
            .with_base_url(config.base_url.clone())
            .with_debug(cli.debug),
    )?;

    let mode = if std::io::stdin().is_terminal() {
        InputMode::Interactive
    } else {
        InputMode::Piped
    };

    let options = SessionOptions {
        system_message: cli.system.clone(),
        resume_from: cli.file.clone(),
        completion: cli.completion_options(),
    };

    let store = ConversationStore::new(&config.conversations_dir);
    tracing::debug!(dir = %store.dir().display(), ?mode, "Starting chat session");

    let session = ChatSession::new(provider, store, options, mode);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    let summary = session.run(input, &mut stdout, &cancel).await?;
    tracing::debug!(
        exchanges = summary.exchanges,
        interrupted = summary.interrupted,
        "Chat session finished"
    );

    write_footer(mode, &summary, &mut stdout)?;

    if summary.interrupted {
        // The blocking stdin reader may still be parked; don't wait for it.
        stdout.flush()?;
        std::process::exit(0);
    }

    Ok(())
}

/// Tell the user where the transcript went once the session is over.
fn write_footer(mode: InputMode, summary: &SessionSummary, out: &mut impl Write) -> std::io::Result<()> {
    let interactive = mode == InputMode::Interactive;

    if let (true, Some(path)) = (interactive, &summary.saved_to) {
        writeln!(out)?;
        writeln!(out, "Conversation stored in {}", path.display())?;
    }
    if interactive || summary.interrupted {
        writeln!(out)?;
    }
    Ok(())
}
