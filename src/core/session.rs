//! Chat loop controller
//!
//! Reads a message, resolves where the transcript lives, then alternates
//! between asking the provider and persisting the transcript until input
//! runs out or the cancellation token fires.

use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use tokio_util::sync::CancellationToken;

use crate::conversation::{Conversation, ConversationStore, StoreError};
use crate::providers::{ChatProvider, CompletionOptions, ProviderError};

use super::slogan::generate_slogan;

const USER_PROMPT: &str = "You: ";
const REPLY_PREFIX: &str = "ChatGPT: ";

/// Whether stdin is a live terminal or piped content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Prompt line by line and persist after every turn
    Interactive,
    /// Read everything once, answer once, write nothing
    Piped,
}

/// Per-invocation session settings
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub system_message: String,
    /// Transcript to continue instead of starting a new one
    pub resume_from: Option<PathBuf>,
    pub completion: CompletionOptions,
}

/// How a session ended
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub exchanges: usize,
    /// Set once the transcript has been written at least once
    pub saved_to: Option<PathBuf>,
    pub interrupted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs `fut` unless `cancel` fires first; `None` means interrupted.
async fn until_cancelled<F: std::future::Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = fut => Some(output),
    }
}

pub struct ChatSession<P> {
    provider: P,
    store: ConversationStore,
    options: SessionOptions,
    mode: InputMode,
}

impl<P: ChatProvider> ChatSession<P> {
    pub fn new(
        provider: P,
        store: ConversationStore,
        options: SessionOptions,
        mode: InputMode,
    ) -> Self {
        Self {
            provider,
            store,
            options,
            mode,
        }
    }

    /// Drive the conversation to completion.
    ///
    /// Provider and storage failures end the session with an error. End of
    /// input and cancellation end it normally.
    pub async fn run<R, W>(
        &self,
        mut input: R,
        out: &mut W,
        cancel: &CancellationToken,
    ) -> Result<SessionSummary, SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut summary = SessionSummary::default();

        let mut message = match until_cancelled(cancel, self.next_message(&mut input, out)).await {
            None => return Ok(interrupted(summary)),
            Some(result) => match result? {
                Some(message) => message,
                None => return Ok(summary),
            },
        };

        let Some(opened) = until_cancelled(cancel, self.open(&message)).await else {
            return Ok(interrupted(summary));
        };
        let (mut conversation, target) = opened?;

        loop {
            conversation.add_user(&message);

            let exchange = self
                .provider
                .complete(conversation.messages(), &self.options.completion);
            let Some(reply) = until_cancelled(cancel, exchange).await else {
                return Ok(interrupted(summary));
            };
            let reply = reply?;

            conversation.add_assistant(&reply);
            writeln!(out, "{REPLY_PREFIX}{reply}")?;
            out.flush()?;
            summary.exchanges += 1;

            if self.mode == InputMode::Piped {
                return Ok(summary);
            }

            if let Some(path) = &target {
                self.store.save(path, &conversation).await?;
                if summary.saved_to.is_none() {
                    tracing::info!(path = %path.display(), "Conversation file created");
                }
                summary.saved_to = Some(path.clone());
            }

            message = match until_cancelled(cancel, self.next_message(&mut input, out)).await {
                None => return Ok(interrupted(summary)),
                Some(result) => match result? {
                    Some(message) => message,
                    None => return Ok(summary),
                },
            };
        }
    }

    /// Load or seed the conversation and pick its file.
    ///
    /// Only interactive sessions get a target file, so piped new
    /// conversations never spend a request on a slogan.
    async fn open(&self, first_message: &str) -> Result<(Conversation, Option<PathBuf>), SessionError> {
        let system = &self.options.system_message;

        if let Some(requested) = &self.options.resume_from {
            let path = self.store.resolve(requested);
            let mut conversation = self.store.load(&path).await?;
            tracing::debug!(
                path = %path.display(),
                turns = conversation.len(),
                "Resuming conversation"
            );
            conversation.add_system(system);

            let target = (self.mode == InputMode::Interactive).then_some(path);
            return Ok((conversation, target));
        }

        let conversation = Conversation::new().with_system(system);
        if self.mode == InputMode::Piped {
            return Ok((conversation, None));
        }

        let slogan = generate_slogan(&self.provider, first_message).await?;
        let path = self.store.available_path(&slogan).await;
        Ok((conversation, Some(path)))
    }

    /// Next user message, or `None` when input is exhausted.
    ///
    /// Blank input is still a turn; only end of stream stops the loop.
    async fn next_message<R, W>(&self, input: &mut R, out: &mut W) -> Result<Option<String>, SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        match self.mode {
            InputMode::Piped => {
                let mut content = String::new();
                input.read_to_string(&mut content).await?;
                Ok(Some(content.trim().to_string()))
            }
            InputMode::Interactive => {
                write!(out, "{USER_PROMPT}")?;
                out.flush()?;

                let mut line = String::new();
                if input.read_line(&mut line).await? == 0 {
                    return Ok(None);
                }
                Ok(Some(line.trim().to_string()))
            }
        }
    }
}

fn interrupted(mut summary: SessionSummary) -> SessionSummary {
    summary.interrupted = true;
    summary
}
