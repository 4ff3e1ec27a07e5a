//! Chat completion providers

pub mod openai_compat;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::DEFAULT_MODEL;
use crate::conversation::Message;

pub use openai_compat::{OpenAICompatConfig, OpenAICompatProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Sampling options for a single completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 1.0,
            max_tokens: None,
        }
    }
}

/// Sends a full turn list and returns the assistant's reply text, trimmed.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, ProviderError>;
}

#[cfg(test)]
pub mod testing {
    //! Scripted provider for controller tests

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// A recorded call: the turns sent and the options used
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub messages: Vec<Message>,
        pub options: CompletionOptions,
    }

    #[derive(Default)]
    pub struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<String, String>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl ScriptedProvider {
        pub fn new<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Queue a failing exchange
        pub fn then_fail(self, status: u16, message: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err(format!("{status}:{message}")));
            self
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn complete(
            &self,
            messages: &[Message],
            options: &CompletionOptions,
        ) -> Result<String, ProviderError> {
            self.calls.lock().unwrap().push(RecordedCall {
                messages: messages.to_vec(),
                options: options.clone(),
            });

            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(reply)) => Ok(reply.trim().to_string()),
                Some(Err(encoded)) => {
                    let (status, message) = encoded.split_once(':').unwrap_or(("500", ""));
                    Err(ProviderError::Api {
                        status: status.parse().unwrap_or(500),
                        message: message.to_string(),
                    })
                }
                None => Err(ProviderError::InvalidResponse(
                    "no scripted reply left".to_string(),
                )),
            }
        }
    }
}
