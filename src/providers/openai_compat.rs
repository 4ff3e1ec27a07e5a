//! OpenAI-compatible provider
//!
//! Works with any API that implements the OpenAI chat completions format:
//! - OpenAI (api.openai.com)
//! - Groq (api.groq.com)
//! - vLLM, LM Studio, LocalAI (local servers)
//!
//! One synchronous-looking POST per exchange. Failures are returned to the
//! caller as-is; nothing here retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DEFAULT_BASE_URL;
use crate::conversation::Message;

use super::{ChatProvider, CompletionOptions, ProviderError};

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [Message],
    model: &'a str,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error response from API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone)]
pub struct OpenAICompatConfig {
    /// Base URL for the API (e.g., https://api.openai.com/v1)
    pub base_url: String,
    /// Bearer token
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Echo outgoing headers/body and the raw response to stdout
    pub debug: bool,
}

impl OpenAICompatConfig {
    /// Create config for OpenAI
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout_secs: 120,
            debug: false,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// OpenAI-compatible API provider
pub struct OpenAICompatProvider {
    config: OpenAICompatConfig,
    client: Client,
}

impl OpenAICompatProvider {
    /// Create a new provider with the given configuration
    pub fn new(config: OpenAICompatConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.config.api_key)
    }

    fn print_request(&self, request: &ChatCompletionRequest<'_>) {
        println!("Headers:");
        println!("Authorization: {}", self.authorization());
        println!("Content-Type: application/json");
        println!("\nRequest body:");
        println!(
            "{}",
            serde_json::to_string_pretty(request).unwrap_or_default()
        );
    }

    fn print_response(body: &str) {
        println!("Response:");
        match serde_json::from_str::<Value>(body) {
            Ok(json) => println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default()),
            Err(_) => println!("{body}"),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAICompatProvider {
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest {
            messages,
            model: &options.model,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        if self.config.debug {
            self.print_request(&request);
        }

        tracing::debug!(
            model = %options.model,
            turns = messages.len(),
            max_tokens = ?options.max_tokens,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", self.authorization())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if self.config.debug {
            Self::print_response(&body);
        }

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {} - Body: {}", e, body))
        })?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?;

        let content = choice.message.content.unwrap_or_default();
        tracing::debug!(chars = content.len(), "Received chat completion");

        Ok(content.trim().to_string())
    }
}
