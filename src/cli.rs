//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_MODEL, DEFAULT_SYSTEM_MESSAGE};
use crate::providers::CompletionOptions;

#[derive(Debug, Parser)]
#[command(name = "gptchat", version, about = "Interact with ChatGPT.")]
pub struct Cli {
    /// Temperature for GPT response
    #[arg(short, long, default_value_t = 1.0)]
    pub temperature: f32,

    /// System message to start the conversation
    #[arg(short, long, default_value = DEFAULT_SYSTEM_MESSAGE)]
    pub system: String,

    /// Token limit for GPT response
    #[arg(short = 'l', long = "token_limit", visible_alias = "token-limit")]
    pub token_limit: Option<u32>,

    /// Path to the conversation file to continue
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Chat model
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Print headers and bodies sent over HTTP
    #[arg(short, long)]
    pub debug: bool,
}

impl Cli {
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.token_limit,
        }
    }
}
