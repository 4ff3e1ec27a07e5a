//! Transcript naming
//!
//! A new conversation is named after a short model-written summary of its
//! first message, reduced to lowercase letters and underscores.

use crate::config::DEFAULT_MODEL;
use crate::conversation::Message;
use crate::providers::{ChatProvider, CompletionOptions, ProviderError};

pub const SLOGAN_INSTRUCTION: &str = "Summarize this text in max three words. The summary should \
provide the clearest possible understanding of the text in this minimal format.";

const SLOGAN_TEMPERATURE: f32 = 0.7;
const SLOGAN_MAX_TOKENS: u32 = 10;

/// Stem used when the summary has no letters at all
pub const FALLBACK_STEM: &str = "conversation";

/// Ask the model for a three-word summary of `text` and turn it into a file stem.
pub async fn generate_slogan<P>(provider: &P, text: &str) -> Result<String, ProviderError>
where
    P: ChatProvider + ?Sized,
{
    let messages = [Message::system(SLOGAN_INSTRUCTION), Message::user(text)];
    let options = CompletionOptions {
        model: DEFAULT_MODEL.to_string(),
        temperature: SLOGAN_TEMPERATURE,
        max_tokens: Some(SLOGAN_MAX_TOKENS),
    };

    let raw = provider.complete(&messages, &options).await?;
    let slug = slugify(&raw);

    if slug.is_empty() {
        tracing::warn!(summary = %raw, "Summary has no letters, using fallback name");
        return Ok(FALLBACK_STEM.to_string());
    }

    tracing::debug!(summary = %raw, slug = %slug, "Generated conversation name");
    Ok(slug)
}

/// Drop everything that is not a letter or whitespace.
pub fn retain_letters_and_spaces(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect()
}

/// Lowercase, keep letters, trim, whitespace to `_`.
pub fn slugify(text: &str) -> String {
    retain_letters_and_spaces(&text.to_lowercase())
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
