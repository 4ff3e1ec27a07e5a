//! Application configuration

pub mod credentials;

use std::env;
use std::path::{Path, PathBuf};

pub use credentials::load_api_key;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful assistant";

/// Environment variable that overrides the key file
pub const API_KEY_ENV: &str = "OPENAI_APIKEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key_env: Option<String>,
    pub api_key_path: PathBuf,
    pub conversations_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        let root = home.join(".openai");

        Ok(Self {
            base_url: env::var("OPENAI_BASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            api_key_env: env::var(API_KEY_ENV).ok(),
            api_key_path: root.join("apikey"),
            conversations_dir: root.join("conversations"),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine the home directory")]
    NoHomeDir,
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
