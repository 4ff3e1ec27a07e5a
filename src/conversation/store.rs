//! JSON transcript files
//!
//! One file per conversation under a single directory. Each save rewrites the
//! whole file; there is no locking and no atomic rename, so two processes
//! writing the same transcript can clobber each other.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::config::expand_home;

use super::Conversation;

/// Transcript storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read conversation {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write conversation {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed conversation file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to encode conversation: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ConversationStore {
    dir: PathBuf,
}

impl ConversationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve a user-supplied transcript path.
    ///
    /// `~` is expanded. Relative paths that exist from the working directory
    /// win; anything else relative is looked up in the conversation directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let expanded = expand_home(path);
        if expanded.is_absolute() || expanded.exists() {
            expanded
        } else {
            self.dir.join(expanded)
        }
    }

    /// First free `<stem>.json`, `<stem>_1.json`, `<stem>_2.json`, ...
    pub async fn available_path(&self, stem: &str) -> PathBuf {
        let mut candidate = self.dir.join(format!("{stem}.json"));
        let mut counter = 1u32;

        while fs::try_exists(&candidate).await.unwrap_or(false) {
            candidate = self.dir.join(format!("{stem}_{counter}.json"));
            counter += 1;
        }

        candidate
    }

    pub async fn load(&self, path: &Path) -> Result<Conversation, StoreError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|source| StoreError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub async fn save(&self, path: &Path, conversation: &Conversation) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(conversation)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
        }

        fs::write(path, json)
            .await
            .map_err(|source| StoreError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(
            path = %path.display(),
            turns = conversation.len(),
            "Saved conversation"
        );
        Ok(())
    }
}
