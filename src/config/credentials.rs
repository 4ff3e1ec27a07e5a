//! API key lookup
//!
//! The environment wins over the key file. The key file must not be
//! readable, writable or executable by group or others.

use std::path::{Path, PathBuf};

use super::API_KEY_ENV;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("API key not found in {} and no key file at {}", API_KEY_ENV, .path.display())]
    NotFound { path: PathBuf },

    #[error(
        "API key file {} should not be accessible (readable, writable, or executable) by anyone other than the user (mode {mode:o})",
        .path.display()
    )]
    InsecurePermissions { path: PathBuf, mode: u32 },

    #[error("API key file {} is empty", .path.display())]
    Empty { path: PathBuf },

    #[error("Failed to read API key file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CredentialError {
    /// What the user should do about it
    pub fn hint(&self) -> String {
        match self {
            CredentialError::NotFound { path } | CredentialError::Empty { path } => format!(
                "Please put your API key in {} or set the {API_KEY_ENV} environment variable.",
                path.display()
            ),
            CredentialError::InsecurePermissions { path, .. } => {
                format!("Restrict it with: chmod 600 {}", path.display())
            }
            CredentialError::Io { .. } => "Check that the key file is readable.".to_string(),
        }
    }
}

/// Resolve the API key from an environment value or the key file.
pub fn load_api_key(env_value: Option<&str>, key_path: &Path) -> Result<String, CredentialError> {
    if let Some(key) = env_value.map(str::trim).filter(|k| !k.is_empty()) {
        tracing::debug!("Using API key from {}", API_KEY_ENV);
        return Ok(key.to_string());
    }

    let metadata = match std::fs::metadata(key_path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CredentialError::NotFound {
                path: key_path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(CredentialError::Io {
                path: key_path.to_path_buf(),
                source,
            })
        }
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(CredentialError::InsecurePermissions {
                path: key_path.to_path_buf(),
                mode: mode & 0o777,
            });
        }
    }
    #[cfg(not(unix))]
    let _ = metadata;

    let content = std::fs::read_to_string(key_path).map_err(|source| CredentialError::Io {
        path: key_path.to_path_buf(),
        source,
    })?;

    let key = content.trim();
    if key.is_empty() {
        return Err(CredentialError::Empty {
            path: key_path.to_path_buf(),
        });
    }

    tracing::debug!(path = %key_path.display(), "Using API key from file");
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn write_key(dir: &TempDir, content: &str, mode: u32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.path().join("apikey");
        std::fs::write(&path, content).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_env_value_wins() {
        let tmp = TempDir::new().unwrap();
        let key = load_api_key(Some("  sk-env\n"), &tmp.path().join("missing")).unwrap();
        assert_eq!(key, "sk-env");
    }

    #[test]
    fn test_missing_file_without_env() {
        let tmp = TempDir::new().unwrap();
        let err = load_api_key(None, &tmp.path().join("apikey")).unwrap_err();
        assert!(matches!(err, CredentialError::NotFound { .. }));
        assert!(err.hint().contains(API_KEY_ENV));
    }

    #[test]
    fn test_blank_env_falls_through_to_file() {
        let tmp = TempDir::new().unwrap();
        let err = load_api_key(Some("   "), &tmp.path().join("apikey")).unwrap_err();
        assert!(matches!(err, CredentialError::NotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_reads_private_key_file() {
        let tmp = TempDir::new().unwrap();
        let path = write_key(&tmp, "sk-file\n", 0o600);
        assert_eq!(load_api_key(None, &path).unwrap(), "sk-file");
    }

    #[cfg(unix)]
    #[test]
    fn test_group_readable_key_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_key(&tmp, "sk-file", 0o640);

        let err = load_api_key(None, &path).unwrap_err();
        match &err {
            CredentialError::InsecurePermissions { mode, .. } => assert_eq!(*mode, 0o640),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("should not be accessible"));
        assert!(err.hint().contains("chmod 600"));
    }

    #[cfg(unix)]
    #[test]
    fn test_env_override_skips_permission_check() {
        let tmp = TempDir::new().unwrap();
        let path = write_key(&tmp, "sk-file", 0o644);
        assert_eq!(load_api_key(Some("sk-env"), &path).unwrap(), "sk-env");
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_key_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_key(&tmp, " \n", 0o600);
        assert!(matches!(
            load_api_key(None, &path).unwrap_err(),
            CredentialError::Empty { .. }
        ));
    }
}
