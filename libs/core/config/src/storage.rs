use crate::{env_or_default, ConfigError, FromEnv};
use std::path::PathBuf;

/// Where uploaded files live on disk and the URL prefix they are served from.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub public_url: String,
}

impl StorageConfig {
    pub fn new(upload_dir: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            public_url: normalize_public_url(&public_url.into()),
        }
    }
}

impl FromEnv for StorageConfig {
    /// Reads from environment variables with defaults:
    /// - UPLOAD_DIR: defaults to ./storage
    /// - PUBLIC_STORAGE_URL: defaults to /storage
    fn from_env() -> Result<Self, ConfigError> {
        let upload_dir = env_or_default("UPLOAD_DIR", "./storage");
        let public_url = env_or_default("PUBLIC_STORAGE_URL", "/storage");

        if upload_dir.trim().is_empty() {
            return Err(ConfigError::ParseError {
                key: "UPLOAD_DIR".to_string(),
                details: "must not be empty".to_string(),
            });
        }

        Ok(Self::new(upload_dir, public_url))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new("./storage", "/storage")
    }
}

fn normalize_public_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        temp_env::with_vars(
            [("UPLOAD_DIR", None::<&str>), ("PUBLIC_STORAGE_URL", None::<&str>)],
            || {
                let config = StorageConfig::from_env().unwrap();
                assert_eq!(config.upload_dir, PathBuf::from("./storage"));
                assert_eq!(config.public_url, "/storage");
            },
        );
    }

    #[test]
    fn test_storage_config_custom_values() {
        temp_env::with_vars(
            [
                ("UPLOAD_DIR", Some("/var/lib/goods")),
                ("PUBLIC_STORAGE_URL", Some("https://cdn.example.com/files/")),
            ],
            || {
                let config = StorageConfig::from_env().unwrap();
                assert_eq!(config.upload_dir, PathBuf::from("/var/lib/goods"));
                assert_eq!(config.public_url, "https://cdn.example.com/files");
            },
        );
    }

    #[test]
    fn test_storage_config_rejects_blank_dir() {
        temp_env::with_var("UPLOAD_DIR", Some("  "), || {
            let err = StorageConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("UPLOAD_DIR"));
        });
    }

    #[test]
    fn test_storage_config_default_matches_env_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.public_url, "/storage");
    }
}
