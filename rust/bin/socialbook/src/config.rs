//! Client configuration.
//!
//! Reads `~/.socialbook/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use socialbook_social::SessionConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Local storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Token database file (default: ~/.socialbook/storage.redb).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Client configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClientConfig {
    /// Backend base URL; `/graphql` and `/create-user` hang off it.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

fn default_api_url() -> String {
    "http://localhost:8000".into()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            storage: StorageConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Default config file path: ~/.socialbook/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Token database location.
    pub fn storage_path(&self) -> PathBuf {
        match &self.storage.path {
            Some(p) => PathBuf::from(p),
            None => dirs_path().join("storage.redb"),
        }
    }
}

/// Return the socialbook config directory (~/.socialbook).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".socialbook")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.session.login_path, "/login");
        assert!(config.storage_path().ends_with("storage.redb"));
    }

    #[test]
    fn reads_session_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
api_url = "https://social.example.com"

[storage]
path = "/tmp/sb.redb"

[session]
homePath = "/home"
noticeTtlSecs = 10
"#,
        )
        .unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.api_url, "https://social.example.com");
        assert_eq!(config.storage_path(), PathBuf::from("/tmp/sb.redb"));
        assert_eq!(config.session.home_path, "/home");
        assert_eq!(config.session.notice_ttl_secs, 10);
        assert_eq!(config.session.auth_scheme, "JWT");
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = [").unwrap();
        assert!(matches!(ClientConfig::load(&path), Err(ConfigError::Parse { .. })));
    }
}
