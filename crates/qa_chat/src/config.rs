//! Client config load/save for `~/.qa-chat/config.yaml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::session::SessionOptions;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Overrides `service.base_url`.
pub const BASE_URL_ENV: &str = "QA_CHAT_BASE_URL";

/// Answer service section (base_url, timeout_secs).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ServiceSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Seconds to wait for an answer; 0 waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Chat section (greeting).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceSection,
    #[serde(default)]
    pub chat: ChatSection,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.service.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// `None` when the timeout is disabled with `timeout_secs: 0`.
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.service.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Apply `QA_CHAT_BASE_URL` if it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.is_empty() {
                self.service.base_url = Some(url);
            }
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            greeting: self.chat.greeting.clone(),
            request_timeout: self.request_timeout(),
        }
    }
}

/// Returns the default config file path: `~/.qa-chat/config.yaml` (platform-specific).
pub fn default_config_path() -> Option<PathBuf> {
    let home = home_dir()?;
    Some(home.join(".qa-chat").join("config.yaml"))
}

#[cfg(unix)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(windows)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE").map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn home_dir() -> Option<PathBuf> {
    None
}

/// Load config from a YAML file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`load`], but a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    match load(path) {
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(Config::default())
        }
        other => other,
    }
}

/// Save config to a YAML file. Creates parent directory if missing.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let contents = serde_yaml::to_string(config).map_err(ConfigError::Serialize)?;
    std::fs::write(path, contents).map_err(io_err)
}

/// Config load/save error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("cannot serialize config: {0}")]
    Serialize(serde_yaml::Error),
}
