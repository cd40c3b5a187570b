//! User configuration loaded from `config.toml`.
//!
//! A missing file is not an error: every field has a default. A file that exists
//! but cannot be parsed is reported by [`Config::load`]; the binary treats that as
//! a soft failure and falls back to defaults via [`Config::load_or_default`].

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::api::Access;
use crate::error::{Error, Result};

pub const API_URL_ENV: &str = "KEEPSAKE_API_URL";
pub const TOKEN_ENV: &str = "KEEPSAKE_TOKEN";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    /// Bearer token for authenticated endpoints. Obtained outside keepsake.
    pub token: Option<String>,
    /// Use the unauthenticated endpoint family.
    pub public: bool,
    pub theme: String,
    pub feed_page_size: u32,
    pub search_page_size: u32,
    pub comment_page_size: u32,
    pub suggestion_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_owned(),
            token: None,
            public: false,
            theme: "catppuccin-mocha".to_owned(),
            feed_page_size: 10,
            search_page_size: 10,
            comment_page_size: 10,
            suggestion_limit: 8,
        }
    }
}

impl Config {
    /// Reads and parses `path`. Returns defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file exists but cannot be read or is not
    /// valid TOML for this schema.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Config(format!("{}: {}", path.display(), e))),
        };
        let config: Config = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config.sanitized())
    }

    /// Like [`Config::load`] but never fails; parse errors are logged.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!("{e}; using default configuration");
            Self::default()
        })
    }

    /// Applies `KEEPSAKE_API_URL` / `KEEPSAKE_TOKEN` on top of the file values.
    pub fn with_env(self) -> Self {
        self.with_overrides(std::env::var(API_URL_ENV).ok(), std::env::var(TOKEN_ENV).ok())
    }

    pub fn with_overrides(mut self, api_url: Option<String>, token: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }
        self
    }

    pub fn access(&self) -> Access {
        if self.public {
            Access::Public
        } else {
            Access::Authenticated
        }
    }

    // Zero page sizes would make every page look like the last one.
    fn sanitized(mut self) -> Self {
        self.feed_page_size = self.feed_page_size.max(1);
        self.search_page_size = self.search_page_size.max(1);
        self.comment_page_size = self.comment_page_size.max(1);
        self.suggestion_limit = self.suggestion_limit.max(1);
        self
    }
}

fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME").ok().map(|h| fallback.iter().fold(PathBuf::from(h), |p, c| p.join(c)))
        })
        .unwrap_or_else(|| fallback.iter().collect())
}

/// `$XDG_CONFIG_HOME/keepsake/config.toml`, falling back to `~/.config/...`.
pub fn config_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", &[".config"]).join("keepsake").join("config.toml")
}

/// `$XDG_STATE_HOME/keepsake/logs`, falling back to `~/.local/state/...`.
pub fn log_dir() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", &[".local", "state"]).join("keepsake").join("logs")
}
