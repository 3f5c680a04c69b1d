//! Client configuration.

use anyhow::{Context, Result, bail};
use chrono::Weekday;
use serde::Deserialize;
use serene_core::Credentials;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
    #[serde(default = "default_week_starts_on")]
    pub week_starts_on: String,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_token_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("serene")
        .join("token")
}

fn default_week_starts_on() -> String {
    "sunday".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            token_file: default_token_file(),
            week_starts_on: default_week_starts_on(),
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config/default.toml`, then `<config dir>/serene/config.toml`,
    /// falling back to defaults.
    pub fn load() -> Result<Self> {
        let candidates = [
            Some(PathBuf::from("config/default.toml")),
            dirs::config_dir().map(|d| d.join("serene").join("config.toml")),
        ];
        for path in candidates.into_iter().flatten() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Config::default())
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be positive");
        }
        self.week_start()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn week_start(&self) -> Result<Weekday> {
        self.week_starts_on
            .parse::<Weekday>()
            .map_err(|_| anyhow::anyhow!("invalid week_starts_on '{}'", self.week_starts_on))
    }

    /// Credentials from an explicit token, else from `token_file`.
    pub fn credentials(&self, token: Option<String>) -> Result<Credentials> {
        let credentials = match token {
            Some(token) => Credentials::bearer(token),
            None => {
                let content = std::fs::read_to_string(&self.token_file).with_context(|| {
                    format!(
                        "no token given and token file {} is unreadable (use --token or SERENE_TOKEN)",
                        self.token_file.display()
                    )
                })?;
                Credentials::bearer(content)
            }
        };
        if credentials.is_empty() {
            bail!("access token is empty");
        }
        Ok(credentials)
    }
}
