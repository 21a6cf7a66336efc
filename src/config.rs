use crate::error::BotError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api1.correos.es/digital-services/searchengines/api/v1/";

/// Token values shipped in sample configs that must be replaced before running.
const PLACEHOLDER_TOKENS: &[&str] = &["TU_BOT_TOKEN", "YOUR_BOT_TOKEN"];

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub chat_id: i64,
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    #[serde(default = "default_command_poll_interval")]
    pub command_poll_interval_seconds: u64,
    pub data_file: Option<PathBuf>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

const fn default_check_interval() -> u64 {
    300
}

const fn default_command_poll_interval() -> u64 {
    1
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_language() -> String {
    "ES".to_string()
}

impl Config {
    pub fn load(explicit_path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => config_file_path()?,
        };
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            BotError::ConfigInvalid(format!(
                "Cannot read config at {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let config: Self = toml::from_str(&contents).map_err(|e| {
            BotError::ConfigInvalid(format!("Invalid TOML in {}: {}", config_path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let token = self.telegram_bot_token.trim();
        if token.is_empty() {
            anyhow::bail!("telegram_bot_token must not be empty");
        }
        if PLACEHOLDER_TOKENS.contains(&token) {
            anyhow::bail!("telegram_bot_token still holds the placeholder value");
        }
        if self.chat_id == 0 {
            anyhow::bail!("chat_id must be set to the destination chat");
        }
        if self.command_poll_interval_seconds == 0 {
            anyhow::bail!("command_poll_interval_seconds must be at least 1");
        }
        if self.check_interval_seconds < self.command_poll_interval_seconds {
            anyhow::bail!(
                "check_interval_seconds must not be shorter than command_poll_interval_seconds"
            );
        }
        if self.api_url.trim().is_empty() {
            anyhow::bail!("api_url must not be empty");
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds)
    }

    pub fn command_poll_interval(&self) -> Duration {
        Duration::from_secs(self.command_poll_interval_seconds)
    }

    pub fn effective_data_file(&self) -> PathBuf {
        if let Some(ref path) = self.data_file {
            return path.clone();
        }
        default_data_file()
    }
}

fn config_file_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BotError::ConfigInvalid("Cannot determine home directory".to_string()))?;
    Ok(home
        .join(".config")
        .join("correos-tracker")
        .join("config.toml"))
}

pub fn default_data_file() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join("correos-tracker").join("tracking_data.json"),
        None => PathBuf::from("tracking_data.json"),
    }
}
