use std::env;
use std::fmt;
use std::path::PathBuf;

use dq_core::{Error, Result};
use dq_storage::DEFAULT_STATE_FILE;
use tracing::Level;

pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";
pub const STATE_FILE_VAR: &str = "DAILY_QUOTE_STATE_FILE";
pub const LOG_LEVEL_VAR: &str = "DAILY_QUOTE_LOG";

/// Exit status used when a required credential is missing.
pub const EXIT_MISSING_CREDENTIALS: u8 = 1;

/// Run configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub chat_id: String,
    pub state_file: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("state_file", &self.state_file)
            .finish()
    }
}

/// Loads a `.env` file if present (development)
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

pub fn log_level_from_env() -> Level {
    env::var(LOG_LEVEL_VAR)
        .map(|level| dq_core::parse_level(&level))
        .unwrap_or(Level::INFO)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::CredentialMissing(key.to_string()))
        };

        Ok(Self {
            bot_token: required(BOT_TOKEN_VAR)?,
            chat_id: required(CHAT_ID_VAR)?,
            state_file: lookup(STATE_FILE_VAR)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
        })
    }
}
