//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or an explicit path), then applies the `EXPENSE_BOT_LOG_LEVEL` override.
//! The bot token is a secret and is only ever read from `TG_BOT_TOKEN`.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

/// Env var holding the Telegram bot token.
pub const TOKEN_ENV: &str = "TG_BOT_TOKEN";

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Telegram channel configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Whether the Telegram channel is enabled.
    pub enabled: bool,
}

/// PTY (console) channel configuration.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    pub enabled: bool,
    /// Conversation id the console speaks as.
    pub conversation_id: i64,
}

#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub telegram: TelegramConfig,
    pub pty: PtyConfig,
}

/// Fully-resolved bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    pub log_level: String,
    /// Append logs here instead of stderr (already expanded, no `~`).
    pub log_file: Option<PathBuf>,
    pub comms: CommsConfig,
    /// From `TG_BOT_TOKEN`. Never sourced from TOML.
    pub bot_token: Option<String>,
}

impl Config {
    pub fn comms_telegram_should_load(&self) -> bool {
        self.comms.telegram.enabled
    }

    pub fn comms_pty_should_load(&self) -> bool {
        self.comms.pty.enabled
    }

    /// The bot token, required whenever the Telegram channel is enabled.
    ///
    /// Checked once at startup so a missing credential stops the process
    /// before any channel is spawned.
    pub fn require_bot_token(&self) -> Result<&str, AppError> {
        self.bot_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Config(format!("{TOKEN_ENV} is not set")))
    }
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    bot: RawBot,
    #[serde(default)]
    comms: RawComms,
}

#[derive(Deserialize)]
struct RawBot {
    #[serde(default = "default_bot_name")]
    name: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    log_file: Option<String>,
}

impl Default for RawBot {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

#[derive(Deserialize, Default)]
struct RawComms {
    #[serde(default)]
    telegram: RawTelegram,
    #[serde(default)]
    pty: RawPty,
}

#[derive(Deserialize)]
struct RawTelegram {
    /// Defaults to `true`: the bot exists to talk to Telegram.
    #[serde(default = "default_true")]
    enabled: bool,
}

impl Default for RawTelegram {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Deserialize, Default)]
struct RawPty {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    conversation_id: i64,
}

fn default_bot_name() -> String {
    "My expenses".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// Load config from `path` (or `config/default.toml`), then apply env overrides.
pub fn load(path: Option<&str>) -> Result<Config, AppError> {
    let path = Path::new(path.unwrap_or(DEFAULT_CONFIG_PATH));
    let log_level_override = env::var("EXPENSE_BOT_LOG_LEVEL").ok();
    let bot_token = env::var(TOKEN_ENV).ok();
    load_from(path, log_level_override.as_deref(), bot_token)
}

/// Internal loader — accepts an explicit path and overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    log_level_override: Option<&str>,
    bot_token: Option<String>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let log_level = log_level_override
        .unwrap_or(&parsed.bot.log_level)
        .to_string();

    Ok(Config {
        bot_name: parsed.bot.name,
        log_level,
        log_file: parsed.bot.log_file.as_deref().map(expand_home),
        comms: CommsConfig {
            telegram: TelegramConfig {
                enabled: parsed.comms.telegram.enabled,
            },
            pty: PtyConfig {
                enabled: parsed.comms.pty.enabled,
                conversation_id: parsed.comms.pty.conversation_id,
            },
        },
        bot_token,
    })
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
impl Config {
    /// Console-only config for unit tests — no token, no network.
    pub fn test_default() -> Self {
        Self {
            bot_name: "test".into(),
            log_level: "info".into(),
            log_file: None,
            comms: CommsConfig {
                telegram: TelegramConfig { enabled: false },
                pty: PtyConfig {
                    enabled: true,
                    conversation_id: 0,
                },
            },
            bot_token: None,
        }
    }
}
