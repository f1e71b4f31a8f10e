//! Environment-driven configuration.
//!
//! Missing credentials and database settings are startup-fatal; a missing
//! destination channel only degrades broadcasting to a warned no-op.

use std::time::Duration;

use thiserror::Error;

use checkin_model::ChatId;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PERIOD: Duration = Duration::from_secs(5 * 60);

/// The five stock reading questions, in rotation order.
pub const DEFAULT_QUESTIONS: [&str; 5] = [
    "What book are you currently reading?",
    "How many pages did you read today?",
    "What's the most interesting thing you've learned so far?",
    "Are you on track with your reading goals?",
    "Would you recommend this book to others? Why or why not?",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingVar(&'static str),

    #[error("invalid {name}: {message}")]
    Invalid {
        name: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub telegram: TelegramConfig,
    pub checkin: CheckinConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Broadcast destination. `None` runs the bot in degraded mode:
    /// inbound replies and the query API still work, broadcasts are
    /// skipped with a warning.
    pub channel: Option<ChatId>,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct CheckinConfig {
    pub period: Duration,
    pub questions: Vec<String>,
}

impl Config {
    /// Loads configuration from the environment. `dotenvy` has already
    /// populated it from `.env` by the time this runs.
    pub fn load() -> Result<Config, ConfigError> {
        let host = env_or("HOST", DEFAULT_HOST);
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                message: format!("`{raw}` is not a port number"),
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let url = require_var("DATABASE_URL")?;
        if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
            return Err(ConfigError::Invalid {
                name: "DATABASE_URL",
                message: "must start with postgres:// or postgresql://".to_string(),
            });
        }

        let bot_token = require_var("TELEGRAM_BOT_TOKEN")?;
        let channel = std::env::var("TELEGRAM_CHANNEL_ID")
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(ChatId::from);

        let period = match std::env::var("CHECKIN_PERIOD") {
            Ok(raw) => parse_period(&raw)?,
            Err(_) => DEFAULT_PERIOD,
        };
        let questions = match std::env::var("CHECKIN_QUESTIONS") {
            Ok(raw) => parse_questions(&raw)?,
            Err(_) => DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        };

        Ok(Config {
            server: ServerConfig { host, port },
            database: DatabaseConfig { url },
            telegram: TelegramConfig { bot_token, channel },
            checkin: CheckinConfig { period, questions },
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

fn parse_period(raw: &str) -> Result<Duration, ConfigError> {
    let period = humantime::parse_duration(raw).map_err(|err| ConfigError::Invalid {
        name: "CHECKIN_PERIOD",
        message: err.to_string(),
    })?;
    if period.is_zero() {
        return Err(ConfigError::Invalid {
            name: "CHECKIN_PERIOD",
            message: "period must be positive".to_string(),
        });
    }
    Ok(period)
}

/// Splits a `|`-separated question list, dropping blank entries. An
/// override that leaves nothing to rotate is a configuration error, not
/// an empty catalog.
fn parse_questions(raw: &str) -> Result<Vec<String>, ConfigError> {
    let questions: Vec<String> = raw
        .split('|')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect();
    if questions.is_empty() {
        return Err(ConfigError::Invalid {
            name: "CHECKIN_QUESTIONS",
            message: "no usable questions in override".to_string(),
        });
    }
    Ok(questions)
}
