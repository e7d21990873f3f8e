//! Application configuration from the environment.
//!
//! A `.env` file in the working directory is loaded first when present;
//! variables already set in the process environment win.

use std::path::PathBuf;
use std::time::Duration;

use cvfactory_engine::{ClientConfig, TransportKind};
use cvfactory_logging::LogDestination;
use thiserror::Error;

const PREFIX: &str = "CVFACTORY_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}: invalid value {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
    #[error(transparent)]
    Client(#[from] cvfactory_engine::ConfigError),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub notifications: bool,
    pub log_destination: LogDestination,
    pub state_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Missing .env is fine.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which receives full variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(&format!("{PREFIX}{name}"))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut client = match var("API_BASE_URL") {
            Some(raw) => ClientConfig::with_base_url(ClientConfig::parse_base_url(&raw)?),
            None => ClientConfig::for_hostname(var("HOST").as_deref().unwrap_or("localhost"))?,
        };

        if let Some(raw) = var("TRANSPORT") {
            client.transport = match raw.to_ascii_lowercase().as_str() {
                "stream" | "sse" => TransportKind::Stream,
                "poll" => TransportKind::Poll,
                _ => return Err(invalid("TRANSPORT", &raw, "expected stream or poll")),
            };
        }
        if let Some(raw) = var("POLL_INTERVAL_SECS") {
            let secs = parse_secs("POLL_INTERVAL_SECS", &raw)?;
            if secs == 0 {
                return Err(invalid("POLL_INTERVAL_SECS", &raw, "must be positive"));
            }
            client.poll_interval = Duration::from_secs(secs);
        }
        if let Some(raw) = var("MAX_TASK_SECS") {
            let secs = parse_secs("MAX_TASK_SECS", &raw)?;
            // 0 disables the limit.
            client.max_task_duration = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(path) = var("SUBMIT_PATH") {
            client.endpoints.submit = path;
        }
        if let Some(path) = var("CSRF_PATH") {
            client.endpoints.csrf = Some(path);
        }

        let notifications = match var("NOTIFICATIONS") {
            None => true,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "on" | "true" | "1" => true,
                "off" | "false" | "0" => false,
                _ => return Err(invalid("NOTIFICATIONS", &raw, "expected on or off")),
            },
        };

        let log_destination = match var("LOG") {
            None => LogDestination::File,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "file" => LogDestination::File,
                "terminal" => LogDestination::Terminal,
                "both" => LogDestination::Both,
                _ => return Err(invalid("LOG", &raw, "expected file, terminal or both")),
            },
        };

        let state_dir = var("STATE_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from);

        Ok(Self {
            client,
            notifications,
            log_destination,
            state_dir,
        })
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>()
        .map_err(|err| invalid(name, raw, &err.to_string()))
}

fn invalid(name: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: format!("{PREFIX}{name}"),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
