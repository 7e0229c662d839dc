//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Keychain service name used for Slack credentials.
const KEYRING_SERVICE: &str = "group-organizer";

/// File name of the shared record when state is not keyed by channel.
pub const SHARED_STATE_FILE: &str = "group_bot_data.json";

/// Nested Slack configuration for Socket Mode connectivity.
///
/// Tokens are loaded at runtime via OS keychain or environment variables,
/// never from the TOML config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SlackConfig {
    /// App-level token used for Socket Mode (populated at runtime).
    #[serde(skip)]
    pub app_token: String,
    /// Bot user token used for posting messages (populated at runtime).
    #[serde(skip)]
    pub bot_token: String,
}

/// Static informational command that replies with a single link button.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct InfoLinkConfig {
    /// Slash command name without the leading slash.
    #[serde(default = "default_info_command")]
    pub command: String,
    /// Bold heading line of the reply.
    #[serde(default = "default_info_title")]
    pub title: String,
    /// Body text of the reply.
    #[serde(default = "default_info_text")]
    pub text: String,
    /// Label of the URL button.
    #[serde(default = "default_info_button_label")]
    pub button_label: String,
    /// Target of the URL button.
    #[serde(default = "default_info_url")]
    pub url: String,
}

impl Default for InfoLinkConfig {
    fn default() -> Self {
        Self {
            command: default_info_command(),
            title: default_info_title(),
            text: default_info_text(),
            button_label: default_info_button_label(),
            url: default_info_url(),
        }
    }
}

fn default_info_command() -> String {
    "dtek".into()
}

fn default_info_title() -> String {
    "⚡️ DTEK (Dnipro)".into()
}

fn default_info_text() -> String {
    "Open the official DTEK Dniprovski Elektromerezhi Telegram bot to check outages and schedules."
        .into()
}

fn default_info_button_label() -> String {
    "Open the DTEK Telegram bot".into()
}

fn default_info_url() -> String {
    "https://t.me/DTEKDniprovskiElektromerezhiBot".into()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_timezone() -> String {
    "Europe/Zaporozhye".into()
}

fn default_true() -> bool {
    true
}

fn default_http_port() -> u16 {
    8080
}

fn default_max_open_polls() -> usize {
    100
}

fn default_duty_roster() -> Vec<String> {
    ["Tanya", "Lena", "Ira", "Ellada"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

fn default_random_plans() -> Vec<String> {
    [
        "tea + silly stories",
        "an easy bike ride (no heroics)",
        "coffee/dessert + photos",
        "board games/a movie + pizza",
        "a walk + chatter",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Directory holding the durable state records.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// IANA time zone used for timestamps and reminders.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Keep one state record per channel instead of a single shared one.
    #[serde(default = "default_true")]
    pub per_channel_state: bool,
    /// Ordered duty roster rotated by `/duty`.
    #[serde(default = "default_duty_roster")]
    pub duty_roster: Vec<String>,
    /// Base plans drawn by `/random`.
    #[serde(default = "default_random_plans")]
    pub random_plans: Vec<String>,
    /// Open polls kept in memory; opening one more closes the oldest.
    #[serde(default = "default_max_open_polls")]
    pub max_open_polls: usize,
    /// HTTP port for the health endpoint; 0 disables it.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Informational link command.
    #[serde(default)]
    pub info_link: InfoLinkConfig,
    /// Slack connectivity settings.
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(skip)]
    tz: Option<Tz>,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load Slack credentials from OS keychain with env-var fallback.
    ///
    /// Tries the `group-organizer` keyring service first, then falls
    /// back to `SLACK_APP_TOKEN` / `SLACK_BOT_TOKEN` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither keychain nor env vars provide
    /// the required tokens.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.slack.app_token = load_credential("slack_app_token", "SLACK_APP_TOKEN").await?;
        self.slack.bot_token = load_credential("slack_bot_token", "SLACK_BOT_TOKEN").await?;
        Ok(())
    }

    /// Parsed time zone.
    #[must_use]
    pub fn tz(&self) -> Tz {
        self.tz.unwrap_or(chrono_tz::UTC)
    }

    /// Path of the durable record used for `channel_id`.
    ///
    /// Channel ids are reduced to `[A-Za-z0-9_-]` before use as a file name.
    #[must_use]
    pub fn state_path(&self, channel_id: &str) -> PathBuf {
        if !self.per_channel_state {
            return self.data_dir.join(SHARED_STATE_FILE);
        }
        let safe: String = channel_id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if safe.is_empty() {
            self.data_dir.join(SHARED_STATE_FILE)
        } else {
            self.data_dir.join(format!("{safe}.json"))
        }
    }

    fn validate(&mut self) -> Result<()> {
        let tz: Tz = self.timezone.parse().map_err(|err| {
            AppError::Config(format!("unknown timezone {}: {err}", self.timezone))
        })?;
        self.tz = Some(tz);

        self.random_plans.retain(|plan| !plan.trim().is_empty());
        if self.random_plans.is_empty() {
            return Err(AppError::Config("random_plans must not be empty".into()));
        }

        if self.max_open_polls == 0 {
            return Err(AppError::Config("max_open_polls must be at least 1".into()));
        }

        let command = self.info_link.command.trim_start_matches('/').to_lowercase();
        if command.is_empty() {
            return Err(AppError::Config("info_link.command must not be empty".into()));
        }
        self.info_link.command = command;

        if self.duty_roster.is_empty() {
            warn!("duty_roster is empty; /duty will report a configuration error");
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    env::var(env_key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            AppError::Config(format!(
                "credential {keyring_key} not found in keychain or {env_key} env var"
            ))
        })
}
