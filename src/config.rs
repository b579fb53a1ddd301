use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// What to do with a qualifying message that carries no guild id.
/// Without a guild the source link cannot be built.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingGuildPolicy {
    /// Drop the message without relaying it.
    #[default]
    Skip,
    /// Relay the message but leave out the link section.
    OmitLink,
    /// Treat the message as malformed and log an error.
    Error,
}

impl std::fmt::Display for MissingGuildPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingGuildPolicy::Skip => write!(f, "skip"),
            MissingGuildPolicy::OmitLink => write!(f, "omit_link"),
            MissingGuildPolicy::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord: DiscordConfig,
    pub slack: SlackConfig,
    pub translation: TranslationConfig,
    pub display: DisplayConfig,
    pub relay: RelayConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub target_channel_id: u64,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub webhook_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranslationConfig {
    #[serde(default = "default_target_language")]
    pub target_language: String,
    /// Hangul share above which text counts as already translated.
    #[serde(default = "default_script_ratio_threshold")]
    pub script_ratio_threshold: f64,
    #[serde(default = "default_translate_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    #[serde(default = "default_zone_label")]
    pub zone_label: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RelayConfig {
    #[serde(default)]
    pub missing_guild: MissingGuildPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Tuning values read from the optional TOML file.
/// Credentials never live here; they come from the environment.
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default = "default_translation_config")]
    translation: TranslationConfig,
    #[serde(default = "default_display_config")]
    display: DisplayConfig,
    #[serde(default)]
    relay: RelayConfig,
    #[serde(default = "default_http_config")]
    http: HttpConfig,
}

pub const ENV_DISCORD_TOKEN: &str = "DISCORD_TOKEN";
pub const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
pub const ENV_TARGET_CHANNEL_ID: &str = "TARGET_CHANNEL_ID";

fn default_target_language() -> String {
    "ko".to_string()
}

fn default_script_ratio_threshold() -> f64 {
    0.3
}

fn default_translate_endpoint() -> String {
    "https://translate.googleapis.com".to_string()
}

fn default_utc_offset_hours() -> i32 {
    9
}

fn default_zone_label() -> String {
    "KST".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_translation_config() -> TranslationConfig {
    TranslationConfig {
        target_language: default_target_language(),
        script_ratio_threshold: default_script_ratio_threshold(),
        endpoint: default_translate_endpoint(),
    }
}

fn default_display_config() -> DisplayConfig {
    DisplayConfig {
        utc_offset_hours: default_utc_offset_hours(),
        zone_label: default_zone_label(),
    }
}

fn default_http_config() -> HttpConfig {
    HttpConfig {
        timeout_secs: default_timeout_secs(),
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        default_translation_config()
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        default_display_config()
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        default_http_config()
    }
}

impl Config {
    /// Load tuning values from `path` (defaults if the file does not exist)
    /// and the required credentials from the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        let content = if path.exists() {
            Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?,
            )
        } else {
            None
        };

        Self::from_sources(content.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build a config from optional TOML text and an environment lookup.
    pub fn from_sources<F>(toml_text: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: FileConfig = match toml_text {
            Some(text) => toml::from_str(text).context("Failed to parse config file")?,
            None => FileConfig::default(),
        };

        let required = |key: &str| -> Result<String> {
            env(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .with_context(|| format!("Missing required environment variable: {}", key))
        };

        let token = required(ENV_DISCORD_TOKEN)?;
        let webhook_url = required(ENV_SLACK_WEBHOOK_URL)?;
        let raw_channel_id = required(ENV_TARGET_CHANNEL_ID)?;

        let target_channel_id: u64 = raw_channel_id.parse().with_context(|| {
            format!(
                "{} must be a numeric channel id, got '{}'",
                ENV_TARGET_CHANNEL_ID, raw_channel_id
            )
        })?;

        let config = Config {
            discord: DiscordConfig {
                token,
                target_channel_id,
            },
            slack: SlackConfig { webhook_url },
            translation: file.translation,
            display: file.display,
            relay: file.relay,
            http: file.http,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.discord.target_channel_id == 0 {
            anyhow::bail!("{} must be a non-zero channel id", ENV_TARGET_CHANNEL_ID);
        }

        let url = &self.slack.webhook_url;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            anyhow::bail!("{} must be an http(s) URL, got '{}'", ENV_SLACK_WEBHOOK_URL, url);
        }

        let threshold = self.translation.script_ratio_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!(
                "translation.script_ratio_threshold must be between 0 and 1, got {}",
                threshold
            );
        }

        if self.translation.target_language.trim().is_empty() {
            anyhow::bail!("translation.target_language must not be empty");
        }

        if !(-23..=23).contains(&self.display.utc_offset_hours) {
            anyhow::bail!(
                "display.utc_offset_hours must be within -23..=23, got {}",
                self.display.utc_offset_hours
            );
        }

        if self.http.timeout_secs == 0 {
            anyhow::bail!("http.timeout_secs must be greater than zero");
        }

        Ok(())
    }
}
