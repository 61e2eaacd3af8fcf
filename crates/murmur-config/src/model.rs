// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Murmur transcription bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Murmur configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MurmurConfig {
    /// Bot identity and logging.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Whisper model selection.
    #[serde(default)]
    pub whisper: WhisperConfig,

    /// Per-user rate limits.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Job dispatcher settings.
    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    /// Process-level connection behavior.
    #[serde(default)]
    pub general: GeneralConfig,

    /// External transcriber program.
    #[serde(default)]
    pub transcriber: TranscriberConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name of the bot, used in the startup banner.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_bot_name() -> String {
    "murmur".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `murmur serve`.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Whisper model configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhisperConfig {
    /// Model used for users who never picked one.
    #[serde(default = "default_whisper_model")]
    pub default_model: String,

    /// Models users may select with `/model`.
    #[serde(default = "default_valid_models")]
    pub valid_models: Vec<String>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            default_model: default_whisper_model(),
            valid_models: default_valid_models(),
        }
    }
}

fn default_whisper_model() -> String {
    "medium.en".to_string()
}

fn default_valid_models() -> Vec<String> {
    [
        "tiny", "tiny.en", "base", "base.en", "small", "small.en", "medium", "medium.en",
        "large", "large-v3",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Per-user rate limit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Minimum seconds between two accepted model changes of the same user.
    #[serde(default = "default_model_change_cooldown_secs")]
    pub model_change_cooldown_secs: u64,
}

impl RateLimitConfig {
    /// The cooldown as a [`Duration`].
    pub fn model_change_cooldown(&self) -> Duration {
        Duration::from_secs(self.model_change_cooldown_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            model_change_cooldown_secs: default_model_change_cooldown_secs(),
        }
    }
}

fn default_model_change_cooldown_secs() -> u64 {
    20
}

/// Job dispatcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatcherConfig {
    /// Number of consumer loops draining the job queue.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Maximum number of transcriptions in flight across all workers.
    /// Must not exceed what the backend can hold in memory at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

fn default_workers() -> usize {
    1
}

fn default_max_concurrent() -> usize {
    1
}

/// Process-level connection configuration, consumed by the serve loop.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Retry the channel connection after a failure instead of exiting.
    #[serde(default = "default_restart_on_connection_failure")]
    pub restart_on_connection_failure: bool,

    /// Seconds to wait between connection attempts.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    /// Upper bound on connection attempts. `None` retries forever.
    #[serde(default)]
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            restart_on_connection_failure: default_restart_on_connection_failure(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            max_reconnect_attempts: None,
        }
    }
}

fn default_restart_on_connection_failure() -> bool {
    true
}

fn default_reconnect_delay_secs() -> u64 {
    10
}

/// External transcriber program configuration.
///
/// The program is run once per URL. `{url}` and `{model}` in `args` are
/// replaced before spawning; its standard output is sent back to the user.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TranscriberConfig {
    /// Program to execute (looked up in `PATH` if not absolute).
    #[serde(default = "default_transcriber_program")]
    pub program: String,

    /// Argument template.
    #[serde(default = "default_transcriber_args")]
    pub args: Vec<String>,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            program: default_transcriber_program(),
            args: default_transcriber_args(),
        }
    }
}

fn default_transcriber_program() -> String {
    "murmur-transcribe".to_string()
}

fn default_transcriber_args() -> Vec<String> {
    vec!["--model".into(), "{model}".into(), "{url}".into()]
}
