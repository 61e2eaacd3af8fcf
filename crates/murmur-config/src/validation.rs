// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as the default model being selectable or worker counts being positive.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::MurmurConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MurmurConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.bot.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "bot.log_level `{}` must be one of: {}",
            config.bot.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    let whisper = &config.whisper;
    if whisper.valid_models.is_empty() {
        errors.push(ConfigError::validation(
            "whisper.valid_models must list at least one model",
        ));
    }

    let mut seen = HashSet::new();
    for model in &whisper.valid_models {
        if model.trim().is_empty() {
            errors.push(ConfigError::validation(
                "whisper.valid_models must not contain empty names",
            ));
        } else if !seen.insert(model.as_str()) {
            errors.push(ConfigError::validation(format!(
                "duplicate model `{model}` in whisper.valid_models"
            )));
        }
    }

    if !whisper.valid_models.contains(&whisper.default_model) {
        errors.push(ConfigError::validation(format!(
            "whisper.default_model `{}` is not listed in whisper.valid_models",
            whisper.default_model
        )));
    }

    if config.dispatcher.workers == 0 {
        errors.push(ConfigError::validation("dispatcher.workers must be at least 1"));
    }

    if config.dispatcher.max_concurrent == 0 {
        errors.push(ConfigError::validation(
            "dispatcher.max_concurrent must be at least 1",
        ));
    }

    if config.transcriber.program.trim().is_empty() {
        errors.push(ConfigError::validation(
            "transcriber.program must not be empty",
        ));
    }

    if config.general.max_reconnect_attempts == Some(0) {
        errors.push(ConfigError::validation(
            "general.max_reconnect_attempts must be at least 1 when set",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&MurmurConfig::default()).is_ok());
    }

    #[test]
    fn default_model_must_be_valid() {
        let mut config = MurmurConfig::default();
        config.whisper.valid_models = vec!["tiny".into(), "base".into()];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "whisper.default_model"));
    }

    #[test]
    fn empty_model_list_fails() {
        let mut config = MurmurConfig::default();
        config.whisper.valid_models.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "at least one model"));
    }

    #[test]
    fn duplicate_models_fail() {
        let mut config = MurmurConfig::default();
        config.whisper.valid_models.push("tiny".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "duplicate model `tiny`"));
    }

    #[test]
    fn zero_workers_and_capacity_fail_together() {
        let mut config = MurmurConfig::default();
        config.dispatcher.workers = 0;
        config.dispatcher.max_concurrent = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(has_error(&errors, "dispatcher.workers"));
        assert!(has_error(&errors, "dispatcher.max_concurrent"));
    }

    #[test]
    fn unknown_log_level_fails() {
        let mut config = MurmurConfig::default();
        config.bot.log_level = "verbose".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "bot.log_level"));
    }

    #[test]
    fn zero_reconnect_attempts_fails() {
        let mut config = MurmurConfig::default();
        config.general.max_reconnect_attempts = Some(0);
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "max_reconnect_attempts"));
    }
}
