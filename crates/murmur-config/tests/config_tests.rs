// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Murmur configuration system.

use murmur_config::diagnostic::ConfigError;
use murmur_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn full_toml_deserializes() {
    let toml = r#"
[bot]
name = "transcriber"
log_level = "debug"

[telegram]
bot_token = "123:ABC"

[whisper]
default_model = "small"
valid_models = ["tiny", "small", "large-v3"]

[rate_limit]
model_change_cooldown_secs = 5

[dispatcher]
workers = 2
max_concurrent = 2

[general]
restart_on_connection_failure = false
reconnect_delay_secs = 3
max_reconnect_attempts = 4

[transcriber]
program = "/usr/local/bin/transcribe-url"
args = ["{url}", "--model={model}"]
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.bot.name, "transcriber");
    assert_eq!(config.bot.log_level, "debug");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.whisper.default_model, "small");
    assert_eq!(config.whisper.valid_models, vec!["tiny", "small", "large-v3"]);
    assert_eq!(config.rate_limit.model_change_cooldown_secs, 5);
    assert_eq!(config.dispatcher.workers, 2);
    assert_eq!(config.dispatcher.max_concurrent, 2);
    assert!(!config.general.restart_on_connection_failure);
    assert_eq!(config.general.reconnect_delay_secs, 3);
    assert_eq!(config.general.max_reconnect_attempts, Some(4));
    assert_eq!(config.transcriber.program, "/usr/local/bin/transcribe-url");
    assert_eq!(config.transcriber.args, vec!["{url}", "--model={model}"]);
}

/// Missing optional sections use defaults without error.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.bot.name, "murmur");
    assert_eq!(config.bot.log_level, "info");
    assert!(config.telegram.bot_token.is_none());
    assert_eq!(config.whisper.default_model, "medium.en");
    assert_eq!(config.rate_limit.model_change_cooldown_secs, 20);
    assert_eq!(config.dispatcher.workers, 1);
    assert!(config.general.restart_on_connection_failure);
    assert_eq!(config.transcriber.program, "murmur-transcribe");
}

/// Unknown field in a section is rejected by deny_unknown_fields.
#[test]
fn unknown_field_in_whisper_is_rejected() {
    let toml = r#"
[whisper]
default_modle = "small"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("default_modle"),
        "error should mention the bad key, got: {err_str}"
    );
}

/// Unexpected top-level section is rejected.
#[test]
fn unknown_top_level_section_is_rejected() {
    let toml = r#"
[logging]
level = "debug"
"#;

    assert!(load_config_from_str(toml).is_err());
}

/// The diagnostic for an unknown key carries a suggestion and the valid keys.
#[test]
fn unknown_key_diagnostic_suggests_fix() {
    let toml = r#"
[rate_limit]
model_change_cooldown = 5
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "model_change_cooldown"
                && suggestion.as_deref() == Some("model_change_cooldown_secs")
                && valid_keys.contains("model_change_cooldown_secs")
        })
    });
    assert!(found, "expected UnknownKey with suggestion, got: {errors:?}");
}

/// A string where a number is expected produces a type diagnostic.
#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[dispatcher]
workers = "many"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("workers"))),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_rejects_unselectable_default_model() {
    let toml = r#"
[whisper]
default_model = "huge"
valid_models = ["tiny", "base"]
"#;

    let errors = load_and_validate_str(toml).expect_err("default model must be valid");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("default_model"))
    ));
}

/// ConfigError renders through miette with its help text.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "workres".to_string(),
        suggestion: Some("workers".to_string()),
        valid_keys: "workers, max_concurrent".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some());
    let help = error.help().expect("should have help text").to_string();
    assert!(help.contains("did you mean `workers`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("workres"));
}

/// Loading from an explicit path reads the file and attaches its source to diagnostics.
#[test]
fn load_from_path_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("murmur.toml");
    std::fs::write(&path, "[whisper]\ndefault_model = \"tiny\"\n").unwrap();

    let config = load_and_validate_path(&path).expect("file config should validate");
    assert_eq!(config.whisper.default_model, "tiny");
}

/// A missing explicit file falls back to defaults (Figment skips absent files).
#[test]
fn load_from_missing_path_uses_defaults() {
    let config = load_and_validate_path(std::path::Path::new("/nonexistent/murmur.toml"))
        .expect("missing file should be skipped");
    assert_eq!(config.bot.name, "murmur");
}
