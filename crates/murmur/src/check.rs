// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `murmur check-config` command implementation.
//!
//! Reports what the loaded configuration resolves to and whether the
//! collaborators it names are usable, without connecting to Telegram.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use murmur_config::model::MurmurConfig;
use murmur_core::error::MurmurError;
use murmur_core::traits::PluginAdapter;
use murmur_core::types::HealthStatus;
use murmur_whisper::CommandTranscriber;

/// Status of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Runs every check and prints a report.
///
/// Fails when any check fails, so the command can gate a deployment.
pub async fn run_check(config: &MurmurConfig, plain: bool) -> Result<(), MurmurError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_models(config),
        check_rate_limit(config),
        check_dispatcher(config),
        check_telegram_token(config),
        check_transcriber(config).await,
    ];

    println!();
    println!("  murmur check-config");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", format_line(result, use_color));
    }
    println!();

    let failed = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    let warned = results
        .iter()
        .filter(|r| r.status == CheckStatus::Warn)
        .count();

    match (failed, warned) {
        (0, 0) => println!("  All checks passed."),
        (0, n) => println!("  {n} warning(s)."),
        (f, w) => println!("  {f} check(s) failed, {w} warning(s)."),
    }
    println!();

    if failed > 0 {
        return Err(MurmurError::Config(format!("{failed} check(s) failed")));
    }
    Ok(())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red()),
        };
        format!(
            "    {symbol} {:<20} {message} ({duration_ms}ms)",
            result.name
        )
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

fn check_models(config: &MurmurConfig) -> CheckResult {
    let start = Instant::now();
    let whisper = &config.whisper;
    CheckResult::new(
        "Models",
        CheckStatus::Pass,
        format!(
            "default {} ({} selectable)",
            whisper.default_model,
            whisper.valid_models.len()
        ),
        start,
    )
}

fn check_rate_limit(config: &MurmurConfig) -> CheckResult {
    let start = Instant::now();
    let secs = config.rate_limit.model_change_cooldown_secs;
    if secs == 0 {
        return CheckResult::new(
            "Rate limit",
            CheckStatus::Warn,
            "model changes are not rate limited",
            start,
        );
    }
    CheckResult::new(
        "Rate limit",
        CheckStatus::Pass,
        format!("one model change per {secs}s"),
        start,
    )
}

fn check_dispatcher(config: &MurmurConfig) -> CheckResult {
    let start = Instant::now();
    let dispatcher = &config.dispatcher;
    let status = if dispatcher.max_concurrent > dispatcher.workers {
        CheckStatus::Warn
    } else {
        CheckStatus::Pass
    };
    let mut message = format!(
        "{} worker(s), {} concurrent transcription(s)",
        dispatcher.workers, dispatcher.max_concurrent
    );
    if status == CheckStatus::Warn {
        message.push_str(" (capacity above worker count is unused)");
    }
    CheckResult::new("Dispatcher", status, message, start)
}

fn check_telegram_token(config: &MurmurConfig) -> CheckResult {
    let start = Instant::now();
    match config.telegram.bot_token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => {
            CheckResult::new("Telegram token", CheckStatus::Pass, "configured", start)
        }
        _ => CheckResult::new(
            "Telegram token",
            CheckStatus::Fail,
            "missing (set telegram.bot_token or MURMUR_TELEGRAM_BOT_TOKEN)",
            start,
        ),
    }
}

async fn check_transcriber(config: &MurmurConfig) -> CheckResult {
    let start = Instant::now();
    let transcriber = CommandTranscriber::from_config(&config.transcriber);
    match transcriber.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new(
            "Transcriber",
            CheckStatus::Pass,
            format!("found {}", transcriber.program()),
            start,
        ),
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Transcriber", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Transcriber", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Transcriber", CheckStatus::Fail, e.to_string(), start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_fails() {
        let result = check_telegram_token(&MurmurConfig::default());
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(result.message.contains("MURMUR_TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn configured_token_passes() {
        let mut config = MurmurConfig::default();
        config.telegram.bot_token = Some("123:abc".into());
        assert_eq!(check_telegram_token(&config).status, CheckStatus::Pass);
    }

    #[test]
    fn zero_cooldown_warns() {
        let mut config = MurmurConfig::default();
        config.rate_limit.model_change_cooldown_secs = 0;
        assert_eq!(check_rate_limit(&config).status, CheckStatus::Warn);
        assert_eq!(
            check_rate_limit(&MurmurConfig::default()).message,
            "one model change per 20s"
        );
    }

    #[test]
    fn unused_gate_capacity_warns() {
        let mut config = MurmurConfig::default();
        config.dispatcher.max_concurrent = 4;
        let result = check_dispatcher(&config);
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.message.contains("1 worker(s), 4 concurrent"));
    }

    #[tokio::test]
    async fn missing_transcriber_program_fails() {
        let mut config = MurmurConfig::default();
        config.transcriber.program = "/nonexistent/murmur-transcribe".into();
        let result = check_transcriber(&config).await;
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(result.message.contains("not found"));
    }

    #[test]
    fn plain_lines_are_tagged() {
        let result = CheckResult {
            name: "Models".into(),
            status: CheckStatus::Warn,
            message: "odd".into(),
            duration: Duration::from_millis(3),
        };
        let line = format_line(&result, false);
        assert!(line.contains("[WARN]"));
        assert!(line.ends_with("odd (3ms)"));
    }

    #[tokio::test]
    async fn check_fails_without_token() {
        let mut config = MurmurConfig::default();
        config.transcriber.program = "sh".into();
        let err = run_check(&config, true).await.unwrap_err();
        assert!(matches!(err, MurmurError::Config(_)));
    }
}
