// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `murmur serve` command implementation.
//!
//! Wires the Telegram channel, the command transcriber and the pipeline
//! together, runs until SIGINT/SIGTERM or a fatal channel error, then drains.

use std::sync::Arc;
use std::time::Duration;

use murmur_agent::shutdown;
use murmur_agent::{BotLoop, Pipeline, ReconnectPolicy};
use murmur_config::model::MurmurConfig;
use murmur_core::error::MurmurError;
use murmur_core::traits::PluginAdapter;
use murmur_core::types::HealthStatus;
use murmur_telegram::TelegramChannel;
use murmur_whisper::CommandTranscriber;
use tracing::{error, info, warn};

/// How long shutdown waits for the dispatcher workers to reach `Stopped`.
///
/// An in-flight transcription is dropped as soon as cancellation fires.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the `murmur serve` command.
///
/// Returns the channel error that stopped the bot, if any, so the process
/// exits non-zero when reconnecting gave up.
pub async fn run_serve(config: MurmurConfig) -> Result<(), MurmurError> {
    init_tracing(&config.bot.log_level);

    info!(
        name = config.bot.name.as_str(),
        version = env!("CARGO_PKG_VERSION"),
        "starting murmur serve"
    );

    let channel = TelegramChannel::new(config.telegram.clone())?;
    let transcriber = Arc::new(CommandTranscriber::from_config(&config.transcriber));
    if let HealthStatus::Unhealthy(reason) = transcriber.health_check().await? {
        warn!(reason = reason.as_str(), "transcriber is not available, jobs will fail");
    }

    let pipeline = Pipeline::from_config(&config, transcriber);
    let policy = ReconnectPolicy::from_config(&config.general);

    let cancel = shutdown::install_signal_handler();
    let dispatcher = pipeline.start(cancel.clone());

    let mut bot = BotLoop::new(Box::new(channel), Arc::clone(&pipeline.admission));
    let result = bot.serve(&policy, &cancel).await;
    if let Err(e) = &result {
        error!(error = %e, "bot loop failed");
    }

    // Stop the dispatcher even when the bot loop failed on its own.
    cancel.cancel();
    if let Err(e) = bot.shutdown().await {
        warn!(error = %e, "channel shutdown failed");
    }

    let dropped = pipeline.shutdown(DRAIN_TIMEOUT).await;
    match dispatcher.await {
        Ok(stats) => info!(
            completed = stats.completed,
            failed = stats.failed,
            dropped,
            "murmur serve shutdown complete"
        ),
        Err(e) => error!(error = %e, "dispatcher task panicked"),
    }

    result
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("murmur={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
