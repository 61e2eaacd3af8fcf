// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot loop, message admission and commands for the Murmur transcription bot.
//!
//! The [`BotLoop`] is the inbound coordinator that:
//! - Connects the channel adapter, retrying per [`ReconnectPolicy`]
//! - Receives messages and handles each one in its own task
//! - Routes plain text to the [`AdmissionPath`] and commands to their handlers
//! - Waits for in-flight message tasks on shutdown

pub mod admission;
pub mod commands;
pub mod pipeline;
pub mod reconnect;
pub mod shutdown;

use std::sync::Arc;

use murmur_core::error::MurmurError;
use murmur_core::types::{InboundMessage, MessageContent, ReplyFormat};
use murmur_core::{ChannelAdapter, PluginAdapter};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

pub use admission::{Admission, AdmissionError, AdmissionPath};
pub use commands::{Command, ModelChangeOutcome};
pub use pipeline::Pipeline;
pub use reconnect::{ReconnectPolicy, connect_with_retry};

/// Receives messages from a channel adapter and hands them to the admission
/// path, one task per message.
pub struct BotLoop {
    channel: Box<dyn ChannelAdapter>,
    admission: Arc<AdmissionPath>,
    tracker: TaskTracker,
}

impl BotLoop {
    pub fn new(channel: Box<dyn ChannelAdapter>, admission: Arc<AdmissionPath>) -> Self {
        info!(channel = channel.name(), "bot loop initialized");
        Self {
            channel,
            admission,
            tracker: TaskTracker::new(),
        }
    }

    /// Connects and runs until `cancel` fires, reconnecting after channel
    /// failures while `policy` allows.
    ///
    /// Always waits for in-flight message tasks before returning, so every
    /// message that was received has been admitted or answered.
    pub async fn serve(
        &mut self,
        policy: &ReconnectPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), MurmurError> {
        let result = self.connect_and_run(policy, cancel).await;

        self.tracker.close();
        info!(in_flight = self.tracker.len(), "waiting for message tasks");
        self.tracker.wait().await;
        info!("bot loop stopped");
        result
    }

    async fn connect_and_run(
        &mut self,
        policy: &ReconnectPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), MurmurError> {
        loop {
            match connect_with_retry(self.channel.as_mut(), policy, cancel).await {
                Ok(()) => {}
                Err(MurmurError::Cancelled) => return Ok(()),
                Err(e) => return Err(e),
            }

            let Err(e) = self.run(cancel).await else {
                return Ok(());
            };
            if !policy.restart {
                error!(error = %e, "channel failed and restart is disabled");
                return Err(e);
            }
            warn!(error = %e, delay_secs = policy.delay.as_secs(), "channel failed, reconnecting");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(policy.delay) => {}
            }
        }
    }

    /// Shuts the channel adapter down.
    pub async fn shutdown(&self) -> Result<(), MurmurError> {
        self.channel.shutdown().await
    }

    /// Receives messages until `cancel` fires or the channel fails.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<(), MurmurError> {
        info!("bot loop running");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, no longer receiving messages");
                    return Ok(());
                }
                msg = self.channel.receive() => {
                    let inbound = msg?;
                    let admission = Arc::clone(&self.admission);
                    self.tracker.spawn(async move {
                        if let Err(e) = handle_inbound(&admission, inbound).await {
                            warn!(error = %e, "failed to answer message");
                        }
                    });
                }
            }
        }
    }
}

/// Handles one inbound message: text goes to admission, commands are answered.
pub async fn handle_inbound(
    admission: &AdmissionPath,
    inbound: InboundMessage,
) -> Result<(), MurmurError> {
    let user = &inbound.sender_id;
    match &inbound.content {
        MessageContent::Text(text) => {
            admission
                .handle_text(text, user, Arc::clone(&inbound.reply))
                .await
        }
        MessageContent::Command { name, args } => {
            info!(user_id = %user, command = name.as_str(), "received command");
            let (text, format) = match Command::parse(name, args) {
                Command::Help => (admission.help_text(), ReplyFormat::Html),
                Command::Model(None) => (admission.model_status(user), ReplyFormat::Html),
                Command::Model(Some(model)) => {
                    let outcome = admission.request_model_change(user, &model, Instant::now());
                    debug!(user_id = %user, outcome = ?outcome, "model change handled");
                    (outcome.reply_text(), ReplyFormat::Html)
                }
                Command::Unknown(name) => (commands::unknown_command(&name), ReplyFormat::Plain),
            };
            inbound.reply.reply(&text, format).await
        }
    }
}
