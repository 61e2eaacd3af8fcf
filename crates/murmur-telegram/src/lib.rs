// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Murmur transcription bot.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide long
//! polling. Every inbound message carries a [`TelegramReply`] bound to its chat.

pub mod handler;
pub mod reply;

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use murmur_config::model::TelegramConfig;
use murmur_core::error::MurmurError;
use murmur_core::traits::{ChannelAdapter, PluginAdapter};
use murmur_core::types::{AdapterType, HealthStatus, InboundMessage};
use teloxide::dispatching::ShutdownToken;
use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub use reply::TelegramReply;

const INBOUND_BUFFER: usize = 100;

/// Telegram channel adapter implementing [`ChannelAdapter`].
///
/// Each successful [`connect`](ChannelAdapter::connect) starts a fresh polling
/// task with its own inbound queue. When polling ends, [`receive`](ChannelAdapter::receive)
/// reports the channel as closed and the bot loop may connect again.
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
    shutdown_token: Mutex<Option<ShutdownToken>>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: TelegramConfig) -> Result<Self, MurmurError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            MurmurError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;

        if token.trim().is_empty() {
            return Err(MurmurError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        // Not connected yet: the receiver starts out closed.
        let (_, inbound_rx) = mpsc::channel(1);

        Ok(Self {
            bot: Bot::new(token),
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            polling_handle: None,
            shutdown_token: Mutex::new(None),
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    fn is_polling(&self) -> bool {
        self.polling_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        handler::CHANNEL_NAME
    }

    fn version(&self) -> semver::Version {
        semver::Version::parse(env!("CARGO_PKG_VERSION"))
            .unwrap_or_else(|_| semver::Version::new(0, 1, 0))
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, MurmurError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), MurmurError> {
        debug!("Telegram channel shutting down");
        let token = self
            .shutdown_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(token) = token else {
            return Ok(());
        };
        match token.shutdown() {
            Ok(stopped) => {
                stopped.await;
                info!("Telegram polling stopped");
            }
            // Dispatcher was never started or is already stopping.
            Err(e) => debug!(error = %e, "Telegram polling not running"),
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), MurmurError> {
        if self.is_polling() {
            return Ok(());
        }

        let me = self.bot.get_me().await.map_err(|e| MurmurError::Channel {
            message: format!("failed to reach Telegram: {e}"),
            source: Some(Box::new(e)),
        })?;
        info!(username = me.username(), "starting Telegram long polling");

        let (tx, rx) = mpsc::channel(INBOUND_BUFFER);
        *self.inbound_rx.get_mut() = rx;

        let handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
            let tx = tx.clone();
            async move {
                match handler::to_inbound_message(&bot, &msg) {
                    Some(inbound) => {
                        if tx.send(inbound).await.is_err() {
                            warn!("inbound channel closed, dropping message");
                        }
                    }
                    None => debug!(msg_id = msg.id.0, "ignoring unsupported message"),
                }
                respond(())
            }
        });

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|_| async {})
            .build();
        *self
            .shutdown_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(dispatcher.shutdown_token());

        // The sender lives in the handler only, so the receiver closes once
        // polling ends.
        self.polling_handle = Some(tokio::spawn(async move {
            dispatcher.dispatch().await;
            info!("Telegram polling ended");
        }));
        Ok(())
    }

    async fn receive(&self) -> Result<InboundMessage, MurmurError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| MurmurError::channel("Telegram inbound channel closed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_bot_token() {
        let result = TelegramChannel::new(TelegramConfig::default());
        assert!(matches!(result, Err(MurmurError::Config(_))));
    }

    #[test]
    fn new_rejects_empty_token() {
        let config = TelegramConfig {
            bot_token: Some("  ".into()),
        };
        let err = TelegramChannel::new(config).err().unwrap();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn new_with_valid_token() {
        let config = TelegramConfig {
            bot_token: Some("123456:ABC-DEF".into()),
        };
        let channel = TelegramChannel::new(config).unwrap();
        assert_eq!(channel.name(), "telegram");
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
        assert!(!channel.is_polling());
    }

    #[tokio::test]
    async fn receive_before_connect_reports_closed() {
        let config = TelegramConfig {
            bot_token: Some("123456:ABC-DEF".into()),
        };
        let channel = TelegramChannel::new(config).unwrap();
        let err = channel.receive().await.unwrap_err();
        assert!(matches!(err, MurmurError::Channel { .. }));
    }

    #[tokio::test]
    async fn shutdown_without_connect_is_ok() {
        let config = TelegramConfig {
            bot_token: Some("123456:ABC-DEF".into()),
        };
        let channel = TelegramChannel::new(config).unwrap();
        channel.shutdown().await.unwrap();
    }
}
