// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound messages.
//! Each injected message carries its own [`RecordingReply`], so tests assert on
//! what a particular chat received.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use murmur_core::traits::adapter::PluginAdapter;
use murmur_core::traits::channel::ChannelAdapter;
use murmur_core::types::{AdapterType, HealthStatus, InboundMessage, MessageContent, UserId};
use murmur_core::MurmurError;

use crate::recording_reply::RecordingReply;

/// A mock messaging channel for testing.
///
/// Messages injected via `inject_*` are returned by `receive()` in order.
/// After [`close`](MockChannel::close), `receive()` drains what is left and
/// then fails like a dropped connection.
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundMessage>>>,
    notify: Arc<Notify>,
    closed: Arc<AtomicBool>,
    connect_failures: AtomicU32,
    connect_calls: AtomicU32,
}

impl MockChannel {
    /// Create a new mock channel with an empty inbound queue.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            notify: Arc::new(Notify::new()),
            closed: Arc::new(AtomicBool::new(false)),
            connect_failures: AtomicU32::new(0),
            connect_calls: AtomicU32::new(0),
        }
    }

    /// Make the next `n` calls to `connect()` fail.
    pub fn fail_connects(self, n: u32) -> Self {
        self.connect_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Number of times `connect()` was called.
    pub fn connect_calls(&self) -> u32 {
        self.connect_calls.load(Ordering::SeqCst)
    }

    /// Inject an inbound message into the receive queue.
    pub async fn inject_message(&self, msg: InboundMessage) {
        self.inbound.lock().await.push_back(msg);
        self.notify.notify_one();
    }

    /// Inject raw message text from `user`, classified the way a transport would.
    ///
    /// Returns the reply handle of the injected message.
    pub async fn inject_text(&self, user: impl Into<UserId>, text: &str) -> Arc<RecordingReply> {
        let reply = RecordingReply::new();
        self.inject_message(make_inbound(user, text, reply.clone()))
            .await;
        reply
    }

    /// Close the inbound stream.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Messages still waiting to be received.
    pub async fn pending(&self) -> usize {
        self.inbound.lock().await.len()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an inbound message from `user` with the given reply handle.
pub fn make_inbound(
    user: impl Into<UserId>,
    text: &str,
    reply: Arc<RecordingReply>,
) -> InboundMessage {
    InboundMessage {
        id: format!("mock-{}", uuid::Uuid::new_v4()),
        channel: "mock".to_string(),
        sender_id: user.into(),
        content: MessageContent::from_text(text),
        timestamp: chrono::Utc::now().to_rfc3339(),
        reply,
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, MurmurError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MurmurError> {
        self.close();
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), MurmurError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.connect_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.connect_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(MurmurError::channel("mock connection refused"));
        }
        Ok(())
    }

    async fn receive(&self) -> Result<InboundMessage, MurmurError> {
        loop {
            let notified = self.notify.notified();
            {
                let mut queue = self.inbound.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return Ok(msg);
                }
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(MurmurError::channel("inbound channel closed"));
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn receive_returns_injected_messages_in_order() {
        let channel = MockChannel::new();
        channel.inject_text(42u64, "first http://a.example").await;
        channel.inject_text(42u64, "/model large").await;
        assert_eq!(channel.pending().await, 2);

        let msg1 = channel.receive().await.unwrap();
        let msg2 = channel.receive().await.unwrap();
        assert_eq!(channel.pending().await, 0);
        assert_eq!(msg1.sender_id, UserId::from(42u64));
        assert_eq!(
            msg1.content,
            MessageContent::Text("first http://a.example".into())
        );
        assert_eq!(
            msg2.content,
            MessageContent::Command {
                name: "model".into(),
                args: vec!["large".into()],
            }
        );
    }

    #[tokio::test]
    async fn reply_goes_to_the_injected_handle() {
        let channel = MockChannel::new();
        let reply = channel.inject_text("alice", "hi").await;

        let msg = channel.receive().await.unwrap();
        msg.reply
            .reply("got it", murmur_core::ReplyFormat::Plain)
            .await
            .unwrap();
        assert_eq!(reply.texts().await, vec!["got it"]);
    }

    #[tokio::test]
    async fn receive_waits_for_injection() {
        let channel = Arc::new(MockChannel::new());
        let channel_clone = channel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            channel_clone.inject_text(1u64, "delayed").await;
        });

        let received = tokio::time::timeout(Duration::from_secs(2), channel.receive())
            .await
            .expect("receive timed out")
            .unwrap();
        assert_eq!(received.content, MessageContent::Text("delayed".into()));
    }

    #[tokio::test]
    async fn close_fails_pending_receive() {
        let channel = Arc::new(MockChannel::new());
        let waiter = {
            let channel = channel.clone();
            tokio::spawn(async move { channel.receive().await })
        };
        tokio::task::yield_now().await;
        channel.close();

        let result = tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("receive should return after close")
            .unwrap();
        assert!(matches!(result, Err(MurmurError::Channel { .. })));
    }

    #[tokio::test]
    async fn scripted_connect_failures() {
        let mut channel = MockChannel::new().fail_connects(2);
        assert!(channel.connect().await.is_err());
        assert!(channel.connect().await.is_err());
        assert!(channel.connect().await.is_ok());
        assert_eq!(channel.connect_calls(), 3);
    }
}
