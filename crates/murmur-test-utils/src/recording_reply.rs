// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply handle that captures outbound replies for assertion in tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use murmur_core::traits::reply::ReplyHandle;
use murmur_core::types::ReplyFormat;
use murmur_core::MurmurError;

/// A single captured reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedReply {
    pub text: String,
    pub format: ReplyFormat,
}

/// A chat session stand-in that records every reply sent to it.
#[derive(Debug, Default)]
pub struct RecordingReply {
    replies: Mutex<Vec<RecordedReply>>,
    notify: Notify,
    failing: bool,
}

impl RecordingReply {
    /// Create a new recording handle.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a handle whose `reply` always fails, as if the chat was deleted.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            failing: true,
            ..Self::default()
        })
    }

    /// All replies received so far, oldest first.
    pub async fn replies(&self) -> Vec<RecordedReply> {
        self.replies.lock().await.clone()
    }

    /// Text of all replies received so far.
    pub async fn texts(&self) -> Vec<String> {
        self.replies
            .lock()
            .await
            .iter()
            .map(|r| r.text.clone())
            .collect()
    }

    /// Number of replies received so far.
    pub async fn count(&self) -> usize {
        self.replies.lock().await.len()
    }

    /// Wait until at least `n` replies arrived, or `timeout` elapsed.
    ///
    /// Returns the replies seen at that point.
    pub async fn wait_for(&self, n: usize, timeout: Duration) -> Vec<RecordedReply> {
        let wait = async {
            loop {
                let notified = self.notify.notified();
                if self.count().await >= n {
                    break;
                }
                notified.await;
            }
        };
        let _ = tokio::time::timeout(timeout, wait).await;
        self.replies().await
    }
}

#[async_trait]
impl ReplyHandle for RecordingReply {
    async fn reply(&self, text: &str, format: ReplyFormat) -> Result<(), MurmurError> {
        if self.failing {
            return Err(MurmurError::channel("mock chat unavailable"));
        }
        self.replies.lock().await.push(RecordedReply {
            text: text.to_string(),
            format,
        });
        self.notify.notify_waiters();
        Ok(())
    }
}
