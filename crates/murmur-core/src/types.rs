// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Murmur core.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::traits::ReplyHandle;

/// Identifier of a chat user, as reported by the channel adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Transcriber,
}

/// Formatting hint passed along with an outbound reply.
///
/// The core never renders markup itself; it only tells the transport how the
/// text should be interpreted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum ReplyFormat {
    #[default]
    Plain,
    Html,
}

/// Content of an inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Free-form text, the input of the admission path.
    Text(String),
    /// A bot command such as `/model large-v3`.
    Command { name: String, args: Vec<String> },
}

impl MessageContent {
    /// Classifies raw message text.
    ///
    /// Text starting with `/` becomes a [`MessageContent::Command`]; the command
    /// name is lowercased and any `@botname` suffix is dropped, so `/Model@murmur_bot`
    /// and `/model` are the same command. Everything else is plain text.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim_start();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Text(text.to_string());
        };
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Self::Text(text.to_string());
        }

        let mut parts = rest.split_whitespace();
        let head = parts.next().unwrap_or_default();
        let name = head.split('@').next().unwrap_or_default();

        if name.is_empty() {
            return Self::Text(text.to_string());
        }

        Self::Command {
            name: name.to_ascii_lowercase(),
            args: parts.map(str::to_string).collect(),
        }
    }
}

/// An inbound message received from a channel adapter.
#[derive(Clone)]
pub struct InboundMessage {
    /// Platform message ID.
    pub id: String,
    /// Name of the channel the message arrived on.
    pub channel: String,
    /// Sender of the message.
    pub sender_id: UserId,
    /// Parsed message content.
    pub content: MessageContent,
    /// RFC 3339 timestamp reported by the platform.
    pub timestamp: String,
    /// Capability for replying to the originating chat.
    pub reply: Arc<dyn ReplyHandle>,
}

impl fmt::Debug for InboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundMessage")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .field("sender_id", &self.sender_id)
            .field("content", &self.content)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

/// A single call into the transcription collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionRequest {
    /// Job identifier, for correlating logs.
    pub job_id: String,
    /// The raw message text the user submitted.
    pub content: String,
    /// URLs extracted from `content` at admission time.
    pub urls: Vec<String>,
    /// Model resolved for the submitting user when the job was dequeued.
    pub model: String,
}
