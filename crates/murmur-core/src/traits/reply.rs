// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply capability handed out by channel adapters.

use async_trait::async_trait;

use crate::error::MurmurError;
use crate::types::ReplyFormat;

/// A reply-capable handle to the chat session a message came from.
///
/// The core treats the handle as opaque: it stores it in queued jobs and calls
/// [`reply`](ReplyHandle::reply), nothing else.
#[async_trait]
pub trait ReplyHandle: Send + Sync {
    /// Sends `text` to the originating chat.
    async fn reply(&self, text: &str, format: ReplyFormat) -> Result<(), MurmurError>;
}
