// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for chat platform integrations (Telegram).

use async_trait::async_trait;

use crate::error::MurmurError;
use crate::traits::adapter::PluginAdapter;
use crate::types::InboundMessage;

/// Adapter for an inbound chat transport.
///
/// Outbound traffic does not go through the channel: every
/// [`InboundMessage`] carries its own reply handle.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    ///
    /// Calling `connect` on an already connected adapter is a no-op.
    async fn connect(&mut self) -> Result<(), MurmurError>;

    /// Receives the next inbound message from the channel.
    ///
    /// Returns a [`MurmurError::Channel`] once the inbound stream is closed.
    async fn receive(&self) -> Result<InboundMessage, MurmurError>;
}
