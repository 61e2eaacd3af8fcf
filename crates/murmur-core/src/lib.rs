// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Murmur transcription bot.
//!
//! This crate provides the error type, the shared message and request types,
//! and the adapter traits for the two external collaborators: the chat
//! transport ([`ChannelAdapter`], [`ReplyHandle`]) and the speech-to-text
//! engine ([`Transcriber`]).

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MurmurError;
pub use types::{
    AdapterType, HealthStatus, InboundMessage, MessageContent, ReplyFormat, TranscriptionRequest,
    UserId,
};

pub use traits::{ChannelAdapter, PluginAdapter, ReplyHandle, Transcriber};
