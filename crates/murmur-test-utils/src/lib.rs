// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Murmur integration tests.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests without
//! Telegram or a real transcription backend.
//!
//! # Components
//!
//! - [`MockChannel`] - Mock chat transport with message injection
//! - [`MockTranscriber`] - Mock transcription engine with scripted failures and holds
//! - [`RecordingReply`] - Reply handle that captures everything sent to a chat

pub mod mock_channel;
pub mod mock_transcriber;
pub mod recording_reply;

pub use mock_channel::MockChannel;
pub use mock_transcriber::MockTranscriber;
pub use recording_reply::{RecordedReply, RecordingReply};
