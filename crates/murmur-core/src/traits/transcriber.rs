// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcriber trait for the speech-to-text backend.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::MurmurError;
use crate::traits::adapter::PluginAdapter;
use crate::traits::reply::ReplyHandle;
use crate::types::TranscriptionRequest;

/// The external transcription engine.
///
/// Implementations deliver their results to the user themselves through
/// `reply`; the dispatcher only sequences and gates calls. An `Err` is a
/// failed job and is reported to the user by the dispatcher.
#[async_trait]
pub trait Transcriber: PluginAdapter {
    /// Transcribes the media referenced by `request` with `request.model`.
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
        reply: Arc<dyn ReplyHandle>,
    ) -> Result<(), MurmurError>;
}
