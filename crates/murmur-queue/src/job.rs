// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A single unit of transcription work.

use std::fmt;
use std::sync::Arc;

use murmur_core::types::{TranscriptionRequest, UserId};
use murmur_core::ReplyHandle;
use tokio::time::Instant;
use uuid::Uuid;

/// A queued transcription request.
///
/// Built by the admission path from a message that contains at least one URL.
/// Immutable once created and consumed by exactly one dispatcher worker. The
/// model is deliberately absent: it is resolved when the job is dequeued.
#[derive(Clone)]
pub struct Job {
    id: Uuid,
    content: String,
    urls: Vec<String>,
    user: UserId,
    reply: Arc<dyn ReplyHandle>,
    enqueued_at: Instant,
}

impl Job {
    pub fn new(
        content: impl Into<String>,
        urls: Vec<String>,
        user: UserId,
        reply: Arc<dyn ReplyHandle>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            urls,
            user,
            reply,
            enqueued_at: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The raw message text.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Handle to the chat session the job came from.
    pub fn reply(&self) -> Arc<dyn ReplyHandle> {
        Arc::clone(&self.reply)
    }

    pub fn enqueued_at(&self) -> Instant {
        self.enqueued_at
    }

    /// Builds the collaborator request for this job with the resolved `model`.
    pub fn request(&self, model: String) -> TranscriptionRequest {
        TranscriptionRequest {
            job_id: self.id.to_string(),
            content: self.content.clone(),
            urls: self.urls.clone(),
            model,
        }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("user", &self.user)
            .field("urls", &self.urls)
            .field("enqueued_at", &self.enqueued_at)
            .finish_non_exhaustive()
    }
}
