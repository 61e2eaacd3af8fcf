// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound entry point: turns chat messages into queued jobs and handles
//! model-change requests.

use std::sync::{Arc, LazyLock};

use murmur_core::types::{ReplyFormat, UserId};
use murmur_core::{MurmurError, ReplyHandle};
use murmur_queue::{Job, JobQueue};
use murmur_state::{RateLimiter, StateError, UserStateStore};
use regex::Regex;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::commands::{self, ModelChangeOutcome};

/// URL-shaped substrings: a scheme followed by everything up to whitespace.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// Reply sent when a message contains no URL.
pub const NO_URL_REPLY: &str = "No valid URL detected in your message. Please send a message that includes a valid URL. If you need help, type: /help";

/// Why a message was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// The message contained no URL. Reported to the user, not an error.
    #[error("no URL found in message")]
    NoUrlFound,
}

impl AdmissionError {
    /// Text to send back to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            AdmissionError::NoUrlFound => NO_URL_REPLY,
        }
    }
}

impl From<AdmissionError> for MurmurError {
    fn from(err: AdmissionError) -> Self {
        MurmurError::Internal(err.to_string())
    }
}

/// A job accepted into the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub job_id: Uuid,
    /// Queue length right after enqueueing, so 1 means nothing else is waiting.
    pub position: usize,
}

impl Admission {
    /// Queue feedback for the user.
    pub fn feedback(&self) -> String {
        position_message(self.position)
    }
}

/// Finds every URL in `text`, in order of appearance.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Queue feedback for a job admitted at `position`.
///
/// The job currently being transcribed is no longer in the queue, so it is
/// not counted.
pub fn position_message(position: usize) -> String {
    match position.saturating_sub(1) {
        0 => "Your request is next and is currently being processed.".to_string(),
        1 => "Your request has been added to the queue. There is 1 job ahead of yours.".to_string(),
        ahead => format!(
            "Your request has been added to the queue. There are {ahead} jobs ahead of yours."
        ),
    }
}

/// Admission and model-change front door shared by all message tasks.
#[derive(Debug, Clone)]
pub struct AdmissionPath {
    queue: Arc<JobQueue>,
    limiter: RateLimiter,
}

impl AdmissionPath {
    pub fn new(queue: Arc<JobQueue>, limiter: RateLimiter) -> Self {
        Self { queue, limiter }
    }

    pub fn queue(&self) -> &Arc<JobQueue> {
        &self.queue
    }

    pub fn store(&self) -> &Arc<UserStateStore> {
        self.limiter.store()
    }

    /// Builds a job from `raw_text` and enqueues it.
    ///
    /// Never waits on the dispatcher.
    pub fn submit(
        &self,
        raw_text: &str,
        user: &UserId,
        reply: Arc<dyn ReplyHandle>,
    ) -> Result<Admission, AdmissionError> {
        let urls = extract_urls(raw_text);
        if urls.is_empty() {
            return Err(AdmissionError::NoUrlFound);
        }

        // Logged for context only; the dispatcher resolves the model again at dequeue.
        debug!(user_id = %user, model = self.store().get_model(user).as_str(), "model at admission");

        let job = Job::new(raw_text, urls, user.clone(), reply);
        let job_id = job.id();
        let position = self.queue.enqueue(job);
        info!(user_id = %user, job_id = %job_id, queue_len = position, "job added to queue");
        Ok(Admission { job_id, position })
    }

    /// Handles a plain-text message: submits it and replies with queue feedback.
    pub async fn handle_text(
        &self,
        raw_text: &str,
        user: &UserId,
        reply: Arc<dyn ReplyHandle>,
    ) -> Result<(), MurmurError> {
        info!(user_id = %user, text = raw_text, "received message");

        let text = match self.submit(raw_text, user, Arc::clone(&reply)) {
            Ok(admission) => admission.feedback(),
            Err(e) => {
                debug!(user_id = %user, reason = %e, "message not admitted");
                e.user_message().to_string()
            }
        };
        reply.reply(&text, ReplyFormat::Plain).await
    }

    /// Validates, rate-limits and applies a `/model <name>` request.
    pub fn request_model_change(
        &self,
        user: &UserId,
        requested: &str,
        now: Instant,
    ) -> ModelChangeOutcome {
        match self.limiter.change_model(user, requested, now) {
            Ok(model) => ModelChangeOutcome::Changed { model },
            Err(StateError::RateLimited { remaining }) => {
                ModelChangeOutcome::RateLimited { remaining }
            }
            Err(StateError::InvalidModel { requested, valid }) => {
                ModelChangeOutcome::InvalidModel { requested, valid }
            }
        }
    }

    /// `/model` reply for `user` when no model name is given.
    pub fn model_status(&self, user: &UserId) -> String {
        commands::model_status(&self.store().get_model(user), self.store().valid_models())
    }

    /// `/help` reply.
    pub fn help_text(&self) -> String {
        commands::help_text(self.store().default_model(), self.store().valid_models())
    }
}
