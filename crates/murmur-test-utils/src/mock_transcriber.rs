// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transcription engine for deterministic testing.
//!
//! `MockTranscriber` implements `Transcriber`, records every request it sees,
//! and replies with a canned transcript per URL. Tests can script failures
//! for specific URLs and hold calls open to observe gating and ordering.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify, Semaphore};

use murmur_core::traits::adapter::PluginAdapter;
use murmur_core::traits::reply::ReplyHandle;
use murmur_core::traits::transcriber::Transcriber;
use murmur_core::types::{AdapterType, HealthStatus, ReplyFormat, TranscriptionRequest};
use murmur_core::MurmurError;

/// A mock transcription backend.
#[derive(Default)]
pub struct MockTranscriber {
    calls: Mutex<Vec<TranscriptionRequest>>,
    failing_urls: HashSet<String>,
    cancelled_urls: HashSet<String>,
    hold: Option<Semaphore>,
    started: Notify,
    started_count: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTranscriber {
    /// Create a transcriber that succeeds immediately for every URL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any request containing `url`.
    pub fn fail_on(mut self, url: impl Into<String>) -> Self {
        self.failing_urls.insert(url.into());
        self
    }

    /// Return [`MurmurError::Cancelled`] for any request containing `url`.
    pub fn cancelled_on(mut self, url: impl Into<String>) -> Self {
        self.cancelled_urls.insert(url.into());
        self
    }

    /// Hold every call open until [`release`](Self::release) grants it a permit.
    pub fn held(mut self) -> Self {
        self.hold = Some(Semaphore::new(0));
        self
    }

    /// Let `n` held calls finish.
    pub fn release(&self, n: usize) {
        if let Some(hold) = &self.hold {
            hold.add_permits(n);
        }
    }

    /// Requests received so far, in call order.
    pub async fn calls(&self) -> Vec<TranscriptionRequest> {
        self.calls.lock().await.clone()
    }

    /// Models of the requests received so far, in call order.
    pub async fn models(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|c| c.model.clone())
            .collect()
    }

    /// Number of calls currently inside `transcribe`.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` calls have started, or `timeout` elapsed.
    ///
    /// Returns whether the count was reached.
    pub async fn wait_for_calls(&self, n: usize, timeout: Duration) -> bool {
        let wait = async {
            loop {
                let notified = self.started.notified();
                if self.started_count.load(Ordering::SeqCst) >= n {
                    break;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PluginAdapter for MockTranscriber {
    fn name(&self) -> &str {
        "mock-transcriber"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transcriber
    }

    async fn health_check(&self) -> Result<HealthStatus, MurmurError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MurmurError> {
        Ok(())
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
        reply: Arc<dyn ReplyHandle>,
    ) -> Result<(), MurmurError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.calls.lock().await.push(request.clone());
        self.started_count.fetch_add(1, Ordering::SeqCst);
        self.started.notify_waiters();

        if let Some(hold) = &self.hold {
            hold.acquire()
                .await
                .map_err(|_| MurmurError::Internal("mock hold closed".into()))?
                .forget();
        }

        for url in &request.urls {
            if self.cancelled_urls.contains(url) {
                return Err(MurmurError::Cancelled);
            }
            if self.failing_urls.contains(url) {
                return Err(MurmurError::transcription(format!(
                    "mock failure for {url}"
                )));
            }
            reply
                .reply(
                    &format!("Transcript of {url} ({})", request.model),
                    ReplyFormat::Plain,
                )
                .await?;
        }
        Ok(())
    }
}
