// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembly of the shared state, queue, dispatcher and admission path.

use std::sync::Arc;
use std::time::Duration;

use murmur_config::MurmurConfig;
use murmur_core::Transcriber;
use murmur_queue::{DispatchStats, Dispatcher, JobQueue};
use murmur_state::{RateLimiter, UserStateStore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::admission::AdmissionPath;
use crate::shutdown;

/// Everything between the channel adapter and the transcriber.
///
/// The store and the queue are shared by the admission path and the
/// dispatcher; nothing else holds them.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub store: Arc<UserStateStore>,
    pub queue: Arc<JobQueue>,
    pub admission: Arc<AdmissionPath>,
    pub dispatcher: Arc<Dispatcher>,
}

impl Pipeline {
    /// Builds the pipeline from validated configuration.
    pub fn from_config(config: &MurmurConfig, transcriber: Arc<dyn Transcriber>) -> Self {
        let store = Arc::new(UserStateStore::from_config(&config.whisper));
        let queue = Arc::new(JobQueue::new());
        let limiter = RateLimiter::from_config(Arc::clone(&store), &config.rate_limit);
        let admission = Arc::new(AdmissionPath::new(Arc::clone(&queue), limiter));
        let dispatcher = Arc::new(Dispatcher::from_config(
            Arc::clone(&queue),
            Arc::clone(&store),
            transcriber,
            &config.dispatcher,
        ));

        info!(
            default_model = store.default_model(),
            valid_models = store.valid_models().len(),
            cooldown_secs = config.rate_limit.model_change_cooldown_secs,
            "pipeline assembled"
        );

        Self {
            store,
            queue,
            admission,
            dispatcher,
        }
    }

    /// Spawns the dispatcher. It runs until `cancel` fires or the queue closes.
    pub fn start(&self, cancel: CancellationToken) -> JoinHandle<DispatchStats> {
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move { dispatcher.run(cancel).await })
    }

    /// Closes the queue and waits for the dispatcher; returns the number of
    /// pending jobs dropped.
    pub async fn shutdown(&self, timeout: Duration) -> usize {
        shutdown::drain_pipeline(&self.queue, &self.dispatcher, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use murmur_core::UserId;
    use murmur_queue::DispatcherState;
    use murmur_test_utils::{MockTranscriber, RecordingReply};

    use super::*;

    #[tokio::test]
    async fn assembled_pipeline_transcribes_and_stops() {
        let config = MurmurConfig::default();
        let transcriber = Arc::new(MockTranscriber::new());
        let pipeline = Pipeline::from_config(&config, transcriber.clone());
        let cancel = CancellationToken::new();
        let run = pipeline.start(cancel.clone());

        let reply = RecordingReply::new();
        pipeline
            .admission
            .handle_text("http://a.example/talk.mp3", &UserId::from(3u64), reply.clone())
            .await
            .unwrap();

        let replies = reply.wait_for(2, Duration::from_secs(2)).await;
        assert_eq!(replies.len(), 2);
        assert!(
            replies
                .iter()
                .any(|r| r.text == "Transcript of http://a.example/talk.mp3 (medium.en)")
        );

        cancel.cancel();
        assert_eq!(pipeline.shutdown(Duration::from_secs(2)).await, 0);
        assert_eq!(pipeline.dispatcher.state(), DispatcherState::Stopped);
        assert_eq!(run.await.unwrap().completed, 1);
    }
}
