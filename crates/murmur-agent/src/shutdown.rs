// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! Installs handlers for SIGTERM and SIGINT (Ctrl+C), triggering a
//! [`CancellationToken`] that every suspending operation monitors. Once the bot
//! loop has stopped accepting messages, [`drain_pipeline`] closes the queue and
//! waits for the dispatcher.

use std::time::Duration;

use murmur_queue::{Dispatcher, JobQueue};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is received.
/// The signal handler task runs in the background until then.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let ctrl_c = tokio::signal::ctrl_c();
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
            }
        }
        Err(e) => {
            warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
            let _ = ctrl_c.await;
            info!("received SIGINT (Ctrl+C), initiating shutdown");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("received Ctrl+C, initiating shutdown");
}

/// Closes the queue, waits up to `timeout` for the dispatcher to stop, and
/// logs the jobs that never ran.
///
/// Returns the number of abandoned jobs. State is memory-resident, so those
/// jobs are lost.
pub async fn drain_pipeline(queue: &JobQueue, dispatcher: &Dispatcher, timeout: Duration) -> usize {
    queue.close();

    if tokio::time::timeout(timeout, dispatcher.stopped())
        .await
        .is_err()
    {
        warn!(
            state = %dispatcher.state(),
            "timeout reached, dispatcher did not stop"
        );
    }

    let abandoned = queue.drain();
    if abandoned.is_empty() {
        info!("no pending jobs at shutdown");
    } else {
        for job in &abandoned {
            warn!(job_id = %job.id(), user_id = %job.user(), "dropping pending job");
        }
        warn!(count = abandoned.len(), "pending jobs dropped at shutdown");
    }
    abandoned.len()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use murmur_core::UserId;
    use murmur_queue::{Job, ProcessingGate};
    use murmur_state::UserStateStore;
    use murmur_test_utils::{MockTranscriber, RecordingReply};

    use super::*;

    #[tokio::test]
    async fn install_signal_handler_returns_token() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }

    #[tokio::test]
    async fn drain_reports_abandoned_jobs() {
        let queue = Arc::new(JobQueue::new());
        let transcriber = Arc::new(MockTranscriber::new().held());
        let dispatcher = Arc::new(Dispatcher::new(
            queue.clone(),
            Arc::new(ProcessingGate::single_flight()),
            Arc::new(UserStateStore::new("tiny", vec!["tiny".into()])),
            transcriber.clone(),
        ));
        for i in 0..3u64 {
            queue.enqueue(Job::new(
                "http://a.example",
                vec!["http://a.example".into()],
                UserId::from(i),
                RecordingReply::new(),
            ));
        }

        let cancel = CancellationToken::new();
        let run = {
            let dispatcher = dispatcher.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { dispatcher.run(cancel).await })
        };
        assert!(transcriber.wait_for_calls(1, Duration::from_secs(2)).await);

        cancel.cancel();
        let abandoned = drain_pipeline(&queue, &dispatcher, Duration::from_secs(2)).await;
        assert_eq!(abandoned, 2);
        run.await.unwrap();
    }
}
