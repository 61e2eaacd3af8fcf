// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-lived consumer loop feeding queued jobs to the transcription backend.
//!
//! Each worker cycles Idle -> AwaitingJob -> Processing -> Idle until shutdown,
//! then ends in Stopped. Workers share one [`JobQueue`] and one
//! [`ProcessingGate`]; the gate bounds how many collaborator calls run at once.

use std::fmt;
use std::ops::AddAssign;
use std::sync::{Arc, Mutex, PoisonError};

use murmur_config::model::DispatcherConfig;
use murmur_core::types::ReplyFormat;
use murmur_core::{MurmurError, Transcriber};
use murmur_state::UserStateStore;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::gate::ProcessingGate;
use crate::job::Job;
use crate::queue::JobQueue;

/// States of the dispatcher FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// Between jobs.
    Idle,
    /// Waiting for the queue to yield a job.
    AwaitingJob,
    /// Holding or waiting for the gate, or inside a collaborator call.
    Processing,
    /// Shut down. Terminal.
    Stopped,
}

impl fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatcherState::Idle => write!(f, "idle"),
            DispatcherState::AwaitingJob => write!(f, "awaiting_job"),
            DispatcherState::Processing => write!(f, "processing"),
            DispatcherState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Outcome counts of a dispatcher run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub completed: u64,
    pub failed: u64,
}

impl AddAssign for DispatchStats {
    fn add_assign(&mut self, other: Self) {
        self.completed += other.completed;
        self.failed += other.failed;
    }
}

/// Pulls jobs from the queue and runs them through the transcriber.
///
/// The user's model is looked up when a job is dequeued, not when it was
/// enqueued, so a `/model` change made while a job waits applies to it.
/// There is no per-job timeout: a collaborator call that never returns keeps
/// its worker and its gate slot until shutdown.
pub struct Dispatcher {
    queue: Arc<JobQueue>,
    gate: Arc<ProcessingGate>,
    store: Arc<UserStateStore>,
    transcriber: Arc<dyn Transcriber>,
    workers: usize,
    worker_states: Mutex<Vec<DispatcherState>>,
    state_tx: watch::Sender<DispatcherState>,
}

impl Dispatcher {
    /// Creates a dispatcher with a single worker.
    pub fn new(
        queue: Arc<JobQueue>,
        gate: Arc<ProcessingGate>,
        store: Arc<UserStateStore>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        let (state_tx, _) = watch::channel(DispatcherState::Idle);
        Self {
            queue,
            gate,
            store,
            transcriber,
            workers: 1,
            worker_states: Mutex::new(vec![DispatcherState::Idle]),
            state_tx,
        }
    }

    /// Creates a dispatcher sized by the `[dispatcher]` config section, with a
    /// fresh gate of `max_concurrent` slots.
    pub fn from_config(
        queue: Arc<JobQueue>,
        store: Arc<UserStateStore>,
        transcriber: Arc<dyn Transcriber>,
        config: &DispatcherConfig,
    ) -> Self {
        let gate = Arc::new(ProcessingGate::new(config.max_concurrent));
        Self::new(queue, gate, store, transcriber).with_workers(config.workers)
    }

    /// Sets the number of consumer loops. Values below 1 are treated as 1.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self.worker_states = Mutex::new(vec![DispatcherState::Idle; self.workers]);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn gate(&self) -> &Arc<ProcessingGate> {
        &self.gate
    }

    /// Current aggregate state.
    ///
    /// `Processing` if any worker is processing, else `AwaitingJob` if any is
    /// waiting, `Stopped` once every worker stopped, `Idle` otherwise.
    pub fn state(&self) -> DispatcherState {
        *self.state_tx.borrow()
    }

    /// Watches the aggregate state.
    pub fn subscribe(&self) -> watch::Receiver<DispatcherState> {
        self.state_tx.subscribe()
    }

    /// Resolves once every worker reached [`DispatcherState::Stopped`].
    pub async fn stopped(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|state| *state == DispatcherState::Stopped).await;
    }

    /// Runs all workers until `cancel` fires or the queue is closed.
    ///
    /// Collaborator failures, including a collaborator returning
    /// [`MurmurError::Cancelled`] on its own, are reported to the job's chat
    /// and never end the loop. A collaborator call in flight at shutdown is abandoned without
    /// notifying the user.
    pub async fn run(&self, cancel: CancellationToken) -> DispatchStats {
        info!(
            workers = self.workers,
            max_concurrent = self.gate.capacity(),
            "dispatcher running"
        );

        let runs = (0..self.workers).map(|worker| self.worker(worker, &cancel));
        let mut stats = DispatchStats::default();
        for worker_stats in futures::future::join_all(runs).await {
            stats += worker_stats;
        }

        info!(
            completed = stats.completed,
            failed = stats.failed,
            "dispatcher stopped"
        );
        stats
    }

    async fn worker(&self, worker: usize, cancel: &CancellationToken) -> DispatchStats {
        let mut stats = DispatchStats::default();

        loop {
            self.set_state(worker, DispatcherState::AwaitingJob);
            let Ok(job) = self.queue.dequeue(cancel).await else {
                break;
            };

            self.set_state(worker, DispatcherState::Processing);
            match self.process(&job, cancel).await {
                Ok(()) => stats.completed += 1,
                Err(_) if cancel.is_cancelled() => {
                    info!(worker, job_id = %job.id(), "job abandoned at shutdown");
                    break;
                }
                Err(e) => {
                    stats.failed += 1;
                    error!(worker, job_id = %job.id(), user_id = %job.user(), error = %e, "transcription failed");
                    report_failure(&job, &e).await;
                }
            }
            self.set_state(worker, DispatcherState::Idle);
        }

        self.set_state(worker, DispatcherState::Stopped);
        debug!(worker, "dispatcher worker stopped");
        stats
    }

    async fn process(&self, job: &Job, cancel: &CancellationToken) -> Result<(), MurmurError> {
        let _permit = self.gate.acquire(cancel).await?;

        let model = self.store.get_model(job.user());
        info!(
            job_id = %job.id(),
            user_id = %job.user(),
            model = model.as_str(),
            urls = job.urls().len(),
            waited_ms = job.enqueued_at().elapsed().as_millis() as u64,
            "processing job"
        );

        let request = job.request(model);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(MurmurError::Cancelled),
            result = self.transcriber.transcribe(request, job.reply()) => {
                if result.is_ok() {
                    info!(job_id = %job.id(), "job completed");
                }
                result
            }
        }
    }

    fn set_state(&self, worker: usize, state: DispatcherState) {
        let mut states = self
            .worker_states
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = states.get_mut(worker) {
            *slot = state;
        }
        let aggregate = aggregate(&states);
        self.state_tx.send_if_modified(|current| {
            if *current == aggregate {
                false
            } else {
                *current = aggregate;
                true
            }
        });
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("workers", &self.workers)
            .field("gate", &self.gate)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn aggregate(states: &[DispatcherState]) -> DispatcherState {
    if states.iter().all(|s| *s == DispatcherState::Stopped) {
        DispatcherState::Stopped
    } else if states.contains(&DispatcherState::Processing) {
        DispatcherState::Processing
    } else if states.contains(&DispatcherState::AwaitingJob) {
        DispatcherState::AwaitingJob
    } else {
        DispatcherState::Idle
    }
}

/// User-facing text for a failed job.
pub fn failure_message(err: &MurmurError) -> String {
    format!("Sorry, your request could not be transcribed: {err}")
}

async fn report_failure(job: &Job, err: &MurmurError) {
    if let Err(e) = job
        .reply()
        .reply(&failure_message(err), ReplyFormat::Plain)
        .await
    {
        warn!(job_id = %job.id(), error = %e, "failed to report transcription failure");
    }
}
