// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unbounded FIFO of pending jobs with a cancellable wait.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::QueueError;
use crate::job::Job;

/// Pending jobs in arrival order.
///
/// Producers never wait: [`enqueue`](JobQueue::enqueue) appends and returns.
/// Consumers suspend in [`dequeue`](JobQueue::dequeue) until a job arrives, the
/// queue is closed, or their cancellation token fires.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: Mutex<VecDeque<Job>>,
    notify: Notify,
    closed: AtomicBool,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `job` and returns the queue length including it.
    ///
    /// Jobs enqueued after [`close`](JobQueue::close) are kept but never
    /// delivered.
    pub fn enqueue(&self, job: Job) -> usize {
        let job_id = job.id();
        let len = {
            let mut jobs = self.lock();
            jobs.push_back(job);
            jobs.len()
        };
        self.notify.notify_one();
        debug!(job_id = %job_id, queue_len = len, "job enqueued");
        len
    }

    /// Removes and returns the head of the queue, waiting for one if empty.
    ///
    /// Returns [`QueueError::Cancelled`] once `cancel` fires or the queue is
    /// closed, even if jobs are still pending.
    pub async fn dequeue(&self, cancel: &CancellationToken) -> Result<Job, QueueError> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if cancel.is_cancelled() || self.is_closed() {
                return Err(QueueError::Cancelled);
            }
            if let Some(job) = self.lock().pop_front() {
                return Ok(job);
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(QueueError::Cancelled),
                _ = &mut notified => {}
            }
        }
    }

    /// Wakes every waiting consumer; all current and future waits return
    /// [`QueueError::Cancelled`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of pending jobs. Advisory: it may change right after the call.
    pub fn size(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes and returns every pending job, oldest first.
    pub fn drain(&self) -> Vec<Job> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
