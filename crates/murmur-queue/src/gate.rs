// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared limit on concurrent calls into the transcription backend.

use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_util::sync::CancellationToken;

use crate::error::QueueError;

/// Gate in front of the transcription backend.
///
/// With the default capacity of 1 at most one transcription runs at a time,
/// however many dispatcher workers there are.
#[derive(Debug)]
pub struct ProcessingGate {
    permits: Semaphore,
    capacity: usize,
}

/// Held for the duration of one collaborator call. Dropping it reopens the gate.
#[derive(Debug)]
pub struct GatePermit<'a> {
    _permit: SemaphorePermit<'a>,
}

impl ProcessingGate {
    /// Creates a gate admitting `capacity` holders at once. A capacity of 0 is
    /// treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Semaphore::new(capacity),
            capacity,
        }
    }

    /// A gate admitting one holder at a time.
    pub fn single_flight() -> Self {
        Self::new(1)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Holders that could enter right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Waits for a free slot, or returns [`QueueError::Cancelled`] if `cancel`
    /// fires first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<GatePermit<'_>, QueueError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(QueueError::Cancelled),
            permit = self.permits.acquire() => permit
                .map(|permit| GatePermit { _permit: permit })
                .map_err(|_| QueueError::Cancelled),
        }
    }
}

impl Default for ProcessingGate {
    fn default() -> Self {
        Self::single_flight()
    }
}
