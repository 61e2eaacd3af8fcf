// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue errors.

use murmur_core::MurmurError;
use thiserror::Error;

/// Errors returned by suspending queue operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Shutdown was requested or the queue was closed. Not a failure.
    #[error("queue wait cancelled")]
    Cancelled,
}

impl From<QueueError> for MurmurError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Cancelled => MurmurError::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_maps_to_clean_shutdown() {
        let err: MurmurError = QueueError::Cancelled.into();
        assert!(err.is_cancelled());
    }
}
