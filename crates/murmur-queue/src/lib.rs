// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job queuing and dispatch for Murmur.
//!
//! - [`JobQueue`]: unbounded FIFO of pending [`Job`]s with a cancellable wait
//! - [`ProcessingGate`]: bound on concurrent transcriber calls
//! - [`Dispatcher`]: consumer loop(s) feeding jobs through the gate to the
//!   transcriber

pub mod dispatcher;
pub mod error;
pub mod gate;
pub mod job;
pub mod queue;

pub use dispatcher::{DispatchStats, Dispatcher, DispatcherState};
pub use error::QueueError;
pub use gate::{GatePermit, ProcessingGate};
pub use job::Job;
pub use queue::JobQueue;
