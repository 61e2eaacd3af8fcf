// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user model selection for Murmur.
//!
//! [`UserStateStore`] remembers which transcription model each user picked.
//! [`RateLimiter`] enforces the cooldown between model changes on top of it.

pub mod error;
pub mod rate_limit;
pub mod store;

pub use error::StateError;
pub use rate_limit::RateLimiter;
pub use store::{UserState, UserStateStore};
