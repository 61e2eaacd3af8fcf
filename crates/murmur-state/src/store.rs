// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory per-user state: selected model and time of the last model change.
//!
//! State lives only as long as the process. Entries are created lazily on the
//! first read or write for a user and are never removed.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use murmur_config::model::WhisperConfig;
use murmur_core::UserId;
use tokio::time::Instant;
use tracing::debug;

use crate::error::StateError;

/// Per-user entry. `model == None` means the process default applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserState {
    pub model: Option<String>,
    pub last_change: Option<Instant>,
}

/// Shared store of per-user model selections.
///
/// Every operation is one critical section on a single mutex. Contention is
/// low (a handful of commands per user per minute), so a global lock keeps
/// concurrent `/model` commands from losing updates without per-entry locking.
#[derive(Debug)]
pub struct UserStateStore {
    default_model: String,
    valid_models: Vec<String>,
    users: Mutex<HashMap<UserId, UserState>>,
}

impl UserStateStore {
    /// Creates an empty store.
    pub fn new(default_model: impl Into<String>, valid_models: Vec<String>) -> Self {
        Self {
            default_model: default_model.into(),
            valid_models,
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an empty store from the `[whisper]` config section.
    pub fn from_config(config: &WhisperConfig) -> Self {
        Self::new(config.default_model.clone(), config.valid_models.clone())
    }

    /// The model used for users who never picked one.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Models users may select.
    pub fn valid_models(&self) -> &[String] {
        &self.valid_models
    }

    /// Whether `model` may be selected.
    pub fn is_valid_model(&self, model: &str) -> bool {
        self.valid_models.iter().any(|m| m == model)
    }

    /// Returns the user's model, or the default if none is set. Never fails.
    pub fn get_model(&self, user: &UserId) -> String {
        self.update(user, |state| {
            state
                .model
                .clone()
                .unwrap_or_else(|| self.default_model.clone())
        })
    }

    /// Sets the user's model, stamping the change with the current time.
    ///
    /// This bypasses the cooldown; user-initiated changes go through
    /// [`RateLimiter::change_model`](crate::RateLimiter::change_model).
    pub fn set_model(&self, user: &UserId, model: &str) -> Result<(), StateError> {
        self.set_model_at(user, model, Instant::now())
    }

    /// Sets the user's model, stamping the change with `now`.
    pub fn set_model_at(&self, user: &UserId, model: &str, now: Instant) -> Result<(), StateError> {
        self.ensure_valid(model)?;
        self.update(user, |state| commit(state, model, now));
        debug!(user_id = %user, model, "user model updated");
        Ok(())
    }

    /// Time of the user's last accepted model change, if any.
    pub fn last_change(&self, user: &UserId) -> Option<Instant> {
        self.update(user, |state| state.last_change)
    }

    /// Snapshot of a user's entry.
    pub fn snapshot(&self, user: &UserId) -> UserState {
        self.update(user, |state| state.clone())
    }

    /// Number of users seen so far.
    pub fn user_count(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn ensure_valid(&self, model: &str) -> Result<(), StateError> {
        if self.is_valid_model(model) {
            Ok(())
        } else {
            Err(StateError::InvalidModel {
                requested: model.to_string(),
                valid: self.valid_models.clone(),
            })
        }
    }

    /// Runs `f` on the user's entry inside the store's critical section,
    /// creating the entry if needed.
    pub(crate) fn update<R>(&self, user: &UserId, f: impl FnOnce(&mut UserState) -> R) -> R {
        let mut users = self.lock();
        f(users.entry(user.clone()).or_default())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, UserState>> {
        // Every critical section is a single field assignment, so a panic while
        // holding the lock cannot leave an entry half-written.
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn commit(state: &mut UserState, model: &str, now: Instant) {
    state.model = Some(model.to_string());
    state.last_change = Some(now);
}
