// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user cooldown between model changes.
//!
//! Switching models makes the backend reload weights, so each user may change
//! models at most once per cooldown period. The cooldown is tracked per user:
//! one user's change never blocks another's.

use std::sync::Arc;
use std::time::Duration;

use murmur_config::model::RateLimitConfig;
use murmur_core::UserId;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::StateError;
use crate::store::{self, UserStateStore};

/// Cooldown policy over the timestamps kept in a [`UserStateStore`].
#[derive(Debug, Clone)]
pub struct RateLimiter {
    store: Arc<UserStateStore>,
    cooldown: Duration,
}

impl RateLimiter {
    /// Creates a limiter with the given cooldown.
    pub fn new(store: Arc<UserStateStore>, cooldown: Duration) -> Self {
        Self { store, cooldown }
    }

    /// Creates a limiter from the `[rate_limit]` config section.
    pub fn from_config(store: Arc<UserStateStore>, config: &RateLimitConfig) -> Self {
        Self::new(store, config.model_change_cooldown())
    }

    /// The configured cooldown.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// The store this limiter reads from and commits to.
    pub fn store(&self) -> &Arc<UserStateStore> {
        &self.store
    }

    /// Whether `user` may change models at `now`.
    ///
    /// A user with no recorded change is always allowed.
    pub fn allow_change(&self, user: &UserId, now: Instant) -> bool {
        self.remaining_cooldown(user, now).is_none()
    }

    /// Time left before `user` may change models again, or `None` if allowed now.
    pub fn remaining_cooldown(&self, user: &UserId, now: Instant) -> Option<Duration> {
        remaining(self.store.last_change(user), now, self.cooldown)
    }

    /// Validates, rate-limits and commits a user-requested model change.
    ///
    /// The cooldown check and the commit happen in the same critical section,
    /// so two racing requests from one user cannot both succeed. Returns the
    /// newly selected model.
    pub fn change_model(
        &self,
        user: &UserId,
        model: &str,
        now: Instant,
    ) -> Result<String, StateError> {
        self.store.ensure_valid(model)?;

        let cooldown = self.cooldown;
        self.store.update(user, |state| {
            if let Some(left) = remaining(state.last_change, now, cooldown) {
                debug!(user_id = %user, remaining_ms = left.as_millis() as u64, "model change rate limited");
                return Err(StateError::RateLimited { remaining: left });
            }
            store::commit(state, model, now);
            Ok(())
        })?;

        info!(user_id = %user, model, "model changed");
        Ok(model.to_string())
    }
}

fn remaining(last_change: Option<Instant>, now: Instant, cooldown: Duration) -> Option<Duration> {
    let elapsed = now.saturating_duration_since(last_change?);
    cooldown.checked_sub(elapsed).filter(|left| !left.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(cooldown_secs: u64) -> RateLimiter {
        let store = Arc::new(UserStateStore::new(
            "medium.en",
            vec!["small".into(), "medium.en".into(), "large".into()],
        ));
        RateLimiter::new(store, Duration::from_secs(cooldown_secs))
    }

    #[test]
    fn first_change_is_always_allowed() {
        let limiter = limiter(20);
        let user = UserId::from(42u64);
        assert!(limiter.allow_change(&user, Instant::now()));
        assert_eq!(limiter.remaining_cooldown(&user, Instant::now()), None);
    }

    #[test]
    fn second_change_within_cooldown_is_refused_without_mutation() {
        let limiter = limiter(20);
        let user = UserId::from(42u64);
        let t0 = Instant::now();

        assert_eq!(limiter.change_model(&user, "small", t0).unwrap(), "small");

        let t1 = t0 + Duration::from_secs(5);
        assert!(!limiter.allow_change(&user, t1));
        let err = limiter.change_model(&user, "large", t1).unwrap_err();
        assert_eq!(
            err,
            StateError::RateLimited {
                remaining: Duration::from_secs(15)
            }
        );

        assert_eq!(limiter.store().get_model(&user), "small");
        assert_eq!(limiter.store().last_change(&user), Some(t0));
    }

    #[test]
    fn change_succeeds_once_cooldown_elapsed() {
        let limiter = limiter(20);
        let user = UserId::from(42u64);
        let t0 = Instant::now();
        limiter.change_model(&user, "small", t0).unwrap();

        let t1 = t0 + Duration::from_secs(20);
        assert!(limiter.allow_change(&user, t1));
        limiter.change_model(&user, "large", t1).unwrap();
        assert_eq!(limiter.store().get_model(&user), "large");
        assert_eq!(limiter.store().last_change(&user), Some(t1));
    }

    #[test]
    fn invalid_model_does_not_start_cooldown() {
        let limiter = limiter(20);
        let user = UserId::from(9u64);
        let t0 = Instant::now();

        let err = limiter.change_model(&user, "huge", t0).unwrap_err();
        assert!(matches!(err, StateError::InvalidModel { .. }));
        assert!(limiter.allow_change(&user, t0));
        assert_eq!(limiter.store().last_change(&user), None);
    }

    #[test]
    fn invalid_model_reported_even_while_rate_limited() {
        let limiter = limiter(20);
        let user = UserId::from(9u64);
        let t0 = Instant::now();
        limiter.change_model(&user, "small", t0).unwrap();

        let err = limiter
            .change_model(&user, "huge", t0 + Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, StateError::InvalidModel { .. }));
    }

    #[test]
    fn cooldown_is_per_user() {
        let limiter = limiter(20);
        let t0 = Instant::now();
        limiter.change_model(&UserId::from(1u64), "small", t0).unwrap();
        limiter.change_model(&UserId::from(2u64), "large", t0).unwrap();
        assert_eq!(limiter.store().get_model(&UserId::from(2u64)), "large");
    }

    #[test]
    fn zero_cooldown_never_limits() {
        let limiter = limiter(0);
        let user = UserId::from(3u64);
        let t0 = Instant::now();
        limiter.change_model(&user, "small", t0).unwrap();
        limiter.change_model(&user, "large", t0).unwrap();
        assert_eq!(limiter.store().get_model(&user), "large");
    }

    #[test]
    fn direct_set_model_feeds_the_cooldown() {
        let limiter = limiter(20);
        let user = UserId::from(5u64);
        let t0 = Instant::now();
        limiter.store().set_model_at(&user, "large", t0).unwrap();
        assert!(!limiter.allow_change(&user, t0 + Duration::from_secs(19)));
        assert!(limiter.allow_change(&user, t0 + Duration::from_secs(20)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_changes_from_one_user_admit_exactly_one() {
        let limiter = Arc::new(limiter(20));
        let user = UserId::from(77u64);
        let now = Instant::now();

        let tasks: Vec<_> = ["small", "large", "medium.en", "small", "large", "medium.en"]
            .into_iter()
            .map(|model| {
                let limiter = limiter.clone();
                let user = user.clone();
                tokio::spawn(async move { limiter.change_model(&user, model, now) })
            })
            .collect();

        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_follows_the_tokio_clock() {
        let limiter = limiter(20);
        let user = UserId::from(11u64);
        limiter.change_model(&user, "small", Instant::now()).unwrap();

        tokio::time::advance(Duration::from_secs(19)).await;
        assert!(!limiter.allow_change(&user, Instant::now()));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(limiter.allow_change(&user, Instant::now()));
    }

    #[test]
    #[tracing_test::traced_test]
    fn accepted_change_is_logged() {
        let limiter = limiter(20);
        limiter
            .change_model(&UserId::from(8u64), "large", Instant::now())
            .unwrap();
        assert!(logs_contain("model changed"));
    }
}
