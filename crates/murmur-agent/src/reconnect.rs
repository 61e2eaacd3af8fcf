// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry-with-delay for establishing the channel connection.

use std::time::Duration;

use murmur_config::model::GeneralConfig;
use murmur_core::{ChannelAdapter, MurmurError, PluginAdapter};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How connection failures are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Retry failed connections at all.
    pub restart: bool,
    /// Pause between attempts.
    pub delay: Duration,
    /// Consecutive failed attempts after which to give up. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl ReconnectPolicy {
    pub fn from_config(config: &GeneralConfig) -> Self {
        Self {
            restart: config.restart_on_connection_failure,
            delay: Duration::from_secs(config.reconnect_delay_secs),
            max_attempts: config.max_reconnect_attempts,
        }
    }

    /// Fail on the first error.
    pub fn never() -> Self {
        Self {
            restart: false,
            delay: Duration::ZERO,
            max_attempts: None,
        }
    }

    /// Whether another attempt is allowed after `failures` consecutive failures.
    pub fn should_retry(&self, failures: u32) -> bool {
        self.restart && self.max_attempts.is_none_or(|max| failures < max)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_config(&GeneralConfig::default())
    }
}

/// Connects `channel`, retrying per `policy`.
///
/// Returns `Err(MurmurError::Cancelled)` if shutdown is requested while
/// waiting between attempts, and the last connection error once the policy
/// gives up.
pub async fn connect_with_retry(
    channel: &mut dyn ChannelAdapter,
    policy: &ReconnectPolicy,
    cancel: &CancellationToken,
) -> Result<(), MurmurError> {
    let mut failures = 0u32;
    loop {
        match channel.connect().await {
            Ok(()) => {
                info!(channel = channel.name(), attempts = failures + 1, "channel connected");
                return Ok(());
            }
            Err(e) => {
                failures += 1;
                if !policy.should_retry(failures) {
                    error!(channel = channel.name(), attempts = failures, error = %e, "giving up on channel connection");
                    return Err(e);
                }
                warn!(
                    channel = channel.name(),
                    attempt = failures,
                    delay_secs = policy.delay.as_secs(),
                    error = %e,
                    "channel connection failed, retrying"
                );
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(MurmurError::Cancelled),
            _ = tokio::time::sleep(policy.delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use murmur_test_utils::MockChannel;

    use super::*;

    fn policy(max_attempts: Option<u32>) -> ReconnectPolicy {
        ReconnectPolicy {
            restart: true,
            delay: Duration::from_secs(10),
            max_attempts,
        }
    }

    #[test]
    fn policy_from_config_defaults() {
        let policy = ReconnectPolicy::default();
        assert!(policy.restart);
        assert_eq!(policy.delay, Duration::from_secs(10));
        assert_eq!(policy.max_attempts, None);
    }

    #[test]
    fn should_retry_respects_attempt_limit() {
        let bounded = policy(Some(3));
        assert!(bounded.should_retry(2));
        assert!(!bounded.should_retry(3));
        assert!(policy(None).should_retry(1000));
        assert!(!ReconnectPolicy::never().should_retry(1));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_delay_until_connected() {
        let mut channel = MockChannel::new().fail_connects(2);
        let cancel = CancellationToken::new();
        let started = tokio::time::Instant::now();

        connect_with_retry(&mut channel, &policy(None), &cancel)
            .await
            .unwrap();

        assert_eq!(channel.connect_calls(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let mut channel = MockChannel::new().fail_connects(5);
        let cancel = CancellationToken::new();

        let err = connect_with_retry(&mut channel, &policy(Some(2)), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, MurmurError::Channel { .. }));
        assert_eq!(channel.connect_calls(), 2);
    }

    #[tokio::test]
    async fn no_restart_fails_immediately() {
        let mut channel = MockChannel::new().fail_connects(1);
        let cancel = CancellationToken::new();

        assert!(
            connect_with_retry(&mut channel, &ReconnectPolicy::never(), &cancel)
                .await
                .is_err()
        );
        assert_eq!(channel.connect_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_delay() {
        let mut channel = MockChannel::new().fail_connects(100);
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(15)).await;
            canceller.cancel();
        });

        let err = connect_with_retry(&mut channel, &policy(None), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(channel.connect_calls(), 2);
    }
}
