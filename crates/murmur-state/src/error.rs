// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors of the model-change path.

use std::time::Duration;

use murmur_core::MurmurError;
use thiserror::Error;

/// Why a model change was refused. Neither variant mutates any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The requested model is not in the configured valid set.
    #[error("invalid model `{requested}`; valid models: {}", valid.join(", "))]
    InvalidModel {
        requested: String,
        valid: Vec<String>,
    },

    /// The user changed models less than one cooldown period ago.
    #[error("model change rate limited, retry in {}s", remaining.as_secs().max(1))]
    RateLimited { remaining: Duration },
}

impl From<StateError> for MurmurError {
    fn from(err: StateError) -> Self {
        MurmurError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_into_murmur_error() {
        let err: MurmurError = StateError::RateLimited {
            remaining: Duration::from_secs(3),
        }
        .into();
        assert!(err.to_string().contains("retry in 3s"));
    }

    #[test]
    fn invalid_model_lists_valid_set() {
        let err = StateError::InvalidModel {
            requested: "huge".into(),
            valid: vec!["tiny".into(), "base".into()],
        };
        assert_eq!(err.to_string(), "invalid model `huge`; valid models: tiny, base");
    }

    #[test]
    fn rate_limited_never_says_zero_seconds() {
        let err = StateError::RateLimited {
            remaining: Duration::from_millis(300),
        };
        assert_eq!(err.to_string(), "model change rate limited, retry in 1s");
    }
}
