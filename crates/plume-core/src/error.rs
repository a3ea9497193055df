//! Feed error taxonomy.
//!
//! Errors the engine reports to callers. Stale responses are deliberately
//! not represented here: superseded replies are a silent no-op at the
//! store layer, not a failure.

use thiserror::Error;

/// Errors from feed engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// Post body was empty after trimming. Rejected before any network
    /// call; no state change.
    #[error("post body is empty")]
    EmptyBody,

    /// Transport-level failure (timeout, connection refused, ...).
    #[error("network error: {reason}")]
    Network {
        /// Human-readable failure reason
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("server error (status {status}): {reason}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Human-readable failure reason
        reason: String,
    },

    /// Session expired (401). Propagated so the session collaborator can
    /// log the user out; the engine itself treats it as a plain failure
    /// and does not retry.
    #[error("authentication expired")]
    AuthExpired,

    /// Configuration failed to parse or validate.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong
        reason: String,
    },
}

impl FeedError {
    /// Create a network error.
    pub fn network(reason: impl Into<String>) -> Self {
        Self::Network {
            reason: reason.into(),
        }
    }

    /// Create a server error.
    pub fn server(status: u16, reason: impl Into<String>) -> Self {
        Self::Server {
            status,
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Whether retrying the same operation may succeed.
    ///
    /// Network and server failures leave the store in a consistent,
    /// retryable `Idle` state; validation and auth failures will not
    /// resolve on their own.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Server { .. })
    }

    /// Whether the error is correctable by the user (input validation).
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::EmptyBody | Self::InvalidConfig { .. })
    }
}
