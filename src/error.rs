//! Error types used by the healvisor pipeline and the runtime client.
//!
//! This module defines three error enums:
//!
//! - [`ConfigError`] — the environment-supplied configuration is unusable.
//! - [`StartupError`] — the process cannot reach steady-state operation.
//! - [`RuntimeError`] — a single runtime-client call failed mid-operation.
//!
//! Configuration and startup errors are fatal: the process reports them and
//! exits non-zero. Runtime errors are transient: they are logged where they
//! occur and the current operation is abandoned locally, never escalated to
//! another pipeline stage.

use thiserror::Error;

use crate::runtime::ContainerId;

/// # Errors produced while reading configuration from the environment.
///
/// Configuration is read once at startup; any of these terminates the
/// process before the pipeline is built.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable did not parse as a whole number of seconds.
    #[error("cannot parse {var}: {value:?} is not a whole number of seconds")]
    InvalidDuration {
        /// The offending environment variable.
        var: &'static str,
        /// The raw value found in the environment.
        value: String,
    },

    /// The minimum backoff delay exceeds the maximum.
    #[error("backoff window is inverted: min {min_secs}s exceeds max {max_secs}s")]
    InvertedWindow { min_secs: u64, max_secs: u64 },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidDuration { .. } => "config_invalid_duration",
            ConfigError::InvertedWindow { .. } => "config_inverted_window",
        }
    }
}

/// # Fatal startup errors.
///
/// The process exits non-zero on any of these; there is no retry at this
/// level. Mid-operation failures use [`RuntimeError`] instead.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StartupError {
    /// The container runtime client could not be constructed or reached.
    #[error("could not connect to the container runtime: {0}")]
    Connect(#[source] RuntimeError),

    /// The health-event subscription could not be established.
    #[error("could not subscribe to container health events: {0}")]
    Subscribe(#[source] RuntimeError),
}

impl StartupError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StartupError::Connect(_) => "startup_connect",
            StartupError::Subscribe(_) => "startup_subscribe",
        }
    }
}

/// # Errors produced by container-runtime calls.
///
/// These represent failures of individual inspect/list/restart operations.
/// Callers log them and abandon the current operation; no automatic retry is
/// scheduled. Recovery relies on the container staying unhealthy and
/// re-triggering a fresh health signal through the pipeline.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The runtime endpoint could not be reached or answered with a
    /// transport-level failure.
    #[error("container runtime unavailable: {message}")]
    Unavailable {
        /// The underlying error message.
        message: String,
    },

    /// The container no longer exists.
    #[error("container not found: {id}")]
    NotFound {
        /// Identifier the runtime did not recognise.
        id: ContainerId,
    },

    /// The restart command was issued but did not succeed.
    #[error("restart failed for {id}: {message}")]
    RestartFailed {
        /// The container the restart was issued for.
        id: ContainerId,
        /// The underlying error message.
        message: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use healvisor::{ContainerId, RuntimeError};
    ///
    /// let err = RuntimeError::NotFound { id: ContainerId::from("c1") };
    /// assert_eq!(err.as_label(), "runtime_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Unavailable { .. } => "runtime_unavailable",
            RuntimeError::NotFound { .. } => "runtime_not_found",
            RuntimeError::RestartFailed { .. } => "runtime_restart_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let err = ConfigError::InvalidDuration {
            var: "HEALVISOR_BACKOFF_MIN_TIME",
            value: "z42".into(),
        };
        assert_eq!(err.as_label(), "config_invalid_duration");

        let err = StartupError::Connect(RuntimeError::Unavailable {
            message: "no socket".into(),
        });
        assert_eq!(err.as_label(), "startup_connect");

        let err = RuntimeError::RestartFailed {
            id: ContainerId::from("c1"),
            message: "boom".into(),
        };
        assert_eq!(err.as_label(), "runtime_restart_failed");
    }

    #[test]
    fn messages_carry_context() {
        let err = ConfigError::InvertedWindow {
            min_secs: 300,
            max_secs: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("300"));
        assert!(msg.contains('5'));
    }
}
