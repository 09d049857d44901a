//! # Process configuration.
//!
//! [`Config`] collects everything the monitor reads from the environment at
//! startup. Configuration is read exactly once; there is no hot-reload.
//!
//! ## Environment variables
//! - `HEALVISOR_BACKOFF_MIN_TIME` — first restart delay, whole seconds (default 5)
//! - `HEALVISOR_BACKOFF_MAX_TIME` — delay cap, whole seconds (default 300)
//! - `HEALVISOR_BACKOFF_JITTER` — presence enables jitter on computed delays
//! - `HEALVISOR_JSON_LOG` — presence switches log output to JSON
//! - `DOCKER_HOST` — runtime endpoint override (`unix://` socket paths honoured)
//!
//! Log verbosity is controlled separately through `RUST_LOG` (see `main`).
//!
//! ## Validation
//! Unparsable durations and an inverted backoff window (`min > max`) are
//! fatal: [`Config::from_env`] returns a [`ConfigError`] and the process
//! exits non-zero before the pipeline is built.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::{BackoffPolicy, JitterPolicy};

const BACKOFF_MIN_VAR: &str = "HEALVISOR_BACKOFF_MIN_TIME";
const BACKOFF_MAX_VAR: &str = "HEALVISOR_BACKOFF_MAX_TIME";
const JITTER_VAR: &str = "HEALVISOR_BACKOFF_JITTER";
const JSON_LOG_VAR: &str = "HEALVISOR_JSON_LOG";
const ENDPOINT_VAR: &str = "DOCKER_HOST";

const DEFAULT_BACKOFF_MIN_SECS: u64 = 5;
const DEFAULT_BACKOFF_MAX_SECS: u64 = 300;

/// Startup configuration for the monitor process.
#[derive(Clone, Debug)]
pub struct Config {
    /// Backoff parameters applied to every container.
    pub backoff: BackoffPolicy,

    /// Runtime endpoint override; `None` means the local default socket.
    pub endpoint: Option<String>,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_log: bool,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let min = secs_from_env(BACKOFF_MIN_VAR, DEFAULT_BACKOFF_MIN_SECS)?;
        let max = secs_from_env(BACKOFF_MAX_VAR, DEFAULT_BACKOFF_MAX_SECS)?;
        if min > max {
            return Err(ConfigError::InvertedWindow {
                min_secs: min.as_secs(),
                max_secs: max.as_secs(),
            });
        }

        let jitter = if env::var_os(JITTER_VAR).is_some() {
            JitterPolicy::Scaled
        } else {
            JitterPolicy::None
        };

        Ok(Self {
            backoff: BackoffPolicy { min, max, jitter },
            endpoint: env::var(ENDPOINT_VAR).ok().filter(|v| !v.is_empty()),
            json_log: env::var_os(JSON_LOG_VAR).is_some(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backoff: BackoffPolicy::default(),
            endpoint: None,
            json_log: false,
        }
    }
}

/// Reads a whole-seconds duration from `var`, falling back to `default_secs`
/// when the variable is unset or empty.
fn secs_from_env(var: &'static str, default_secs: u64) -> Result<Duration, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.is_empty() => parse_secs(var, &value),
        _ => Ok(Duration::from_secs(default_secs)),
    }
}

fn parse_secs(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidDuration {
            var,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_seconds() {
        assert_eq!(
            parse_secs(BACKOFF_MIN_VAR, "42").unwrap(),
            Duration::from_secs(42)
        );
    }

    #[test]
    fn rejects_junk() {
        let err = parse_secs(BACKOFF_MIN_VAR, "z42").unwrap_err();
        assert_eq!(err.as_label(), "config_invalid_duration");
        assert!(err.to_string().contains("z42"));
    }

    #[test]
    fn rejects_fractional_values() {
        assert!(parse_secs(BACKOFF_MAX_VAR, "1.5").is_err());
    }

    #[test]
    fn default_window_is_five_to_three_hundred() {
        let cfg = Config::default();
        assert_eq!(cfg.backoff.min, Duration::from_secs(5));
        assert_eq!(cfg.backoff.max, Duration::from_secs(300));
        assert_eq!(cfg.backoff.jitter, JitterPolicy::None);
    }
}
