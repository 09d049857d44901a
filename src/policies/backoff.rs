//! # Exponential backoff for container restarts.
//!
//! [`BackoffPolicy`] is the configured delay window shared by every
//! container; [`Backoff`] is the per-container state machine built from it.
//! Each container that is ever seen unhealthy gets its own [`Backoff`], so
//! one flapping container never inflates the delays of another.
//!
//! The first delay is `min`; each subsequent delay doubles, capped at `max`.
//! The cap is sticky: once reached, the delay stays at `max` and never
//! resets. Jitter randomizes the *returned* value only; the internal
//! deterministic state advances independently, so jitter output never feeds
//! back into subsequent delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use healvisor::{BackoffPolicy, JitterPolicy};
//!
//! let policy = BackoffPolicy {
//!     min: Duration::from_secs(1),
//!     max: Duration::from_secs(8),
//!     jitter: JitterPolicy::None,
//! };
//!
//! let mut backoff = policy.build();
//! assert_eq!(backoff.next(), Duration::from_secs(1));
//! assert_eq!(backoff.next(), Duration::from_secs(2));
//! assert_eq!(backoff.next(), Duration::from_secs(4));
//! assert_eq!(backoff.next(), Duration::from_secs(8));
//! // Capped, not reset:
//! assert_eq!(backoff.next(), Duration::from_secs(8));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Multiplier applied between successive delays. Fixed, not configurable.
const GROWTH_FACTOR: u32 = 2;

/// Configured restart-delay window.
///
/// Encapsulates the parameters every per-container [`Backoff`] is built
/// from:
/// - [`BackoffPolicy::min`] — the first delay;
/// - [`BackoffPolicy::max`] — the delay cap;
/// - [`BackoffPolicy::jitter`] — randomization of returned delays.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay before the first restart attempt.
    pub min: Duration,
    /// Maximum delay between attempts.
    pub max: Duration,
    /// Jitter applied to computed delays.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns the stock window: `min = 5s`, `max = 300s`, no jitter.
    fn default() -> Self {
        Self {
            min: Duration::from_secs(5),
            max: Duration::from_secs(300),
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Builds a fresh per-container state machine from this window.
    pub fn build(&self) -> Backoff {
        Backoff::new(*self)
    }
}

/// Per-container delay state machine.
///
/// Invariants:
/// - `min ≤ current ≤ max` always (a `min` above `max` is clamped down);
/// - the deterministic delay is monotonically non-decreasing across calls;
/// - the state never resets, even after a successful restart.
#[derive(Clone, Debug)]
pub struct Backoff {
    min: Duration,
    max: Duration,
    jitter: JitterPolicy,
    current: Duration,
}

impl Backoff {
    /// Creates a state machine positioned at the first delay.
    pub fn new(policy: BackoffPolicy) -> Self {
        let min = policy.min.min(policy.max);
        Self {
            min,
            max: policy.max,
            jitter: policy.jitter,
            current: min,
        }
    }

    /// Returns the delay for the next restart attempt and advances the
    /// internal state.
    ///
    /// The deterministic sequence is `min, min×2, min×4, …` capped at
    /// `max`. With jitter enabled the returned value is randomized within
    /// `[min, max]` around the deterministic value; the internal state is
    /// advanced from the deterministic value either way.
    pub fn next(&mut self) -> Duration {
        let base = self.current;
        self.current = base.saturating_mul(GROWTH_FACTOR).min(self.max);
        self.jitter.apply(base, self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(min_secs: u64, max_secs: u64, jitter: JitterPolicy) -> BackoffPolicy {
        BackoffPolicy {
            min: Duration::from_secs(min_secs),
            max: Duration::from_secs(max_secs),
            jitter,
        }
    }

    #[test]
    fn doubles_until_capped() {
        let mut backoff = window(1, 8, JitterPolicy::None).build();
        let delays: Vec<u64> = (0..5).map(|_| backoff.next().as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 8]);
    }

    #[test]
    fn cap_is_sticky() {
        let mut backoff = window(1, 8, JitterPolicy::None).build();
        for _ in 0..10 {
            backoff.next();
        }
        assert_eq!(backoff.next(), Duration::from_secs(8));
    }

    #[test]
    fn min_above_max_is_clamped() {
        let mut backoff = window(10, 5, JitterPolicy::None).build();
        assert_eq!(backoff.next(), Duration::from_secs(5));
        assert_eq!(backoff.next(), Duration::from_secs(5));
    }

    #[test]
    fn min_equal_max_is_constant() {
        let mut backoff = window(7, 7, JitterPolicy::None).build();
        for _ in 0..5 {
            assert_eq!(backoff.next(), Duration::from_secs(7));
        }
    }

    #[test]
    fn jittered_delays_stay_within_window() {
        let mut backoff = window(1, 8, JitterPolicy::Scaled).build();
        for _ in 0..100 {
            let delay = backoff.next();
            assert!(delay >= Duration::from_secs(1), "{delay:?} below min");
            assert!(delay <= Duration::from_secs(8), "{delay:?} above max");
        }
    }

    #[test]
    fn jitter_does_not_feed_back_into_growth() {
        // Two machines over the same window must agree on the deterministic
        // state regardless of jitter on the returned values.
        let mut jittered = window(1, 64, JitterPolicy::Scaled).build();
        let mut plain = window(1, 64, JitterPolicy::None).build();
        for _ in 0..4 {
            jittered.next();
            plain.next();
        }
        assert_eq!(jittered.current, plain.current);
    }

    #[test]
    fn independent_machines_do_not_share_state() {
        let policy = window(1, 8, JitterPolicy::None);
        let mut a = policy.build();
        let mut b = policy.build();
        a.next();
        a.next();
        assert_eq!(a.next(), Duration::from_secs(4));
        assert_eq!(b.next(), Duration::from_secs(1));
    }
}
