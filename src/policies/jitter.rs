//! # Jitter policy for restart delays.
//!
//! [`JitterPolicy`] adds randomness to computed backoff delays so that a
//! fleet of containers going unhealthy together is not restarted in
//! lockstep.
//!
//! - [`JitterPolicy::None`] — no randomization, predictable delays
//! - [`JitterPolicy::Scaled`] — scale the delay by a random factor in (0, 1],
//!   clamped back into the configured `[min, max]` window

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of restart delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact computed delay.
    #[default]
    None,

    /// Scaled jitter: multiply the computed delay by a random factor in
    /// (0, 1]. The result is clamped to the `[min, max]` window, so a
    /// jittered delay never undercuts the configured minimum.
    Scaled,
}

impl JitterPolicy {
    /// Applies jitter to `delay`, keeping the result within `[min, max]`.
    pub fn apply(&self, delay: Duration, min: Duration, max: Duration) -> Duration {
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Scaled => {
                // The factor must stay in (0, 1]; random::<f64>() alone can return 0.
                let factor = 1.0 - rand::rng().random::<f64>();
                Duration::from_secs_f64(delay.as_secs_f64() * factor).clamp(min, max)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_identity() {
        let delay = Duration::from_secs(7);
        assert_eq!(
            JitterPolicy::None.apply(delay, Duration::from_secs(1), Duration::from_secs(10)),
            delay
        );
    }

    #[test]
    fn scaled_stays_within_window() {
        let min = Duration::from_secs(1);
        let max = Duration::from_secs(8);
        for _ in 0..200 {
            let jittered = JitterPolicy::Scaled.apply(Duration::from_secs(8), min, max);
            assert!(jittered >= min, "{jittered:?} below min");
            assert!(jittered <= max, "{jittered:?} above max");
        }
    }

    #[test]
    fn scaled_never_exceeds_input_delay_cap() {
        let min = Duration::from_millis(100);
        let max = Duration::from_secs(30);
        for _ in 0..200 {
            let jittered = JitterPolicy::Scaled.apply(Duration::from_secs(4), min, max);
            assert!(jittered <= Duration::from_secs(4));
        }
    }
}
