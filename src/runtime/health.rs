//! Health status model.
//!
//! Runtimes report health as free-form strings; this module narrows them to
//! a closed enum so every consumer handles the full set of cases at compile
//! time. Anything that is not an explicit healthy/unhealthy verdict
//! (starting, no healthcheck configured, unknown action) collapses into
//! [`Health::Other`].

use crate::runtime::container::ContainerId;

/// Closed container health status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Health {
    /// The container's healthcheck passes.
    Healthy,
    /// The container's healthcheck fails; the pipeline acts on this.
    Unhealthy,
    /// Every other status: starting, no healthcheck, unrelated event.
    Other,
}

impl Health {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Health::Healthy => "healthy",
            Health::Unhealthy => "unhealthy",
            Health::Other => "other",
        }
    }
}

/// A health transition reported by the runtime's event stream.
#[derive(Clone, Debug)]
pub struct HealthSignal {
    /// The container the transition belongs to.
    pub container: ContainerId,
    /// The status the container transitioned into.
    pub health: Health,
}
