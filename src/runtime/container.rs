//! Container identity and inspect results.

use std::fmt;
use std::sync::Arc;

use crate::runtime::health::Health;

/// Opaque runtime-assigned container identifier.
///
/// Identifiers flow through every pipeline stage and into concurrently
/// running restart tasks, so the string is reference-counted and clones are
/// cheap.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContainerId(Arc<str>);

impl ContainerId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self(Arc::from(id))
    }
}

impl From<String> for ContainerId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of a container returned by an inspect call.
#[derive(Clone, Debug)]
pub struct ContainerState {
    /// Human-readable container name (no leading slash).
    pub name: String,
    /// Current health status.
    pub health: Health,
}
