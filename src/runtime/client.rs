//! # Container-runtime client contract.
//!
//! [`ContainerRuntime`] is the seam between the pipeline and whatever
//! runtime actually owns the containers. The pipeline only ever needs four
//! operations: a long-lived health-event subscription, a one-shot listing
//! for the bootstrap scan, point inspects, and the restart command itself.
//!
//! Implementations must be safe for concurrent use: the restart executor
//! issues inspect and restart calls from many tasks at once.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;

use crate::error::RuntimeError;
use crate::runtime::container::{ContainerId, ContainerState};
use crate::runtime::health::HealthSignal;

/// Live stream of health transitions, open until the runtime goes away.
pub type HealthStream = Pin<Box<dyn Stream<Item = HealthSignal> + Send>>;

/// Contract for container-runtime backends.
#[async_trait]
pub trait ContainerRuntime: Send + Sync + 'static {
    /// Opens the long-lived health-event subscription.
    ///
    /// The stream yields one [`HealthSignal`] per observed container event
    /// and ends only when the runtime connection is gone for good. A
    /// subscription that cannot be established at all is a fatal startup
    /// condition for the caller.
    async fn subscribe(&self) -> Result<HealthStream, RuntimeError>;

    /// Lists the identifiers of currently running containers.
    async fn list_containers(&self) -> Result<Vec<ContainerId>, RuntimeError>;

    /// Returns the current name and health of one container.
    async fn inspect(&self, id: &ContainerId) -> Result<ContainerState, RuntimeError>;

    /// Restarts a container, giving it `timeout` to stop gracefully first.
    async fn restart(&self, id: &ContainerId, timeout: Duration) -> Result<(), RuntimeError>;
}
