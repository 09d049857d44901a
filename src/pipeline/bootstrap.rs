//! # Bootstrap scan: catch containers already unhealthy at startup.
//!
//! The live event stream only reports *transitions*, so a container that
//! went unhealthy before this process started would never be seen. The scan
//! runs once, concurrently with the live stream, and injects the IDs of
//! already-unhealthy containers into the same queue the sorter feeds. They
//! enter the pipeline exactly as if a live signal had arrived, with full
//! backoff and attempt accounting.
//!
//! Failures stay local: a failed listing skips the whole scan with an error
//! log, a failed inspect skips that one container with a warning. Neither
//! is ever escalated to a process-level failure.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::runtime::{ContainerId, ContainerRuntime, Health};

/// Scans existing containers once, sending unhealthy IDs into `out`.
pub(crate) async fn scan(runtime: Arc<dyn ContainerRuntime>, out: mpsc::Sender<ContainerId>) {
    let containers = match runtime.list_containers().await {
        Ok(containers) => containers,
        Err(e) => {
            error!(error = %e, "cannot list containers, skipping bootstrap scan");
            return;
        }
    };
    debug!(total = containers.len(), "scanning existing containers");

    for id in containers {
        let state = match runtime.inspect(&id).await {
            Ok(state) => state,
            Err(e) => {
                warn!(container = %id, error = %e, "cannot inspect container");
                continue;
            }
        };
        if state.health == Health::Unhealthy {
            info!(container = %id, name = %state.name, "container already unhealthy");
            if out.send(id).await.is_err() {
                break;
            }
        }
    }
}
