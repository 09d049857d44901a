//! # Restarter: the delayed restart executor.
//!
//! Consumes [`Patient`]s and spawns one independent task per patient, so a
//! long delay for one container never holds up another. Within a task:
//!
//! ```text
//! inspect ──► not unhealthy? ──► drop (staleness guard)
//!    │
//!    ▼
//! sleep(delay)
//!    │
//!    ▼
//! inspect ──► not unhealthy? ──► drop (healed during the wait)
//!    │
//!    ▼
//! restart (fixed 10s stop timeout) ──► failure is logged, never retried
//! ```
//!
//! ## Rules
//! - Tasks are fire-and-forget: a failure is terminal to its own task and
//!   never reaches the scheduler or the filter.
//! - Overlapping tasks for the same container are **not** deduplicated;
//!   closely-spaced sightings can race their restarts.
//! - A failed restart is not retried here; recovery relies on the container
//!   staying unhealthy and re-entering the pipeline with a fresh signal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::pipeline::patient::Patient;
use crate::runtime::{ContainerRuntime, Health};

/// Grace period the runtime gives a container to stop during restart.
const RESTART_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the executor until its input closes or `token` is cancelled.
pub(crate) async fn run(
    mut input: mpsc::Receiver<Patient>,
    runtime: Arc<dyn ContainerRuntime>,
    token: CancellationToken,
) {
    loop {
        let patient = tokio::select! {
            _ = token.cancelled() => break,
            patient = input.recv() => match patient {
                Some(patient) => patient,
                None => break,
            },
        };
        tokio::spawn(heal(patient, Arc::clone(&runtime)));
    }
}

/// One delayed restart attempt for one patient.
async fn heal(patient: Patient, runtime: Arc<dyn ContainerRuntime>) {
    // The patient may have been queued well before this task ran.
    let state = match runtime.inspect(&patient.container).await {
        Ok(state) => state,
        Err(e) => {
            warn!(container = %patient.container, error = %e, "cannot inspect container");
            return;
        }
    };
    if state.health != Health::Unhealthy {
        debug!(
            container = %patient.container,
            health = state.health.as_label(),
            "skipping restart, container no longer unhealthy"
        );
        return;
    }

    info!(
        container = %patient.container,
        delay = ?patient.delay,
        attempt = patient.attempt,
        "sleeping before restart"
    );
    time::sleep(patient.delay).await;

    // The wait may have been long enough for the container to heal.
    let state = match runtime.inspect(&patient.container).await {
        Ok(state) => state,
        Err(e) => {
            warn!(container = %patient.container, error = %e, "cannot inspect container");
            return;
        }
    };
    if state.health != Health::Unhealthy {
        debug!(
            container = %patient.container,
            health = state.health.as_label(),
            "skipping restart, container healed during the wait"
        );
        return;
    }

    debug!(
        container = %patient.container,
        name = %state.name,
        attempt = patient.attempt,
        "healing patient"
    );
    if let Err(e) = runtime.restart(&patient.container, RESTART_TIMEOUT).await {
        error!(container = %patient.container, error = %e, "restart failed");
    }
}
