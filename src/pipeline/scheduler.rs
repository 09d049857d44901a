//! # Scheduler: the per-container backoff stage.
//!
//! Converts unhealthy-container sightings into [`Patient`]s carrying a
//! computed delay and attempt number. The stage owns the only copy of the
//! per-container state table and is its only mutator: a single sequential
//! consumer needs no locking.
//!
//! ## Rules
//! - One sighting yields exactly one patient; nothing is dropped. A full
//!   output queue blocks the stage (backpressure) rather than shedding work.
//! - Patients for the same container are emitted in sighting order.
//! - Each distinct container gets its own [`Backoff`]; delays for one
//!   container never influence another's.
//! - The table grows by one entry per distinct container ever sighted and
//!   is never pruned.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::pipeline::patient::Patient;
use crate::policies::{Backoff, BackoffPolicy};
use crate::runtime::ContainerId;

/// Per-container entry in the scheduler's table.
struct Record {
    backoff: Backoff,
    attempt: u32,
}

/// Runs the scheduler until its input closes or `token` is cancelled.
pub(crate) async fn run(
    mut input: mpsc::Receiver<ContainerId>,
    out: mpsc::Sender<Patient>,
    policy: BackoffPolicy,
    token: CancellationToken,
) {
    // TODO: evict entries once the runtime reports a container removed;
    // today the table only ever grows.
    let mut patients: HashMap<ContainerId, Record> = HashMap::new();

    loop {
        let id = tokio::select! {
            _ = token.cancelled() => break,
            id = input.recv() => match id {
                Some(id) => id,
                None => break,
            },
        };

        let record = patients.entry(id.clone()).or_insert_with(|| Record {
            backoff: policy.build(),
            attempt: 0,
        });
        let delay = record.backoff.next();
        record.attempt += 1;

        let patient = Patient {
            container: id,
            attempt: record.attempt,
            delay,
        };
        debug!(
            container = %patient.container,
            attempt = patient.attempt,
            delay = ?patient.delay,
            "patient scheduled"
        );

        if out.send(patient).await.is_err() {
            break;
        }
    }
}
