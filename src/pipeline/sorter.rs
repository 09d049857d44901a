//! # Sorter: the event-filter stage.
//!
//! Consumes the live health-signal stream and forwards the container ID of
//! every `unhealthy` transition into the bounded unhealthy-ID queue. All
//! other signals are dropped with a trace-level log only: they are not
//! errors, just noise to this pipeline.
//!
//! The stage is stateless and runs as a single sequential worker. It
//! suspends only while waiting for the next signal or while the output
//! queue is full (backpressure). It exits when the stream ends or the
//! runtime token is cancelled; dropping its sender closes the downstream
//! queue.

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace};

use crate::runtime::{ContainerId, Health, HealthStream};

/// Runs the filter until the signal stream closes or `token` is cancelled.
pub(crate) async fn run(
    mut signals: HealthStream,
    out: mpsc::Sender<ContainerId>,
    token: CancellationToken,
) {
    loop {
        let signal = tokio::select! {
            _ = token.cancelled() => break,
            signal = signals.next() => match signal {
                Some(signal) => signal,
                None => break,
            },
        };

        match signal.health {
            Health::Unhealthy => {
                info!(container = %signal.container, "found unhealthy container");
                if out.send(signal.container).await.is_err() {
                    break;
                }
            }
            other => {
                trace!(
                    container = %signal.container,
                    health = other.as_label(),
                    "ignoring signal"
                );
            }
        }
    }
}
