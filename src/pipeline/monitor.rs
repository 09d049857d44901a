//! # Monitor: wires the pipeline and drives it.
//!
//! The [`Monitor`] owns the configuration and the runtime client. `run`
//! subscribes to the health-event stream, builds the two bounded queues,
//! spawns the sequential stages and the one-shot bootstrap scan, then
//! drives the restart executor on the calling task.
//!
//! ## Wiring
//! ```text
//! runtime.subscribe() ──► sorter ──┐
//!                                  ├──► [unhealthy IDs, cap 10] ──► scheduler
//! bootstrap::scan()  ──────────────┘                                   │
//!                                                                      ▼
//!                                                        [patients, cap 10]
//!                                                                      │
//!                                                                      ▼
//!                                                                 restarter ──► spawn
//!                                                                              heal task
//!                                                                              per patient
//! ```
//!
//! Both queues are small and bounded: a stalled stage blocks its producers
//! rather than dropping work, and that backpressure propagates all the way
//! to the event stream. The pipeline drains in order when the stream
//! closes (the sorter drops its sender, the scheduler finishes the queued
//! IDs and drops its own, the restarter finishes the queued patients)
//! and `run` returns. Cancelling the token stops the sequential stages at
//! their next suspension point; in-flight heal tasks are abandoned to the
//! process exit.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::error::StartupError;
use crate::pipeline::{bootstrap, restarter, scheduler, sorter};
use crate::runtime::ContainerRuntime;

/// Capacity of the queues between pipeline stages.
pub const QUEUE_CAPACITY: usize = 10;

/// Coordinates the event filter, backoff scheduler and restart executor.
pub struct Monitor {
    cfg: Config,
    runtime: Arc<dyn ContainerRuntime>,
}

impl Monitor {
    /// Creates a monitor over the given runtime client.
    pub fn new(cfg: Config, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { cfg, runtime }
    }

    /// Runs the pipeline until the event stream closes or `token` is
    /// cancelled.
    ///
    /// Subscription failure is the only error path; everything after
    /// steady-state is handled locally by the stages.
    pub async fn run(self, token: CancellationToken) -> Result<(), StartupError> {
        let signals = self
            .runtime
            .subscribe()
            .await
            .map_err(StartupError::Subscribe)?;
        info!("listening for container health events");

        let (unhealthy_tx, unhealthy_rx) = mpsc::channel(QUEUE_CAPACITY);
        let (patient_tx, patient_rx) = mpsc::channel(QUEUE_CAPACITY);

        tokio::spawn(sorter::run(signals, unhealthy_tx.clone(), token.clone()));
        tokio::spawn(scheduler::run(
            unhealthy_rx,
            patient_tx,
            self.cfg.backoff,
            token.clone(),
        ));
        tokio::spawn(bootstrap::scan(Arc::clone(&self.runtime), unhealthy_tx));

        restarter::run(patient_rx, self.runtime, token).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::{BackoffPolicy, JitterPolicy};
    use crate::runtime::testing::MockRuntime;
    use crate::runtime::{ContainerId, Health};
    use std::time::Duration;
    use tokio::time;

    fn config(min_secs: u64, max_secs: u64) -> Config {
        Config {
            backoff: BackoffPolicy {
                min: Duration::from_secs(min_secs),
                max: Duration::from_secs(max_secs),
                jitter: JitterPolicy::None,
            },
            ..Config::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn live_signal_flows_to_exactly_one_restart() {
        let runtime = Arc::new(MockRuntime::new());
        runtime.add_container("c1", &[Health::Unhealthy]);

        let token = CancellationToken::new();
        let monitor = Monitor::new(config(1, 8), runtime.clone());
        let driver = tokio::spawn(monitor.run(token.clone()));

        runtime.emit("c1", Health::Unhealthy).await;
        time::sleep(Duration::from_secs(5)).await;

        assert_eq!(runtime.restarts(), vec![ContainerId::from("c1")]);

        token.cancel();
        driver.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn healthy_signals_cause_no_restart() {
        let runtime = Arc::new(MockRuntime::new());
        runtime.add_container("c1", &[Health::Healthy]);

        let token = CancellationToken::new();
        let monitor = Monitor::new(config(1, 8), runtime.clone());
        let driver = tokio::spawn(monitor.run(token.clone()));

        runtime.emit("c1", Health::Healthy).await;
        runtime.emit("c1", Health::Other).await;
        time::sleep(Duration::from_secs(5)).await;

        assert!(runtime.restarts().is_empty());

        token.cancel();
        driver.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn bootstrap_feeds_already_unhealthy_containers_through_backoff() {
        let runtime = Arc::new(MockRuntime::new());
        runtime.add_listed_container("old", &[Health::Unhealthy]);

        let token = CancellationToken::new();
        let monitor = Monitor::new(config(2, 8), runtime.clone());
        let driver = tokio::spawn(monitor.run(token.clone()));

        // No live signal at all; the scan alone must schedule the restart,
        // and it must respect the first backoff delay.
        time::sleep(Duration::from_secs(1)).await;
        assert!(runtime.restarts().is_empty());

        time::sleep(Duration::from_secs(4)).await;
        assert_eq!(runtime.restarts(), vec![ContainerId::from("old")]);

        token.cancel();
        driver.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_signals_accrue_backoff_across_restarts() {
        let runtime = Arc::new(MockRuntime::new());
        runtime.add_container("flappy", &[Health::Unhealthy]);

        let token = CancellationToken::new();
        let monitor = Monitor::new(config(1, 8), runtime.clone());
        let driver = tokio::spawn(monitor.run(token.clone()));

        runtime.emit("flappy", Health::Unhealthy).await;
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runtime.restarts().len(), 1);

        // Second sighting waits 2s, not 1s.
        runtime.emit("flappy", Health::Unhealthy).await;
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runtime.restarts().len(), 1);
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runtime.restarts().len(), 2);

        token.cancel();
        driver.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn subscription_failure_is_fatal() {
        let runtime = Arc::new(MockRuntime::new());
        // First subscription consumes the stream; a second monitor over the
        // same mock cannot subscribe.
        let _stream = runtime.subscribe().await.unwrap();

        let monitor = Monitor::new(config(1, 8), runtime.clone());
        let err = monitor.run(CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.as_label(), "startup_subscribe");
    }
}
