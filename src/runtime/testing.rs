//! Scripted runtime double for pipeline tests.
//!
//! [`MockRuntime`] answers inspects from a per-container script (a queue of
//! health values whose last entry sticks), records every inspect and restart
//! call, and exposes a sender for pushing signals into the subscribed
//! stream.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::RuntimeError;
use crate::runtime::client::{ContainerRuntime, HealthStream};
use crate::runtime::container::{ContainerId, ContainerState};
use crate::runtime::health::{Health, HealthSignal};

#[derive(Default)]
struct MockState {
    containers: Vec<ContainerId>,
    scripts: HashMap<ContainerId, Vec<Health>>,
    inspect_failures: HashMap<ContainerId, &'static str>,
    inspects: Vec<ContainerId>,
    restarts: Vec<ContainerId>,
    fail_restarts: bool,
    signal_rx: Option<mpsc::Receiver<HealthSignal>>,
}

pub(crate) struct MockRuntime {
    state: Mutex<MockState>,
    signal_tx: mpsc::Sender<HealthSignal>,
}

impl MockRuntime {
    pub(crate) fn new() -> Self {
        let (signal_tx, signal_rx) = mpsc::channel(16);
        Self {
            state: Mutex::new(MockState {
                signal_rx: Some(signal_rx),
                ..MockState::default()
            }),
            signal_tx,
        }
    }

    /// Registers a container with a health script; the last entry repeats
    /// for every inspect after the script is exhausted. The container is
    /// inspectable but does not appear in listings.
    pub(crate) fn add_container(&self, id: &str, script: &[Health]) {
        let mut state = self.state.lock().unwrap();
        state.scripts.insert(ContainerId::from(id), script.to_vec());
    }

    /// Like [`add_container`](Self::add_container), but the container also
    /// shows up in `list_containers` (visible to the bootstrap scan).
    pub(crate) fn add_listed_container(&self, id: &str, script: &[Health]) {
        let mut state = self.state.lock().unwrap();
        let id = ContainerId::from(id);
        state.containers.push(id.clone());
        state.scripts.insert(id, script.to_vec());
    }

    /// Makes every inspect of `id` fail with `Unavailable`.
    pub(crate) fn fail_inspect(&self, id: &str, message: &'static str) {
        let mut state = self.state.lock().unwrap();
        state
            .inspect_failures
            .insert(ContainerId::from(id), message);
    }

    /// Makes every restart call fail with `RestartFailed`.
    pub(crate) fn fail_restarts(&self) {
        self.state.lock().unwrap().fail_restarts = true;
    }

    /// Pushes a signal into the subscribed stream.
    pub(crate) async fn emit(&self, id: &str, health: Health) {
        self.signal_tx
            .send(HealthSignal {
                container: ContainerId::from(id),
                health,
            })
            .await
            .expect("signal stream closed");
    }

    pub(crate) fn restarts(&self) -> Vec<ContainerId> {
        self.state.lock().unwrap().restarts.clone()
    }

    pub(crate) fn inspect_count(&self, id: &str) -> usize {
        let id = ContainerId::from(id);
        self.state
            .lock()
            .unwrap()
            .inspects
            .iter()
            .filter(|seen| **seen == id)
            .count()
    }
}

#[async_trait::async_trait]
impl ContainerRuntime for MockRuntime {
    async fn subscribe(&self) -> Result<HealthStream, RuntimeError> {
        let rx = self
            .state
            .lock()
            .unwrap()
            .signal_rx
            .take()
            .ok_or_else(|| RuntimeError::Unavailable {
                message: "already subscribed".into(),
            })?;
        Ok(Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|signal| (signal, rx))
        })))
    }

    async fn list_containers(&self) -> Result<Vec<ContainerId>, RuntimeError> {
        Ok(self.state.lock().unwrap().containers.clone())
    }

    async fn inspect(&self, id: &ContainerId) -> Result<ContainerState, RuntimeError> {
        let mut state = self.state.lock().unwrap();
        state.inspects.push(id.clone());

        if let Some(message) = state.inspect_failures.get(id) {
            return Err(RuntimeError::Unavailable {
                message: (*message).to_string(),
            });
        }

        let script = state
            .scripts
            .get_mut(id)
            .ok_or_else(|| RuntimeError::NotFound { id: id.clone() })?;
        let health = if script.len() > 1 {
            script.remove(0)
        } else {
            *script.first().unwrap_or(&Health::Other)
        };

        Ok(ContainerState {
            name: format!("mock-{id}"),
            health,
        })
    }

    async fn restart(&self, id: &ContainerId, _timeout: Duration) -> Result<(), RuntimeError> {
        let mut state = self.state.lock().unwrap();
        state.restarts.push(id.clone());
        if state.fail_restarts {
            return Err(RuntimeError::RestartFailed {
                id: id.clone(),
                message: "scripted failure".into(),
            });
        }
        Ok(())
    }
}
