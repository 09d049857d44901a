//! # Docker backend for the runtime client.
//!
//! [`DockerRuntime`] implements [`ContainerRuntime`] on top of bollard. The
//! events API is bridged through a channel task so the pipeline sees a plain
//! [`HealthStream`] of already-parsed signals; transport hiccups on the
//! event stream are logged and retried there, never surfaced downstream.

use std::time::Duration;

use bollard::models::{EventMessage, EventMessageTypeEnum, HealthStatusEnum};
use bollard::query_parameters::{
    EventsOptions, InspectContainerOptions, ListContainersOptions, RestartContainerOptionsBuilder,
};
use bollard::{Docker, API_DEFAULT_VERSION};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time;
use tracing::{trace, warn};

use crate::error::RuntimeError;
use crate::runtime::client::{ContainerRuntime, HealthStream};
use crate::runtime::container::{ContainerId, ContainerState};
use crate::runtime::health::{Health, HealthSignal};

/// Connection timeout for the Docker API, in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 120;

/// Buffer between the raw event reader and the returned stream.
const EVENT_BUFFER: usize = 100;

/// Pause after a transport error on the event stream.
const EVENT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Bollard-backed container runtime.
#[derive(Clone)]
pub struct DockerRuntime {
    client: Docker,
}

impl DockerRuntime {
    /// Connects to the Docker daemon and verifies the connection with a
    /// ping.
    ///
    /// With no `endpoint`, the platform-default local socket is used.
    /// `unix://`-prefixed and bare endpoint values are treated as socket
    /// paths; `tcp://` and `http://` endpoints go over HTTP.
    pub async fn connect(endpoint: Option<&str>) -> Result<Self, RuntimeError> {
        let client = match endpoint {
            None => Docker::connect_with_socket_defaults(),
            Some(ep) => match ep.strip_prefix("unix://") {
                Some(path) => Docker::connect_with_socket(path, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION),
                None if ep.starts_with("tcp://") || ep.starts_with("http://") => {
                    Docker::connect_with_http(ep, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)
                }
                None => Docker::connect_with_socket(ep, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION),
            },
        }
        .map_err(unavailable)?;

        client.ping().await.map_err(unavailable)?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn subscribe(&self) -> Result<HealthStream, RuntimeError> {
        // Surface a dead daemon at startup instead of from the reader task.
        self.client.ping().await.map_err(unavailable)?;

        let client = self.client.clone();
        let (tx, rx) = mpsc::channel::<HealthSignal>(EVENT_BUFFER);

        tokio::spawn(async move {
            let events = client.events(Some(EventsOptions::default()));
            tokio::pin!(events);

            while let Some(event) = events.next().await {
                match event {
                    Ok(message) => {
                        if let Some(signal) = parse_event(&message) {
                            if tx.send(signal).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "container event stream error");
                        time::sleep(EVENT_RETRY_DELAY).await;
                    }
                }
            }
            trace!("container event stream closed");
        });

        Ok(Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|signal| (signal, rx))
        })))
    }

    async fn list_containers(&self) -> Result<Vec<ContainerId>, RuntimeError> {
        let containers = self
            .client
            .list_containers(Some(ListContainersOptions::default()))
            .await
            .map_err(unavailable)?;

        Ok(containers
            .into_iter()
            .filter_map(|summary| summary.id)
            .map(ContainerId::from)
            .collect())
    }

    async fn inspect(&self, id: &ContainerId) -> Result<ContainerState, RuntimeError> {
        let response = self
            .client
            .inspect_container(id.as_str(), None::<InspectContainerOptions>)
            .await
            .map_err(|e| classify(id, e))?;

        let name = response
            .name
            .as_deref()
            .map(|n| n.trim_start_matches('/').to_string())
            .unwrap_or_default();

        let health = response
            .state
            .as_ref()
            .and_then(|state| state.health.as_ref())
            .and_then(|health| health.status)
            .map_or(Health::Other, |status| match status {
                HealthStatusEnum::HEALTHY => Health::Healthy,
                HealthStatusEnum::UNHEALTHY => Health::Unhealthy,
                _ => Health::Other,
            });

        Ok(ContainerState { name, health })
    }

    async fn restart(&self, id: &ContainerId, timeout: Duration) -> Result<(), RuntimeError> {
        let options = RestartContainerOptionsBuilder::default()
            .t(timeout.as_secs() as i32)
            .build();

        self.client
            .restart_container(id.as_str(), Some(options))
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => RuntimeError::NotFound { id: id.clone() },
                other => RuntimeError::RestartFailed {
                    id: id.clone(),
                    message: other.to_string(),
                },
            })
    }
}

/// Maps a raw runtime event to a health signal.
///
/// Health transitions arrive as a `health_status: <verdict>` action; some
/// API versions put the verdict in the actor's `healthStatus` attribute
/// instead. Container events that are not health transitions map to
/// [`Health::Other`]; non-container events produce nothing.
fn parse_event(message: &EventMessage) -> Option<HealthSignal> {
    if message.typ != Some(EventMessageTypeEnum::CONTAINER) {
        return None;
    }
    let actor = message.actor.as_ref()?;
    let id = actor.id.as_deref()?;
    let action = message.action.as_deref()?;

    let verdict = match action.strip_prefix("health_status") {
        Some(rest) => rest.trim_start_matches(':').trim().to_string(),
        None => return other_signal(id),
    };
    let verdict = if verdict.is_empty() {
        actor
            .attributes
            .as_ref()
            .and_then(|attrs| attrs.get("healthStatus"))
            .cloned()
            .unwrap_or_default()
    } else {
        verdict
    };

    let health = match verdict.as_str() {
        "healthy" => Health::Healthy,
        "unhealthy" => Health::Unhealthy,
        _ => Health::Other,
    };
    Some(HealthSignal {
        container: ContainerId::from(id),
        health,
    })
}

fn other_signal(id: &str) -> Option<HealthSignal> {
    Some(HealthSignal {
        container: ContainerId::from(id),
        health: Health::Other,
    })
}

fn unavailable(err: bollard::errors::Error) -> RuntimeError {
    RuntimeError::Unavailable {
        message: err.to_string(),
    }
}

fn classify(id: &ContainerId, err: bollard::errors::Error) -> RuntimeError {
    match err {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => RuntimeError::NotFound { id: id.clone() },
        other => unavailable(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::EventActor;
    use std::collections::HashMap;

    fn container_event(id: &str, action: &str, attrs: Option<HashMap<String, String>>) -> EventMessage {
        EventMessage {
            typ: Some(EventMessageTypeEnum::CONTAINER),
            action: Some(action.to_string()),
            actor: Some(EventActor {
                id: Some(id.to_string()),
                attributes: attrs,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn unhealthy_action_parses() {
        let signal = parse_event(&container_event("c1", "health_status: unhealthy", None)).unwrap();
        assert_eq!(signal.container, ContainerId::from("c1"));
        assert_eq!(signal.health, Health::Unhealthy);
    }

    #[test]
    fn healthy_action_parses() {
        let signal = parse_event(&container_event("c1", "health_status: healthy", None)).unwrap();
        assert_eq!(signal.health, Health::Healthy);
    }

    #[test]
    fn verdict_falls_back_to_actor_attribute() {
        let attrs = HashMap::from([("healthStatus".to_string(), "unhealthy".to_string())]);
        let signal = parse_event(&container_event("c1", "health_status", Some(attrs))).unwrap();
        assert_eq!(signal.health, Health::Unhealthy);
    }

    #[test]
    fn unrelated_container_events_map_to_other() {
        let signal = parse_event(&container_event("c1", "die", None)).unwrap();
        assert_eq!(signal.health, Health::Other);
    }

    #[test]
    fn non_container_events_are_skipped() {
        let message = EventMessage {
            typ: Some(EventMessageTypeEnum::NETWORK),
            action: Some("create".to_string()),
            ..Default::default()
        };
        assert!(parse_event(&message).is_none());
    }

    #[test]
    fn events_without_actor_are_skipped() {
        let message = EventMessage {
            typ: Some(EventMessageTypeEnum::CONTAINER),
            action: Some("health_status: unhealthy".to_string()),
            ..Default::default()
        };
        assert!(parse_event(&message).is_none());
    }
}
