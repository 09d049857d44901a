//! # healvisor
//!
//! **healvisor** watches a container runtime's health events and restarts
//! containers that become unhealthy, backing off per container so a
//! persistently broken container is not restart-looped at full speed.
//!
//! ## Architecture
//! ```text
//!  ┌─────────────────────┐
//!  │  Container runtime  │
//!  └──────┬──────────────┘
//!         │ health events                     ┌──────────────────┐
//!         ▼                                   │ Bootstrap scan   │
//!  ┌──────────────┐                           │ (runs once at    │
//!  │    Sorter    │                           │  startup)        │
//!  │ keep only    │                           └────────┬─────────┘
//!  │ "unhealthy"  │                                    │
//!  └──────┬───────┘                                    │
//!         │  container IDs    ┌───────────────────────┘
//!         ▼                   ▼
//!     [ bounded queue, capacity 10 ]
//!         │
//!         ▼
//!  ┌──────────────┐   one Backoff per container, attempt counting
//!  │  Scheduler   │   (sole owner of the state table)
//!  └──────┬───────┘
//!         │  Patient { container, attempt, delay }
//!         ▼
//!     [ bounded queue, capacity 10 ]
//!         │
//!         ▼
//!  ┌──────────────┐   spawns one task per patient:
//!  │  Restarter   │   inspect → sleep(delay) → inspect → restart
//!  └──────────────┘   (staleness guards on both inspects)
//! ```
//!
//! The sorter and scheduler are single sequential workers; the restarter
//! fans out one task per scheduled action. Queues are bounded, so a stalled
//! stage blocks its producers instead of dropping work.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use healvisor::{Config, DockerRuntime, Monitor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::from_env()?;
//!     let runtime = DockerRuntime::connect(cfg.endpoint.as_deref()).await?;
//!     let monitor = Monitor::new(cfg, Arc::new(runtime));
//!     monitor.run(CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod pipeline;
mod policies;
mod runtime;

// ---- Public re-exports ----

pub use config::Config;
pub use error::{ConfigError, RuntimeError, StartupError};
pub use pipeline::{Monitor, Patient, QUEUE_CAPACITY};
pub use policies::{Backoff, BackoffPolicy, JitterPolicy};
pub use runtime::{
    ContainerId, ContainerRuntime, ContainerState, DockerRuntime, Health, HealthSignal,
    HealthStream,
};
