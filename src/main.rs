//! healvisor — container auto-healing daemon.
//!
//! Reads configuration from the environment, connects to the container
//! runtime, then runs the healing pipeline until the event stream closes or
//! a termination signal arrives.
//!
//! # Usage
//!
//! ```text
//! HEALVISOR_BACKOFF_MIN_TIME=5 HEALVISOR_BACKOFF_MAX_TIME=300 healvisor
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use healvisor::{Config, DockerRuntime, Monitor};

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Logging is not up yet; configuration errors go to stderr.
            eprintln!("healvisor: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(cfg.json_log);

    info!(
        min = ?cfg.backoff.min,
        max = ?cfg.backoff.max,
        jitter = ?cfg.backoff.jitter,
        "restart backoff window"
    );

    let runtime = match DockerRuntime::connect(cfg.endpoint.as_deref()).await {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "could not connect to the container runtime");
            return ExitCode::FAILURE;
        }
    };
    info!("connected to the container runtime");

    let monitor = Monitor::new(cfg, Arc::new(runtime));
    let token = CancellationToken::new();

    tokio::select! {
        res = monitor.run(token.clone()) => match res {
            Ok(()) => {
                // The event stream never closes in normal operation.
                warn!("health event stream closed, exiting");
                ExitCode::FAILURE
            }
            Err(e) => {
                error!(error = %e, label = e.as_label(), "startup failed");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            // In-flight restart tasks are abandoned with the process.
            info!("shutdown signal received");
            token.cancel();
            ExitCode::SUCCESS
        }
    }
}

fn init_tracing(json_log: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("healvisor=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json_log {
        builder.json().init();
    } else {
        builder.init();
    }
}
