//! pulsewatch-server
//!
//! - `GET /api`     : instrumented demo endpoint (10% simulated failures)
//! - `GET /metrics` : Prometheus text exposition
//! - `GET /healthz` : liveness
//!
//! Config from `PULSEWATCH_CONFIG` (default `pulsewatch.yaml`, optional),
//! `PORT` overrides the listen port.

use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use pulsewatch_server::{app_state::AppState, config, server};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = match config::load_from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::new(cfg) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "metrics registration failed");
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("shutdown requested");
                    cancel.cancel();
                }
                Err(e) => tracing::warn!(error = %e, "ctrl-c handler unavailable"),
            }
        });
    }

    match server::run(state, cancel).await {
        Ok(()) => {
            tracing::info!("pulsewatch-server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}
