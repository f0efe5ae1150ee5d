//! Server lifecycle: bind, serve, shut down on cancellation.

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use pulsewatch_core::error::{PulseError, Result};

use crate::app_state::AppState;
use crate::load::LoadGenerator;
use crate::router;

/// Bind the configured address.
pub async fn bind(state: &AppState) -> Result<TcpListener> {
    let listen = state.cfg().server.listen_addr()?;
    TcpListener::bind(listen)
        .await
        .map_err(|e| PulseError::Internal(format!("failed to bind {listen}: {e}")))
}

/// Serve on `listener` until `cancel` fires. The load generator runs for the
/// same span and is stopped and joined before this returns.
pub async fn serve(listener: TcpListener, state: AppState, cancel: CancellationToken) -> Result<()> {
    let local = listener
        .local_addr()
        .map_err(|e| PulseError::Internal(format!("local_addr failed: {e}")))?;

    let load_cancel = cancel.child_token();
    let load = LoadGenerator::from_state(&state)?.spawn(load_cancel.clone());

    let app = router::build_router(state);
    tracing::info!(%local, "pulsewatch-server listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(cancel.clone().cancelled_owned())
        .await
        .map_err(|e| PulseError::Internal(format!("server failed: {e}")));

    load_cancel.cancel();
    if let Err(e) = load.await {
        tracing::warn!(error = %e, "load generator task failed");
    }

    served
}

/// Bind then serve.
pub async fn run(state: AppState, cancel: CancellationToken) -> Result<()> {
    let listener = bind(&state).await?;
    serve(listener, state, cancel).await
}
