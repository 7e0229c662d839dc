//! Minimal HTTP liveness endpoint for process supervisors.

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{AppError, Result};

/// Handler for `GET /health`: returns 200 OK with a plain-text body.
async fn health() -> &'static str {
    "ok"
}

/// Router exposing `/health`.
#[must_use]
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Serve the health endpoint on `port` until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Config` if the port cannot be bound or the server fails.
pub async fn serve_health(port: u16, ct: CancellationToken) -> Result<()> {
    let bind = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind health endpoint on {bind}: {err}")))?;

    info!(%bind, "health endpoint listening");

    axum::serve(listener, router())
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Config(format!("health server error: {err}")))?;

    info!("health endpoint shut down");
    Ok(())
}
