// src/http/mod.rs

//! HTTP surface built on `axum`.
//!
//! - `GET /` is a liveness check.
//! - `POST /deploy` takes a multipart form and answers with the script's
//!   output as a chunked `text/plain` body.

mod errors;
mod form;
mod handlers;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::deploy::Orchestrator;

pub use errors::ApiError;
pub use form::read_deploy_form;

/// Header carrying the admin token.
pub const HEADER_ADMIN_TOKEN: &str = "x-admin-token";

/// Build the application router around `orchestrator`.
pub fn router(orchestrator: Orchestrator) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/deploy", post(handlers::deploy))
        .with_state(orchestrator)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(orchestrator: Orchestrator) -> Result<()> {
    let addr = orchestrator.config().bind;
    let app = router(orchestrator);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "deployd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("deployd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
