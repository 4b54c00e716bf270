// src/http/handlers.rs

use std::convert::Infallible;

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tokio_stream::StreamExt;
use tracing::warn;

use super::HEADER_ADMIN_TOKEN;
use super::errors::ApiError;
use super::form::read_deploy_form;
use crate::deploy::Orchestrator;

pub(crate) async fn root() -> Json<Value> {
    Json(json!({ "ok": true, "note": "Orchestrator - streaming logs enabled." }))
}

/// `POST /deploy`.
///
/// The token is checked before the body is read. Once the script is started
/// the status is 200 whatever the exit code; the outcome is the last line of
/// the body.
pub(crate) async fn deploy(
    State(orchestrator): State<Orchestrator>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let token = headers
        .get(HEADER_ADMIN_TOKEN)
        .and_then(|value| value.to_str().ok());
    if let Err(err) = orchestrator.authorize(token) {
        warn!("rejected deploy request with invalid admin token");
        return Err(err.into());
    }

    let request = read_deploy_form(multipart).await?;
    let output = orchestrator.deploy(request).await?;

    let body = Body::from_stream(output.map(Ok::<_, Infallible>));
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response())
}
