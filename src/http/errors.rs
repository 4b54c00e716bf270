// src/http/errors.rs

//! JSON error responses for failures that happen before streaming starts.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::errors::DeploydError;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl From<DeploydError> for ApiError {
    fn from(err: DeploydError) -> Self {
        match err {
            DeploydError::InvalidRequest(msg) => ApiError::bad_request(msg),
            DeploydError::Forbidden(msg) => ApiError::forbidden(msg),
            other => {
                error!(error = %other, "deploy request failed");
                ApiError::internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let title = self
            .status
            .canonical_reason()
            .unwrap_or("error")
            .to_lowercase();
        let body = Json(json!({ "error": title, "detail": self.detail }));
        (self.status, body).into_response()
    }
}
