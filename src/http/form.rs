// src/http/form.rs

//! Multipart form decoding for `POST /deploy`.

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use serde_json::Value;
use tracing::debug;

use super::errors::ApiError;
use crate::deploy::DeployRequest;

/// Read the deploy form.
///
/// | field             | meaning                                     |
/// |-------------------|---------------------------------------------|
/// | `repo_url`        | required                                    |
/// | `domain`          | optional, blank means absent                |
/// | `is_spa`          | `true`/`false`/`1`/`0`/`on`/`off`/`yes`/`no` |
/// | `timeout_seconds` | optional integer, overrides the default     |
/// | `env_file`        | optional upload holding a JSON object       |
///
/// Unknown fields are ignored.
pub async fn read_deploy_form(mut multipart: Multipart) -> Result<DeployRequest, ApiError> {
    let mut repo_url: Option<String> = None;
    let mut request = DeployRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "repo_url" => repo_url = Some(text(field).await?.trim().to_string()),
            "domain" => {
                let domain = text(field).await?.trim().to_string();
                request.domain = (!domain.is_empty()).then_some(domain);
            }
            "is_spa" => request.is_spa = parse_bool(&text(field).await?)?,
            "timeout_seconds" => {
                let raw = text(field).await?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    request.timeout_seconds = Some(raw.parse().map_err(|_| {
                        ApiError::bad_request(format!(
                            "timeout_seconds must be an integer (got '{raw}')"
                        ))
                    })?);
                }
            }
            "env_file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("reading env_file: {e}")))?;
                if !bytes.is_empty() {
                    request.env = Some(parse_env_json(&bytes)?);
                }
            }
            other => debug!(field = other, "ignoring unknown form field"),
        }
    }

    request.repo_url = repo_url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::bad_request("repo_url is required"))?;
    Ok(request)
}

async fn text(field: Field<'_>) -> Result<String, ApiError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("reading field '{name}': {e}")))
}

fn parse_bool(raw: &str) -> Result<bool, ApiError> {
    match raw.trim().to_lowercase().as_str() {
        "" | "false" | "0" | "off" | "no" => Ok(false),
        "true" | "1" | "on" | "yes" => Ok(true),
        other => Err(ApiError::bad_request(format!(
            "is_spa must be a boolean (got '{other}')"
        ))),
    }
}

fn parse_env_json(bytes: &[u8]) -> Result<serde_json::Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::bad_request("env_file must contain a JSON object")),
        Err(e) => Err(ApiError::bad_request(format!("env_file is not valid JSON: {e}"))),
    }
}
