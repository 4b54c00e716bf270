// src/deploy/request.rs

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::{DeploydError, Result};

/// A single deployment request after it has been read off the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeployRequest {
    pub repo_url: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub is_spa: bool,
    /// Overrides the configured default timeout for this run only.
    #[serde(default)]
    pub timeout_seconds: Option<i64>,
    /// Variables to materialise into the apps `.env` file.
    #[serde(default)]
    pub env: Option<Map<String, Value>>,
}

impl DeployRequest {
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            ..Self::default()
        }
    }

    /// Positional arguments for the deployment script: the repository URL,
    /// then the domain when one was given.
    pub fn script_args(&self) -> Vec<String> {
        let mut args = vec![self.repo_url.clone()];
        if let Some(domain) = self.domain.as_deref().map(str::trim)
            && !domain.is_empty()
        {
            args.push(domain.to_string());
        }
        args
    }
}

/// Derive the application name from a repository URL.
///
/// Takes the last path segment and strips a trailing `.git`. Works for
/// `https://host/org/app.git`, `git@host:org/app.git` and bare names.
pub fn derive_app_name(repo_url: &str) -> Result<String> {
    let trimmed = repo_url.trim();
    let path = match trimmed.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map_or("", |(_, path)| path),
        None => trimmed,
    };
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let base = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let base = base.rsplit(':').next().unwrap_or_default();
    let name = base.strip_suffix(".git").unwrap_or(base);

    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(DeploydError::InvalidRequest(format!(
            "cannot derive safe app name from repo_url: {repo_url}"
        )));
    }
    Ok(name.to_string())
}
