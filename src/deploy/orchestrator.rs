// src/deploy/orchestrator.rs

use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::info;

use crate::config::Config;
use crate::deploy::env_file::{ENV_FILE_MODE, atomic_write, encode_env};
use crate::deploy::request::{DeployRequest, derive_app_name};
use crate::errors::{DeploydError, Result};
use crate::exec::{Invocation, OutputStream, ScriptRunner};

/// A validated request: the app it deploys and the script run it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    pub app: String,
    pub invocation: Invocation,
}

/// Turns deploy requests into script runs.
///
/// Holds the immutable [`Config`] and the [`ScriptRunner`]. Cheap to clone;
/// concurrent deployments do not share any per-run state.
#[derive(Clone)]
pub struct Orchestrator {
    config: Arc<Config>,
    runner: Arc<dyn ScriptRunner>,
}

impl Orchestrator {
    pub fn new(config: Config, runner: Arc<dyn ScriptRunner>) -> Self {
        Self {
            config: Arc::new(config),
            runner,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check the `X-ADMIN-TOKEN` value against the configured token.
    ///
    /// Always passes when no admin token is configured.
    pub fn authorize(&self, token: Option<&str>) -> Result<()> {
        match self.config.admin_token.as_deref() {
            None => Ok(()),
            Some(expected) if token == Some(expected) => Ok(()),
            Some(_) => Err(DeploydError::Forbidden("invalid admin token".to_string())),
        }
    }

    /// Script for this request: the SPA script or the cert script.
    pub fn select_script(&self, is_spa: bool) -> &Path {
        if is_spa {
            &self.config.spa_script
        } else {
            &self.config.cert_script
        }
    }

    /// Validate `request` and build its plan without side effects.
    pub fn plan(&self, request: &DeployRequest) -> Result<DeployPlan> {
        if request.repo_url.trim().is_empty() {
            return Err(DeploydError::InvalidRequest(
                "repo_url is required".to_string(),
            ));
        }
        let app = derive_app_name(&request.repo_url)?;

        let timeout = request
            .timeout_seconds
            .unwrap_or(self.config.default_timeout_secs);

        Ok(DeployPlan {
            app,
            invocation: Invocation::new(
                self.select_script(request.is_spa),
                request.script_args(),
                timeout,
            ),
        })
    }

    /// Run a deployment.
    ///
    /// Writes `{apps_base}/.env` when the request carries a non-empty env map,
    /// then starts the script and returns its live output. Script failures
    /// show up in the stream, never as an `Err` here.
    pub async fn deploy(&self, request: DeployRequest) -> Result<OutputStream> {
        let DeployPlan { app, invocation } = self.plan(&request)?;

        if let Some(vars) = request.env.as_ref().filter(|vars| !vars.is_empty()) {
            let path = self.config.env_file_path();
            let contents = encode_env(vars);
            let target = path.clone();
            // fsync and rename block; keep them off the runtime workers.
            tokio::task::spawn_blocking(move || {
                atomic_write(&target, contents.as_bytes(), ENV_FILE_MODE)
            })
            .await
            .map_err(|e| DeploydError::Other(anyhow!("env file writer failed: {e}")))??;
            info!(app = %app, path = %path.display(), vars = vars.len(), "wrote env file");
        }

        info!(
            app = %app,
            script = %invocation.program().display(),
            is_spa = request.is_spa,
            timeout_secs = invocation.timeout_secs(),
            "deployment requested"
        );

        Ok(self.runner.run(invocation))
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
