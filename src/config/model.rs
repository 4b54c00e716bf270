// src/config/model.rs

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// bind = "0.0.0.0:8000"
/// cert_script = "/opt/vps-deployment/deploy_app_with_certs.sh"
/// spa_script = "/opt/vps-deployment/deploy-spa-app.sh"
/// admin_token = "change-me"
/// default_timeout_secs = 1800
/// apps_base = "/opt/vps-deployment/apps"
/// ```
///
/// Every key is optional and has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Listen address for the HTTP server.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Script used for regular deployments (app + TLS certificates).
    #[serde(default = "default_cert_script")]
    pub cert_script: PathBuf,

    /// Script used when the request asks for a single-page app.
    #[serde(default = "default_spa_script")]
    pub spa_script: PathBuf,

    /// If set, `POST /deploy` requires a matching `X-ADMIN-TOKEN` header.
    #[serde(default)]
    pub admin_token: Option<String>,

    /// Timeout for a script run when the request does not specify one.
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: i64,

    /// Directory that receives the `.env` file written from the request.
    #[serde(default = "default_apps_base")]
    pub apps_base: PathBuf,
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_cert_script() -> PathBuf {
    PathBuf::from("/opt/vps-deployment/deploy_app_with_certs.sh")
}

fn default_spa_script() -> PathBuf {
    PathBuf::from("/opt/vps-deployment/deploy-spa-app.sh")
}

fn default_timeout_secs() -> i64 {
    1800
}

fn default_apps_base() -> PathBuf {
    PathBuf::from("/opt/vps-deployment/apps")
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cert_script: default_cert_script(),
            spa_script: default_spa_script(),
            admin_token: None,
            default_timeout_secs: default_timeout_secs(),
            apps_base: default_apps_base(),
        }
    }
}

/// Validated, immutable service configuration.
///
/// Built once at startup and handed to the orchestrator; nothing reads the
/// environment after that.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: SocketAddr,
    pub cert_script: PathBuf,
    pub spa_script: PathBuf,
    pub admin_token: Option<String>,
    pub default_timeout_secs: i64,
    pub apps_base: PathBuf,
}

impl Config {
    /// Path of the env file materialised from deploy requests.
    pub fn env_file_path(&self) -> PathBuf {
        self.apps_base.join(".env")
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind", &self.bind)
            .field("cert_script", &self.cert_script)
            .field("spa_script", &self.spa_script)
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .field("default_timeout_secs", &self.default_timeout_secs)
            .field("apps_base", &self.apps_base)
            .finish()
    }
}
