// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{Config, RawConfig};
use crate::errors::{DeploydError, Result};

/// Load a configuration file from a given path and return the raw `RawConfig`.
///
/// This only performs TOML deserialization; it does **not** validate. Use
/// [`load`] for the full layered configuration.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Overlay environment variables onto `raw`.
///
/// `lookup` is `std::env::var` in production; tests pass a map so the real
/// process environment is never touched.
///
/// | variable             | key                    |
/// |----------------------|------------------------|
/// | `DEPLOYD_BIND`       | `bind`                 |
/// | `DEPLOY_CERT_SCRIPT` | `cert_script`          |
/// | `DEPLOY_SPA_SCRIPT`  | `spa_script`           |
/// | `ADMIN_API_TOKEN`    | `admin_token`          |
/// | `DEFAULT_TIMEOUT`    | `default_timeout_secs` |
/// | `APPS_BASE`          | `apps_base`            |
pub fn apply_env_overrides<F>(raw: &mut RawConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(bind) = lookup("DEPLOYD_BIND") {
        raw.bind = bind;
    }
    if let Some(path) = lookup("DEPLOY_CERT_SCRIPT") {
        raw.cert_script = PathBuf::from(path);
    }
    if let Some(path) = lookup("DEPLOY_SPA_SCRIPT") {
        raw.spa_script = PathBuf::from(path);
    }
    if let Some(token) = lookup("ADMIN_API_TOKEN") {
        raw.admin_token = Some(token);
    }
    if let Some(timeout) = lookup("DEFAULT_TIMEOUT") {
        raw.default_timeout_secs = timeout.trim().parse().map_err(|_| {
            DeploydError::ConfigError(format!(
                "DEFAULT_TIMEOUT must be a whole number of seconds (got '{timeout}')"
            ))
        })?;
    }
    if let Some(path) = lookup("APPS_BASE") {
        raw.apps_base = PathBuf::from(path);
    }
    Ok(())
}

/// Build the effective configuration.
///
/// Layers, lowest to highest priority:
///
/// - built-in defaults,
/// - the TOML file at `path` (if given),
/// - environment variables (see [`apply_env_overrides`]),
/// - `bind_override` (the `--bind` flag).
pub fn load(path: Option<&Path>, bind_override: Option<&str>) -> Result<Config> {
    let mut raw = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config file");
            load_from_path(path)?
        }
        None => RawConfig::default(),
    };

    apply_env_overrides(&mut raw, |key| std::env::var(key).ok())?;

    if let Some(bind) = bind_override {
        raw.bind = bind.to_string();
    }

    Config::try_from(raw)
}
