// src/config/validate.rs

use std::net::SocketAddr;

use crate::config::model::{Config, RawConfig};
use crate::errors::{DeploydError, Result};

impl TryFrom<RawConfig> for Config {
    type Error = DeploydError;

    fn try_from(raw: RawConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let bind: SocketAddr = raw.bind.trim().parse().map_err(|e| {
            DeploydError::ConfigError(format!("bind address '{}' is invalid: {e}", raw.bind))
        })?;

        Ok(Config {
            bind,
            cert_script: raw.cert_script,
            spa_script: raw.spa_script,
            admin_token: raw.admin_token.filter(|t| !t.trim().is_empty()),
            default_timeout_secs: raw.default_timeout_secs,
            apps_base: raw.apps_base,
        })
    }
}

fn validate_raw_config(cfg: &RawConfig) -> Result<()> {
    if cfg.default_timeout_secs < 1 {
        return Err(DeploydError::ConfigError(format!(
            "default_timeout_secs must be >= 1 (got {})",
            cfg.default_timeout_secs
        )));
    }

    for (key, path) in [("cert_script", &cfg.cert_script), ("spa_script", &cfg.spa_script)] {
        if path.as_os_str().is_empty() {
            return Err(DeploydError::ConfigError(format!("{key} must not be empty")));
        }
    }

    if cfg.apps_base.as_os_str().is_empty() {
        return Err(DeploydError::ConfigError(
            "apps_base must not be empty".to_string(),
        ));
    }

    Ok(())
}
