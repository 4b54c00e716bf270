#![allow(dead_code)]

use std::path::{Path, PathBuf};

use deployd::config::{Config, RawConfig};

/// Builder for `Config` to simplify test setup.
pub struct ConfigBuilder {
    config: RawConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfig {
                bind: "127.0.0.1:0".to_string(),
                ..RawConfig::default()
            },
        }
    }

    pub fn cert_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cert_script = path.into();
        self
    }

    pub fn spa_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.spa_script = path.into();
        self
    }

    pub fn admin_token(mut self, token: &str) -> Self {
        self.config.admin_token = Some(token.to_string());
        self
    }

    pub fn default_timeout(mut self, secs: i64) -> Self {
        self.config.default_timeout_secs = secs;
        self
    }

    pub fn apps_base(mut self, path: &Path) -> Self {
        self.config.apps_base = path.to_path_buf();
        self
    }

    pub fn build(self) -> Config {
        Config::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
