// src/config/mod.rs

//! Configuration loading and validation for deployd.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file and overlay environment variables (`loader.rs`).
//! - Validate the result into an immutable [`Config`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{apply_env_overrides, load, load_from_path};
pub use model::{Config, RawConfig};
