// src/deploy/mod.rs

//! Request orchestration: everything between an HTTP request and the
//! process-streaming core in [`crate::exec`].
//!
//! - [`request`] models a deploy request and derives script arguments.
//! - [`env_file`] encodes the request's environment map and writes it
//!   atomically.
//! - [`orchestrator`] checks the admin token, picks the script and timeout,
//!   and starts the run.

pub mod env_file;
pub mod orchestrator;
pub mod request;

pub use orchestrator::{DeployPlan, Orchestrator};
pub use request::DeployRequest;
