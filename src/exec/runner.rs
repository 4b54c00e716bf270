// src/exec/runner.rs

//! Pluggable runner abstraction.
//!
//! The orchestrator talks to a `ScriptRunner` instead of calling [`run`]
//! directly, so HTTP tests can record invocations and return canned output
//! without spawning anything.
//!
//! [`run`]: super::run

use super::{Invocation, OutputStream};

/// Turns an invocation into its output stream.
pub trait ScriptRunner: Send + Sync {
    fn run(&self, invocation: Invocation) -> OutputStream;
}

/// Production runner: real child processes via [`super::run`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ScriptRunner for ProcessRunner {
    fn run(&self, invocation: Invocation) -> OutputStream {
        super::run(invocation)
    }
}
