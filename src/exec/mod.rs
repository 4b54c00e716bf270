// src/exec/mod.rs

//! Process execution layer.
//!
//! This module owns the lifecycle of one deployment script run: it starts the
//! program, relays its merged stdout/stderr as it is produced, enforces the
//! wall-clock timeout and finishes every run with exactly one status line.
//!
//! - [`invocation`] describes *what* to run (program, args, timeout).
//! - [`launcher`] checks the program and spawns it with a merged output pipe.
//! - [`relay`] reads the pipe on a dedicated thread, one fragment at a time.
//! - [`supervisor`] races output, process exit, the deadline and the consumer,
//!   and reports the [`TerminationOutcome`].
//! - [`runner`] provides the `ScriptRunner` seam used by the orchestrator, so
//!   tests can swap in a fake implementation.

pub mod invocation;
pub mod launcher;
pub mod outcome;
pub mod relay;
pub mod runner;
pub mod stream;
pub mod supervisor;

pub use invocation::Invocation;
pub use outcome::TerminationOutcome;
pub use runner::{ProcessRunner, ScriptRunner};
pub use stream::OutputStream;
pub use supervisor::run;
