// src/exec/invocation.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

/// One request to run an external program with fixed arguments and timeout.
///
/// Immutable once built. A fresh `Invocation` (or a clone) is needed for every
/// run; nothing is shared between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<String>,
    timeout_secs: i64,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout_secs: i64) -> Self {
        Self {
            program: program.into(),
            args,
            timeout_secs,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Timeout exactly as requested, which may be zero or negative.
    pub fn timeout_secs(&self) -> i64 {
        self.timeout_secs
    }

    /// Wall-clock budget for the process.
    ///
    /// `None` when the timeout is zero or negative: such an invocation has
    /// already run out of time and must not be started.
    pub fn time_limit(&self) -> Option<Duration> {
        u64::try_from(self.timeout_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_timeout_becomes_time_limit() {
        let inv = Invocation::new("/bin/true", vec![], 30);
        assert_eq!(inv.time_limit(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn zero_and_negative_timeouts_have_no_time_limit() {
        assert_eq!(Invocation::new("/bin/true", vec![], 0).time_limit(), None);
        assert_eq!(Invocation::new("/bin/true", vec![], -5).time_limit(), None);
    }
}
