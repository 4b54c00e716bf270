// src/exec/outcome.rs

use std::fmt;

/// Final classification of how an invocation ended.
///
/// Produced exactly once per run and rendered as the last line of the output
/// stream via [`TerminationOutcome::status_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationOutcome {
    /// The process exited on its own. Non-zero codes are informational.
    /// A process killed by a signal from outside reports `-signal`.
    NormalExit(i32),
    /// The process was still running when the timeout expired and was killed.
    TimedOut(i64),
    /// No process was ever started.
    LaunchFailed(String),
    /// The process was started but its exit status could not be collected.
    Lost(String),
}

impl TerminationOutcome {
    pub(crate) fn not_executable(program: &std::path::Path) -> Self {
        TerminationOutcome::LaunchFailed(format!(
            "script not found or not executable: {}",
            program.display()
        ))
    }

    /// The single terminal line appended after all output fragments.
    pub fn status_line(&self) -> String {
        match self {
            TerminationOutcome::NormalExit(code) => {
                format!("\n--- Process exited with code {code} ---\n")
            }
            TerminationOutcome::TimedOut(secs) => {
                format!("\n--- ERROR: script timeout after {secs} seconds ---\n")
            }
            TerminationOutcome::LaunchFailed(reason) => format!("ERROR: {reason}\n"),
            TerminationOutcome::Lost(reason) => {
                format!("\n--- ERROR: process status unavailable: {reason} ---\n")
            }
        }
    }
}

impl fmt::Display for TerminationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationOutcome::NormalExit(code) => write!(f, "exited with code {code}"),
            TerminationOutcome::TimedOut(secs) => write!(f, "timed out after {secs}s"),
            TerminationOutcome::LaunchFailed(reason) => write!(f, "launch failed: {reason}"),
            TerminationOutcome::Lost(reason) => write!(f, "status lost: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines_carry_code_and_timeout() {
        assert_eq!(
            TerminationOutcome::NormalExit(3).status_line(),
            "\n--- Process exited with code 3 ---\n"
        );
        assert_eq!(
            TerminationOutcome::TimedOut(1).status_line(),
            "\n--- ERROR: script timeout after 1 seconds ---\n"
        );
    }

    #[test]
    fn launch_failure_is_a_single_line() {
        let line =
            TerminationOutcome::not_executable(std::path::Path::new("/nope/deploy.sh")).status_line();
        assert_eq!(line, "ERROR: script not found or not executable: /nope/deploy.sh\n");
        assert_eq!(line.lines().count(), 1);
    }

    #[test]
    fn lost_status_is_a_framed_error_with_the_reason() {
        let outcome = TerminationOutcome::Lost("No child processes (os error 10)".to_string());
        assert_eq!(
            outcome.status_line(),
            "\n--- ERROR: process status unavailable: No child processes (os error 10) ---\n"
        );
        assert_eq!(outcome.to_string(), "status lost: No child processes (os error 10)");
    }
}
