use std::sync::{Arc, Mutex};

use deployd::exec::{Invocation, OutputStream, ScriptRunner};

/// A fake runner that:
/// - records every invocation it was asked to run
/// - answers with a fixed list of fragments, ending with an exit-0 status line.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    invocations: Arc<Mutex<Vec<Invocation>>>,
    fragments: Vec<String>,
}

impl RecordingRunner {
    pub fn new(fragments: &[&str]) -> Self {
        Self {
            invocations: Arc::default(),
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

impl ScriptRunner for RecordingRunner {
    fn run(&self, invocation: Invocation) -> OutputStream {
        self.invocations.lock().unwrap().push(invocation);

        let mut out = self.fragments.clone();
        out.push(deployd::exec::TerminationOutcome::NormalExit(0).status_line());
        OutputStream::from_fragments(out)
    }
}
