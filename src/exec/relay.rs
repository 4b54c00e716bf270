// src/exec/relay.rs

//! Reader side of the merged output pipe.
//!
//! The pipe is read on a dedicated OS thread with plain blocking reads and
//! each fragment is handed to the supervisor over a bounded channel. At most
//! one fragment is being assembled at a time, so memory stays flat no matter
//! how much the script prints.

use std::io::{BufRead, BufReader, ErrorKind, PipeReader, Read};
use std::thread::JoinHandle;

use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Upper bound for a single fragment. Longer lines are split.
pub const MAX_FRAGMENT_BYTES: u64 = 64 * 1024;

/// Number of fragments that may wait between the reader and the supervisor.
pub const FRAGMENT_BUFFER: usize = 16;

/// Spawn the reader thread.
///
/// The thread ends on EOF (every writer closed, i.e. the process group is
/// gone), on a read error, or as soon as the receiving side is dropped.
pub fn spawn_reader(
    output: PipeReader,
    fragments: mpsc::Sender<String>,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("deployd-relay".to_string())
        .spawn(move || relay_lines(BufReader::new(output), &fragments))
}

/// Forward `reader` line by line until EOF.
///
/// Lines keep their trailing newline; the final line may lack one. Invalid
/// UTF-8 is replaced rather than treated as an error.
pub fn relay_lines<R: BufRead>(mut reader: R, fragments: &mpsc::Sender<String>) {
    let mut buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        match (&mut reader).take(MAX_FRAGMENT_BYTES).read_until(b'\n', &mut buf) {
            Ok(0) => {
                debug!("merged output reached EOF");
                break;
            }
            Ok(n) => {
                trace!(bytes = n, "read output fragment");
                let fragment = String::from_utf8_lossy(&buf).into_owned();
                if fragments.blocking_send(fragment).is_err() {
                    debug!("fragment receiver dropped; stopping relay");
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(error = %e, "reading merged output failed; stopping relay");
                break;
            }
        }
    }
}
