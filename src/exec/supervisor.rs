// src/exec/supervisor.rs

//! Timeout guard and completion reporting for one invocation.
//!
//! A supervising task owns the process handle and the sending half of the
//! output stream. It races four things:
//!
//! - the next fragment from the relay thread,
//! - the process exiting,
//! - the deadline,
//! - the consumer going away.
//!
//! Only the supervisor writes to the output stream, so fragments stay in
//! production order and the status line is always the last item.

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use super::launcher::{self, RunningProcess};
use super::relay::{self, FRAGMENT_BUFFER};
use super::{Invocation, OutputStream, TerminationOutcome};

/// Capacity of the channel between the supervisor and the consumer.
const OUTPUT_BUFFER: usize = 16;

/// Run `invocation` and return its output as a lazy stream.
///
/// Must be called from within a Tokio runtime. The process starts right away;
/// output is buffered only up to a small bound until the stream is polled.
pub fn run(invocation: Invocation) -> OutputStream {
    let (out_tx, out_rx) = mpsc::channel::<String>(OUTPUT_BUFFER);

    tokio::spawn(async move {
        supervise(invocation, out_tx).await;
    });

    OutputStream::new(ReceiverStream::new(out_rx))
}

async fn supervise(invocation: Invocation, out: mpsc::Sender<String>) {
    info!(
        program = %invocation.program().display(),
        args = ?invocation.args(),
        timeout_secs = invocation.timeout_secs(),
        "starting script"
    );

    let Some(outcome) = drive(&invocation, &out).await else {
        info!(
            program = %invocation.program().display(),
            "client disconnected; script stopped"
        );
        return;
    };

    match &outcome {
        TerminationOutcome::NormalExit(code) => {
            info!(program = %invocation.program().display(), exit_code = code, "script exited")
        }
        other => warn!(program = %invocation.program().display(), outcome = %other, "script did not complete"),
    }

    if out.send(outcome.status_line()).await.is_err() {
        debug!("consumer dropped before the status line was delivered");
    }
}

/// Run the process to completion.
///
/// Returns `None` if the consumer disappeared, in which case the process
/// group has already been killed and reaped.
async fn drive(invocation: &Invocation, out: &mpsc::Sender<String>) -> Option<TerminationOutcome> {
    if !launcher::is_executable(invocation.program()) {
        return Some(TerminationOutcome::not_executable(invocation.program()));
    }

    let Some(limit) = invocation.time_limit() else {
        debug!(timeout_secs = invocation.timeout_secs(), "non-positive timeout; not starting");
        return Some(TerminationOutcome::TimedOut(invocation.timeout_secs().max(0)));
    };

    let (mut process, output) = match launcher::launch(invocation) {
        Ok(started) => started,
        Err(outcome) => return Some(outcome),
    };

    let (frag_tx, mut frag_rx) = mpsc::channel::<String>(FRAGMENT_BUFFER);
    if let Err(e) = relay::spawn_reader(output, frag_tx) {
        process.kill();
        process.reap().await;
        return Some(TerminationOutcome::Lost(format!("cannot start output relay: {e}")));
    }

    let deadline = tokio::time::sleep(limit);
    tokio::pin!(deadline);
    let mut deadline_armed = true;

    let mut exit_watch = process.watch_exit();
    let mut exit_code: Option<i32> = None;
    let mut reading = true;
    let mut pending: Option<String> = None;

    loop {
        if !reading
            && pending.is_none()
            && let Some(code) = exit_code
        {
            process.reap().await;
            return Some(TerminationOutcome::NormalExit(code));
        }

        tokio::select! {
            biased;

            _ = &mut deadline, if deadline_armed => {
                process.kill();
                if exit_code.is_some() {
                    // Exited in time; only leftovers still held the pipe open.
                    // What they wrote before the kill is still delivered.
                    debug!(pid = process.pid(), "deadline hit while draining output");
                    deadline_armed = false;
                    continue;
                }
                process.reap().await;
                return Some(TerminationOutcome::TimedOut(invocation.timeout_secs()));
            }

            joined = &mut exit_watch, if exit_code.is_none() => {
                match joined {
                    Ok(Ok(code)) => {
                        debug!(pid = process.pid(), exit_code = code, "process exited");
                        exit_code = Some(code);
                    }
                    Ok(Err(e)) => return Some(lost(&mut process, e.to_string()).await),
                    Err(e) => return Some(lost(&mut process, e.to_string()).await),
                }
            }

            permit = out.reserve(), if pending.is_some() => {
                match permit {
                    Ok(permit) => {
                        if let Some(fragment) = pending.take() {
                            permit.send(fragment);
                        }
                    }
                    Err(_) => {
                        disconnect(&mut process).await;
                        return None;
                    }
                }
            }

            fragment = frag_rx.recv(), if reading && pending.is_none() => {
                match fragment {
                    Some(fragment) => pending = Some(fragment),
                    None => reading = false,
                }
            }

            _ = out.closed(), if pending.is_none() => {
                disconnect(&mut process).await;
                return None;
            }
        }
    }
}

async fn lost(process: &mut RunningProcess, reason: String) -> TerminationOutcome {
    warn!(pid = process.pid(), error = %reason, "lost track of script; killing it");
    process.kill();
    process.reap().await;
    TerminationOutcome::Lost(reason)
}

async fn disconnect(process: &mut RunningProcess) {
    warn!(pid = process.pid(), "output consumer closed; killing script");
    process.kill();
    process.reap().await;
}
