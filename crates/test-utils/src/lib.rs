pub mod builders;
pub mod fake_runner;
pub mod scripts;

use std::sync::Once;
use std::time::Duration;

use deployd::exec::OutputStream;
use tokio_stream::StreamExt;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 10-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(10), f)
        .await
        .expect("Test timed out after 10 seconds")
}

/// Drain an output stream into a vector of fragments.
pub async fn collect_output(stream: OutputStream) -> Vec<String> {
    with_timeout(stream.collect::<Vec<String>>()).await
}

/// True if a process with this PID still exists (zombies excluded).
pub fn process_alive(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        // Field 3 is the state; `Z` is a zombie, `X` is dead.
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z" && state != "X"),
        Err(_) => false,
    }
}

/// Poll until the process is gone, for up to 5 seconds.
pub async fn wait_until_dead(pid: u32) -> bool {
    for _ in 0..100 {
        if !process_alive(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

/// Read a PID that a test script wrote to `path`.
pub fn read_pid(path: &std::path::Path) -> u32 {
    std::fs::read_to_string(path)
        .expect("pid file written by script")
        .trim()
        .parse()
        .expect("pid file holds a number")
}
