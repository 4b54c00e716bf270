// src/lib.rs

pub mod cli;
pub mod config;
pub mod deploy;
pub mod errors;
pub mod exec;
pub mod http;
pub mod logging;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::cli::CliArgs;
use crate::deploy::Orchestrator;
use crate::exec::ProcessRunner;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - layered config loading (file, environment, flags)
/// - the orchestrator with the real process runner
/// - the HTTP server with Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = config::load(args.config.as_deref(), args.bind.as_deref())?;

    if args.check {
        print_config(&cfg);
        return Ok(());
    }

    info!(
        cert_script = %cfg.cert_script.display(),
        spa_script = %cfg.spa_script.display(),
        default_timeout_secs = cfg.default_timeout_secs,
        admin_token = cfg.admin_token.is_some(),
        "configuration loaded"
    );

    let orchestrator = Orchestrator::new(cfg, Arc::new(ProcessRunner));
    http::serve(orchestrator).await
}

/// `--check` output: the effective configuration, token redacted.
fn print_config(cfg: &config::Config) {
    println!("deployd configuration");
    println!("  bind                 = {}", cfg.bind);
    println!("  cert_script          = {}", cfg.cert_script.display());
    println!("  spa_script           = {}", cfg.spa_script.display());
    println!(
        "  admin_token          = {}",
        if cfg.admin_token.is_some() { "<set>" } else { "<unset>" }
    );
    println!("  default_timeout_secs = {}", cfg.default_timeout_secs);
    println!("  apps_base            = {}", cfg.apps_base.display());
    for (name, path) in [("cert_script", &cfg.cert_script), ("spa_script", &cfg.spa_script)] {
        if !exec::launcher::is_executable(path) {
            println!("  warning: {name} is missing or not executable");
        }
    }
}
