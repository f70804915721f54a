// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod privilege;
pub mod registry;
pub mod signals;
pub mod types;

use std::io::Write;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::model::ConfigFile;
use crate::engine::{Supervisor, SupervisorCore, SupervisorEvent};
use crate::errors::Result;
use crate::exec::{ensure_empty_dir, remove_empty_dir, LaunchContext, RealLaunchBackend};
use crate::privilege::SystemIdentity;
use crate::registry::Registry;
use crate::signals::{
    render_status_table, NixSignaller, ProcessSignaller, SignalHandler, SignalRequest, SweepReport,
};

/// How supervision ended.
#[derive(Debug)]
pub enum Outcome {
    /// Every launch finished and nothing is left waiting.
    Completed,
    /// A terminate request arrived; children were signalled.
    Terminated(SweepReport),
}

/// High-level entry point used by `main.rs`, after config loading and
/// logging setup.
///
/// This wires together:
/// - the registry seeded from config
/// - the real launcher
/// - the supervisor loop
/// - OS signal handling
pub async fn run(args: &CliArgs, cfg: ConfigFile) -> Result<Outcome> {
    let registry = Registry::from_config(&cfg);

    if args.dry_run {
        print_dry_run(&cfg, &registry)?;
        return Ok(Outcome::Completed);
    }

    let empty_dir = ensure_empty_dir(None)?;
    debug!(dir = ?empty_dir, "default working directory ready");

    let context = LaunchContext::new(empty_dir.clone(), Arc::new(SystemIdentity));
    let requests = signals::listen()?;

    let outcome = supervise(registry, context, requests, NixSignaller).await?;

    // After a terminate sweep children may still be running inside it.
    if let Outcome::Completed = outcome {
        if let Err(e) = remove_empty_dir(&empty_dir) {
            warn!(dir = ?empty_dir, error = %e, "failed to remove default working directory");
        }
    }

    Ok(outcome)
}

/// Run the supervisor with the real launcher until it completes or a
/// terminate request arrives on `requests`.
pub async fn supervise<S: ProcessSignaller>(
    registry: Registry,
    context: LaunchContext,
    requests: mpsc::Receiver<SignalRequest>,
    signaller: S,
) -> Result<Outcome> {
    let (tx, rx) = mpsc::channel::<SupervisorEvent>(64);

    let launcher = RealLaunchBackend::new(tx.clone(), context);
    let core = SupervisorCore::new(registry);
    let supervisor = Supervisor::new(core, tx, rx, launcher);
    let handler = SignalHandler::new(supervisor.subscribe(), signaller);

    let mut stderr = std::io::stderr();

    tokio::select! {
        res = supervisor.run() => {
            res?;
            info!("supervision complete");
            Ok(Outcome::Completed)
        }
        Some(report) = handler.run(requests, &mut stderr) => {
            Ok(Outcome::Terminated(report))
        }
    }
}

/// Dry-run output: the process table plus restart policy and dependencies.
fn print_dry_run(cfg: &ConfigFile, registry: &Registry) -> Result<()> {
    let mut out = std::io::stdout().lock();

    writeln!(out, "paladin dry-run")?;
    match cfg.log_file {
        Some(ref path) => writeln!(out, "  log_file = {}", path.display())?,
        None => writeln!(out, "  log_file = <stderr>")?,
    }
    writeln!(out)?;

    render_status_table(&registry.snapshot(), &mut out)?;
    writeln!(out)?;

    for definition in registry.entries().map(|e| &e.definition) {
        writeln!(out, "  - {}", definition.name)?;
        if !definition.soft_depends.is_empty() {
            writeln!(out, "      soft_depends: {:?}", definition.soft_depends)?;
        }
        if definition.ignore_failure {
            writeln!(out, "      ignore_failure: true")?;
        } else {
            writeln!(out, "      restart_delay: {:?}", definition.restart_delay)?;
        }
        if !definition.min_runtime.is_zero() {
            writeln!(out, "      min_runtime: {:?}", definition.min_runtime)?;
        }
    }

    debug!("dry-run complete (nothing launched)");
    Ok(())
}
