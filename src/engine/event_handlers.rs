// src/engine/event_handlers.rs

//! Event handling logic for the supervisor core.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::engine::core::RunningCount;
use crate::errors::LaunchError;
use crate::registry::{ProcessDefinition, Registry};
use crate::types::ProcessName;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Hand these definitions to the launcher, one launch each.
    Launch(Vec<ProcessDefinition>),
    /// Start a timer; when it fires, post `RestartDue { name }` back.
    ScheduleRestart { name: ProcessName, delay: Duration },
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer loop should keep waiting for events.
    pub keep_running: bool,
}

/// Dispatch every leaf process.
pub fn launch_leaves(registry: &mut Registry, running: &mut RunningCount) -> Vec<CoreCommand> {
    let leaves: Vec<ProcessName> = registry
        .leaves()
        .into_iter()
        .map(|d| d.name.clone())
        .collect();

    info!(?leaves, "launching leaf processes");

    let batch = dispatch_all(registry, running, leaves);
    launch_command(batch)
}

/// Handle `Started { name, pid }`.
///
/// Latches `running`, then launches every dependent that became ready.
pub fn handle_started(
    registry: &mut Registry,
    running: &mut RunningCount,
    name: &str,
    pid: u32,
) -> Vec<CoreCommand> {
    info!(process = %name, pid, "process running");

    if !registry.record_started(name, pid) {
        warn!(process = %name, pid, "start event for unknown process; ignoring");
        return Vec::new();
    }

    let ready = registry.newly_ready_dependents(name);
    for dependent in ready.iter() {
        info!(process = %dependent, dependency = %name, "soft dependencies satisfied");
    }

    let batch = dispatch_all(registry, running, ready);
    launch_command(batch)
}

/// Handle `Finished { name, error, duration }`.
///
/// Applies the restart policy:
/// - success, or `ignore_failure`: nothing more to do
/// - failure faster than `min_runtime`: give up
/// - other failure: schedule a restart after `restart_delay`
pub fn handle_finished(
    registry: &mut Registry,
    running: &mut RunningCount,
    name: &str,
    error: Option<LaunchError>,
    duration: Duration,
) -> Vec<CoreCommand> {
    let Some(definition) = registry.definition(name) else {
        warn!(process = %name, "finish event for unknown process; ignoring");
        return Vec::new();
    };
    running.decrement();

    let mut commands = Vec::new();

    match &error {
        Some(err) if !definition.ignore_failure => {
            if err.is_runtime() {
                warn!(process = %name, elapsed = ?duration, error = %err, "process failed");
            } else {
                warn!(process = %name, error = %err, "process could not be started");
            }

            if definition.failed_too_quickly(duration) {
                warn!(
                    process = %name,
                    elapsed = ?duration,
                    min_runtime = ?definition.min_runtime,
                    "process failed too quickly; giving up"
                );
            } else {
                let delay = definition.restart_delay;
                info!(process = %name, delay = ?delay, "restart scheduled");
                running.increment();
                commands.push(CoreCommand::ScheduleRestart {
                    name: name.to_string(),
                    delay,
                });
            }
        }
        Some(err) => {
            info!(
                process = %name,
                elapsed = ?duration,
                error = %err,
                "process failed; failure ignored"
            );
        }
        None => {
            info!(process = %name, elapsed = ?duration, "process finished");
        }
    }

    registry.record_finished(name, error, duration);
    commands
}

/// Handle an elapsed restart delay.
///
/// The restart was already counted as in flight when it was scheduled.
pub fn handle_restart_due(registry: &mut Registry, name: &str) -> Vec<CoreCommand> {
    match registry.mark_dispatched(name) {
        Some(definition) => {
            debug!(process = %name, "restart delay elapsed");
            vec![CoreCommand::Launch(vec![definition])]
        }
        None => {
            warn!(process = %name, "restart due for unknown process; ignoring");
            Vec::new()
        }
    }
}

fn dispatch_all(
    registry: &mut Registry,
    running: &mut RunningCount,
    names: Vec<ProcessName>,
) -> Vec<ProcessDefinition> {
    let mut batch = Vec::with_capacity(names.len());
    for name in names {
        if let Some(definition) = registry.mark_dispatched(&name) {
            running.increment();
            batch.push(definition);
        }
    }
    batch
}

fn launch_command(batch: Vec<ProcessDefinition>) -> Vec<CoreCommand> {
    if batch.is_empty() {
        Vec::new()
    } else {
        vec![CoreCommand::Launch(batch)]
    }
}
