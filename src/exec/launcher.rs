// src/exec/launcher.rs

//! Individual process launcher.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::{LaunchEvent, SupervisorEvent};
use crate::errors::LaunchError;
use crate::exec::sinks::StdioSinks;
use crate::privilege::{resolve_credentials, IdentityLookup};
use crate::registry::ProcessDefinition;

/// What every launch needs besides its definition.
#[derive(Debug, Clone)]
pub struct LaunchContext {
    /// Working directory for definitions without `dir`.
    pub empty_dir: PathBuf,
    pub identity: Arc<dyn IdentityLookup>,
}

impl LaunchContext {
    pub fn new(empty_dir: PathBuf, identity: Arc<dyn IdentityLookup>) -> Self {
        Self {
            empty_dir,
            identity,
        }
    }
}

/// Split an argument string on whitespace, dropping empty tokens.
///
/// Quotes and escapes are not interpreted.
pub fn split_args(args: &str) -> Vec<String> {
    args.split_whitespace().map(str::to_string).collect()
}

/// Launch one process and report its lifecycle.
///
/// Emits `Started` once the child is spawned, then exactly one `Finished`
/// when it exits. If anything fails before the child exists (sinks,
/// credentials, spawn), only `Finished` is emitted.
pub async fn launch_process(
    definition: ProcessDefinition,
    context: Arc<LaunchContext>,
    events: mpsc::Sender<SupervisorEvent>,
) {
    let name = definition.name.clone();
    info!(
        process = %name,
        path = ?definition.path,
        args = %definition.args,
        "launching"
    );

    let mut child = match spawn_child(&definition, &context) {
        Ok(child) => child,
        Err(err) => {
            error!(process = %name, error = %err, "process failed to start");
            emit_finished(&events, name, Some(err), Duration::ZERO).await;
            return;
        }
    };
    let started_at = Instant::now();

    let Some(pid) = child.id() else {
        let err = LaunchError::Wait(io::Error::other("child exited before its pid was read"));
        emit_finished(&events, name, Some(err), started_at.elapsed()).await;
        return;
    };

    debug!(process = %name, pid, "spawned");
    emit(&events, LaunchEvent::Started {
        name: name.clone(),
        pid,
    })
    .await;

    let error = match child.wait().await {
        Ok(status) if status.success() => None,
        Ok(status) => Some(LaunchError::Exited(status)),
        Err(source) => Some(LaunchError::Wait(source)),
    };
    let duration = started_at.elapsed();

    info!(
        process = %name,
        pid,
        elapsed = ?duration,
        success = error.is_none(),
        "process exited"
    );

    emit_finished(&events, name, error, duration).await;
}

/// Resolve stdio, working directory and credentials, then spawn.
fn spawn_child(
    definition: &ProcessDefinition,
    context: &LaunchContext,
) -> Result<Child, LaunchError> {
    let args = split_args(&definition.args);

    let sinks = StdioSinks::open(definition.stdout.as_deref(), definition.stderr.as_deref())?;

    let dir = definition
        .dir
        .clone()
        .unwrap_or_else(|| context.empty_dir.clone());

    let credentials = resolve_credentials(
        context.identity.as_ref(),
        &definition.user,
        &definition.group,
    )?;

    let mut cmd = Command::new(&definition.path);
    cmd.args(&args)
        .current_dir(&dir)
        .stdin(Stdio::null())
        .stdout(sinks.stdout.into_stdio())
        .stderr(sinks.stderr.into_stdio())
        .kill_on_drop(false)
        // Own process group: signals aimed at the supervisor's group don't
        // reach children and vice versa.
        .process_group(0);

    if let Some(uid) = credentials.uid {
        cmd.uid(uid);
    }
    if let Some(gid) = credentials.gid {
        cmd.gid(gid);
    }

    cmd.spawn().map_err(|source| LaunchError::Spawn {
        path: definition.path.clone(),
        source,
    })
}

async fn emit_finished(
    events: &mpsc::Sender<SupervisorEvent>,
    name: String,
    error: Option<LaunchError>,
    duration: Duration,
) {
    emit(events, LaunchEvent::Finished {
        name,
        error,
        duration,
    })
    .await;
}

async fn emit(events: &mpsc::Sender<SupervisorEvent>, event: LaunchEvent) {
    let name = event.name().to_string();
    if events.send(event.into()).await.is_err() {
        warn!(process = %name, "supervisor event channel closed; dropping launch event");
    }
}
