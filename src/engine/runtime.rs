// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::LaunchBackend;
use crate::registry::ProcessDefinition;
use crate::types::{ProcessName, RegistrySnapshot};

use super::core::SupervisorCore;
use super::{CoreCommand, CoreStep, SupervisorEvent};

/// Drives the supervisor core in response to `SupervisorEvent`s and delegates
/// actual launching to a `LaunchBackend`.
///
/// This is a pure IO shell around `SupervisorCore`, which contains all the
/// supervision semantics. It is the only place the core is touched, so the
/// registry has exactly one writer.
pub struct Supervisor<L: LaunchBackend> {
    core: SupervisorCore,
    event_tx: mpsc::Sender<SupervisorEvent>,
    event_rx: mpsc::Receiver<SupervisorEvent>,
    launcher: L,
    status_tx: watch::Sender<RegistrySnapshot>,
}

impl<L: LaunchBackend> fmt::Debug for Supervisor<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<L: LaunchBackend> Supervisor<L> {
    /// `event_tx` must feed `event_rx`; it is used to post restart-timer
    /// expiries back into the loop.
    pub fn new(
        core: SupervisorCore,
        event_tx: mpsc::Sender<SupervisorEvent>,
        event_rx: mpsc::Receiver<SupervisorEvent>,
        launcher: L,
    ) -> Self {
        let (status_tx, _) = watch::channel(core.snapshot());
        Self {
            core,
            event_tx,
            event_rx,
            launcher,
            status_tx,
        }
    }

    /// Read-only registry view for the signal handler.
    ///
    /// Updated after every handled event; readers may see a slightly stale
    /// state.
    pub fn subscribe(&self) -> watch::Receiver<RegistrySnapshot> {
        self.status_tx.subscribe()
    }

    /// Main event loop.
    ///
    /// - Launches all leaf processes.
    /// - Consumes `SupervisorEvent`s one at a time and feeds them into the core.
    /// - Executes commands returned by the core (launch, schedule restart).
    /// - Returns once nothing is in flight and nothing is left waiting.
    pub async fn run(mut self) -> Result<()> {
        info!(processes = self.core.registry().len(), "supervisor started");

        let step = self.core.start();
        if !self.apply(step).await? {
            info!("nothing to supervise; exiting");
            return Ok(());
        }

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("supervisor event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "supervisor received event");

            let step = self.core.step(event);
            if !self.apply(step).await? {
                info!("all launches finished; stopping supervisor");
                break;
            }
        }

        info!("supervisor exiting");
        Ok(())
    }

    /// Execute a step's commands and publish the new snapshot. Returns
    /// `keep_running`.
    async fn apply(&mut self, step: CoreStep) -> Result<bool> {
        for command in step.commands {
            self.execute_command(command).await?;
        }
        self.status_tx.send_replace(self.core.snapshot());
        Ok(step.keep_running)
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::Launch(definitions) => self.launch(definitions).await,
            CoreCommand::ScheduleRestart { name, delay } => {
                self.schedule_restart(name, delay);
                Ok(())
            }
        }
    }

    async fn launch(&mut self, definitions: Vec<ProcessDefinition>) -> Result<()> {
        if definitions.is_empty() {
            return Ok(());
        }

        let names: Vec<_> = definitions.iter().map(|d| d.name.as_str()).collect();
        debug!(?names, "dispatching launches");

        self.launcher.launch(definitions).await
    }

    /// Run the restart delay on its own task so the loop keeps handling
    /// other events meanwhile.
    fn schedule_restart(&self, name: ProcessName, delay: Duration) {
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(SupervisorEvent::RestartDue { name }).await.is_err() {
                debug!("supervisor gone before restart delay elapsed");
            }
        });
    }
}
