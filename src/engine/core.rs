// src/engine/core.rs

//! Pure core supervisor state machine.
//!
//! [`SupervisorCore`] consumes [`SupervisorEvent`]s and produces:
//! - an updated registry and running count
//! - a list of [`CoreCommand`]s describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Supervisor`) is responsible for:
//! - reading events from the channel
//! - handing definitions to the launcher
//! - running restart timers
//!
//! The core has no channels, no Tokio types, and performs no IO, so it can be
//! driven step by step in tests.

use tracing::{debug, info, warn};

use crate::engine::event_handlers::{
    handle_finished, handle_restart_due, handle_started, launch_leaves, CoreCommand, CoreStep,
};
use crate::engine::{LaunchEvent, SupervisorEvent};
use crate::registry::Registry;
use crate::types::RegistrySnapshot;

/// Number of launches in flight: dispatched (or scheduled for restart) but
/// not yet reported finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningCount(usize);

impl RunningCount {
    pub fn get(&self) -> usize {
        self.0
    }

    pub fn increment(&mut self) {
        self.0 += 1;
    }

    pub fn decrement(&mut self) {
        match self.0.checked_sub(1) {
            Some(n) => self.0 = n,
            None => warn!("finish event with no launch in flight"),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug)]
pub struct SupervisorCore {
    registry: Registry,
    running: RunningCount,
    started: bool,
    /// Set once we have reported that nothing is in flight but some
    /// processes are blocked on a cycle or an unknown dependency.
    blocked_reported: bool,
}

impl SupervisorCore {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            running: RunningCount::default(),
            started: false,
            blocked_reported: false,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn running_count(&self) -> usize {
        self.running.get()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }

    /// Initial action: dispatch every leaf process. Only the first call
    /// dispatches anything.
    pub fn start(&mut self) -> CoreStep {
        if self.started {
            warn!("supervisor core already started; ignoring");
            return self.finish_step(Vec::new());
        }
        self.started = true;

        let commands = launch_leaves(&mut self.registry, &mut self.running);
        self.finish_step(commands)
    }

    /// Handle a single event, updating state and returning the commands for
    /// the IO shell.
    pub fn step(&mut self, event: SupervisorEvent) -> CoreStep {
        let commands = match event {
            SupervisorEvent::Launch(LaunchEvent::Started { name, pid }) => {
                handle_started(&mut self.registry, &mut self.running, &name, pid)
            }
            SupervisorEvent::Launch(LaunchEvent::Finished {
                name,
                error,
                duration,
            }) => handle_finished(
                &mut self.registry,
                &mut self.running,
                &name,
                error,
                duration,
            ),
            SupervisorEvent::RestartDue { name } => handle_restart_due(&mut self.registry, &name),
        };

        self.finish_step(commands)
    }

    /// Keep running while launches are in flight. At zero, stop unless a
    /// waiting process is blocked by the dependency graph itself (cycle or
    /// unknown dependency); then the supervisor idles. Processes whose
    /// dependencies merely never started are left unlaunched.
    fn finish_step(&mut self, commands: Vec<CoreCommand>) -> CoreStep {
        debug!(running = self.running.get(), "core step complete");

        if !self.running.is_zero() {
            return CoreStep {
                commands,
                keep_running: true,
            };
        }

        let blocked = self.registry.waiting_on_graph();
        if blocked.is_empty() {
            let waiting = self.registry.waiting();
            if !waiting.is_empty() {
                info!(?waiting, "dependencies never started; leaving processes unlaunched");
            }
            return CoreStep {
                commands,
                keep_running: false,
            };
        }

        if !self.blocked_reported {
            warn!(
                ?blocked,
                "no launches in flight; processes blocked on a dependency cycle or unknown dependency; idling"
            );
            self.blocked_reported = true;
        }

        CoreStep {
            commands,
            keep_running: true,
        }
    }
}
