// src/registry/mod.rs

//! Process registry: every definition plus its runtime state.
//!
//! - [`definition`] holds the immutable [`ProcessDefinition`].
//! - [`state`] holds the mutable [`RuntimeState`].
//! - [`readiness`] evaluates soft-dependency readiness.
//!
//! The registry is owned by the engine's core and mutated only from there.
//! Other tasks see it through [`RegistrySnapshot`]s.

pub mod definition;
pub mod readiness;
pub mod state;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tracing::warn;

use crate::config::model::ConfigFile;
use crate::errors::LaunchError;
use crate::types::{ProcessName, ProcessStatus, RegistrySnapshot};

pub use definition::ProcessDefinition;
pub use state::RuntimeState;

/// One registry row.
#[derive(Debug)]
pub struct ProcessEntry {
    pub definition: ProcessDefinition,
    pub state: RuntimeState,
}

/// Table of all managed processes, keyed by name, iterated in definition order.
///
/// Entries are never removed; only their [`RuntimeState`] changes.
#[derive(Debug, Default)]
pub struct Registry {
    order: Vec<ProcessName>,
    entries: HashMap<ProcessName, ProcessEntry>,
    /// Reverse dependency index: name -> processes listing it in `soft_depends`.
    dependents: HashMap<ProcessName, Vec<ProcessName>>,
    /// Processes that can never become ready whatever happens at runtime.
    graph_blocked: HashSet<ProcessName>,
}

impl Registry {
    /// Seed a registry with every definition in the "not running" state.
    pub fn from_definitions(definitions: impl IntoIterator<Item = ProcessDefinition>) -> Self {
        let mut registry = Registry::default();

        for definition in definitions {
            let name = definition.name.clone();
            if registry.entries.contains_key(&name) {
                warn!(process = %name, "duplicate process definition ignored");
                continue;
            }

            for dep in definition.soft_depends.iter() {
                registry
                    .dependents
                    .entry(dep.clone())
                    .or_default()
                    .push(name.clone());
            }

            registry.order.push(name.clone());
            registry.entries.insert(
                name,
                ProcessEntry {
                    definition,
                    state: RuntimeState::default(),
                },
            );
        }

        registry.graph_blocked = registry.blocked_by_graph();
        registry
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::from_definitions(cfg.process.iter().map(ProcessDefinition::from))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Process names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn definition(&self, name: &str) -> Option<&ProcessDefinition> {
        self.entries.get(name).map(|e| &e.definition)
    }

    pub fn state(&self, name: &str) -> Option<&RuntimeState> {
        self.entries.get(name).map(|e| &e.state)
    }

    /// Entries in definition order.
    pub fn entries(&self) -> impl Iterator<Item = &ProcessEntry> {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }

    /// Definitions without soft dependencies, in definition order.
    pub fn leaves(&self) -> Vec<&ProcessDefinition> {
        self.entries()
            .map(|e| &e.definition)
            .filter(|d| d.is_leaf())
            .collect()
    }

    /// Processes that list `name` in their `soft_depends`.
    pub fn dependents_of(&self, name: &str) -> &[ProcessName] {
        self.dependents
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Record that a launch of `name` was handed to the launcher.
    ///
    /// Returns a copy of the definition to launch, or `None` for an unknown name.
    pub fn mark_dispatched(&mut self, name: &str) -> Option<ProcessDefinition> {
        let entry = self.entries.get_mut(name)?;
        entry.state.dispatched = true;
        entry.state.launches += 1;
        Some(entry.definition.clone())
    }

    /// Latch `running` and store the pid. Returns `false` for an unknown name.
    pub fn record_started(&mut self, name: &str, pid: u32) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.state.running = true;
                entry.state.pid = Some(pid);
                true
            }
            None => false,
        }
    }

    /// Store the outcome of a finished launch. `running` is left untouched.
    pub fn record_finished(
        &mut self,
        name: &str,
        error: Option<LaunchError>,
        duration: Duration,
    ) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.state.last_error = error;
                entry.state.last_duration = duration;
                true
            }
            None => false,
        }
    }

    /// Processes never dispatched so far, in definition order.
    pub fn waiting(&self) -> Vec<&str> {
        self.entries()
            .filter(|e| !e.state.dispatched)
            .map(|e| e.definition.name.as_str())
            .collect()
    }

    /// Waiting processes that sit on a dependency cycle, name an unknown
    /// dependency, or depend (transitively) on such a process.
    pub fn waiting_on_graph(&self) -> Vec<&str> {
        self.waiting()
            .into_iter()
            .filter(|name| self.graph_blocked.contains(*name))
            .collect()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let processes = self
            .entries()
            .map(|e| ProcessStatus {
                name: e.definition.name.clone(),
                running: e.state.running,
                pid: e.state.pid,
                path: e.definition.path.clone(),
                args: e.definition.args.clone(),
                user: e.definition.user.clone(),
                group: e.definition.group.clone(),
            })
            .collect();

        RegistrySnapshot { processes }
    }
}
