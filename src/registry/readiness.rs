// src/registry/readiness.rs

//! Soft-dependency readiness.
//!
//! A process is ready once every name in its `soft_depends` has reached
//! `running` at least once. Readiness is recomputed from scratch on every
//! check. A dependency name that is not in the registry is never satisfied,
//! so its dependent waits forever; cycles behave the same way.

use std::collections::{HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, warn};

use super::Registry;
use crate::types::ProcessName;

impl Registry {
    /// Whether every soft dependency of `name` has started at least once.
    ///
    /// Unknown processes are never ready.
    pub fn is_ready(&self, name: &str) -> bool {
        let Some(definition) = self.definition(name) else {
            return false;
        };

        definition.soft_depends.iter().all(|dep| match self.state(dep) {
            Some(state) => state.running,
            None => {
                warn!(
                    process = %name,
                    dependency = %dep,
                    "dependency is not a known process; it can never become ready"
                );
                false
            }
        })
    }

    /// Dependents of `started` that have not been dispatched yet, are not
    /// running, and are now ready. Definition order is preserved.
    pub fn newly_ready_dependents(&self, started: &str) -> Vec<ProcessName> {
        let candidates = self.dependents_of(started);

        self.names()
            .filter(|name| *name != started && candidates.iter().any(|c| c == name))
            .filter(|name| {
                let Some(state) = self.state(name) else {
                    return false;
                };
                debug!(process = %name, waiting_for = %started, "dependency reported running");
                !state.running && !state.dispatched && self.is_ready(name)
            })
            .map(|name| name.to_string())
            .collect()
    }

    /// Processes that the dependency graph alone keeps from ever starting:
    /// members of a cycle, processes naming an unknown dependency, and
    /// everything downstream of those.
    pub(crate) fn blocked_by_graph(&self) -> HashSet<ProcessName> {
        // Edge direction: dependency -> dependent.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        let mut seeds: Vec<&str> = Vec::new();

        for entry in self.entries() {
            let name = entry.definition.name.as_str();
            graph.add_node(name);
            for dep in entry.definition.soft_depends.iter() {
                match self.definition(dep) {
                    Some(known) => {
                        graph.add_edge(known.name.as_str(), name, ());
                    }
                    None => seeds.push(name),
                }
            }
        }

        for component in tarjan_scc(&graph) {
            let cyclic = component.len() > 1
                || component.iter().any(|&n| graph.contains_edge(n, n));
            if cyclic {
                seeds.extend(component);
            }
        }

        let mut blocked = HashSet::new();
        let mut queue: VecDeque<&str> = seeds.into_iter().collect();
        while let Some(name) = queue.pop_front() {
            if blocked.insert(name.to_string()) {
                queue.extend(graph.neighbors(name));
            }
        }
        blocked
    }
}
