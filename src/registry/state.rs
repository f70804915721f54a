// src/registry/state.rs

use std::time::Duration;

use crate::errors::LaunchError;

/// Mutable per-process state, owned by the engine.
#[derive(Debug, Default)]
pub struct RuntimeState {
    /// Latched on the first `Started` event and never cleared. Dependents
    /// only ask "has this ever started", not "is it up right now".
    pub running: bool,
    /// Pid of the most recent successful start.
    pub pid: Option<u32>,
    /// Error of the most recent finished launch, if it failed.
    pub last_error: Option<LaunchError>,
    /// Elapsed time of the most recent finished launch.
    pub last_duration: Duration,
    /// Set once the engine has dispatched this process through the initial
    /// or dependency path.
    pub dispatched: bool,
    /// Number of launches dispatched, restarts included.
    pub launches: u32,
}
