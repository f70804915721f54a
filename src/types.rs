use std::path::PathBuf;

/// Canonical process name type used throughout the supervisor.
pub type ProcessName = String;

/// Read-only view of one registry entry, as seen by the signal handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStatus {
    pub name: ProcessName,
    pub running: bool,
    pub pid: Option<u32>,
    pub path: PathBuf,
    pub args: String,
    pub user: String,
    pub group: String,
}

/// Point-in-time copy of the whole registry, in definition order.
///
/// The engine publishes a fresh snapshot after every event it handles; readers
/// outside the engine only ever see one of these, so they may be slightly
/// stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    pub processes: Vec<ProcessStatus>,
}

impl RegistrySnapshot {
    /// Entries currently marked running together with their recorded pid.
    pub fn running_pids(&self) -> impl Iterator<Item = (&str, u32)> {
        self.processes
            .iter()
            .filter(|p| p.running)
            .filter_map(|p| p.pid.map(|pid| (p.name.as_str(), pid)))
    }
}
