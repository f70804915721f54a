// src/config/model.rs

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// log_file = "/var/log/paladin.log"
///
/// [[process]]
/// name = "web"
/// path = "/usr/local/bin/web"
/// args = "--port 8080"
/// soft_depends = ["db"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Where to send the supervisor's own log output. Defaults to stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// All `[[process]]` blocks, in file order.
    #[serde(default)]
    pub process: Vec<ProcessConfig>,
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)` (see
/// `validate.rs`), so holders can rely on unique names, known dependencies
/// and an acyclic dependency graph.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub log_file: Option<PathBuf>,
    pub process: Vec<ProcessConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(log_file: Option<PathBuf>, process: Vec<ProcessConfig>) -> Self {
        Self { log_file, process }
    }

    pub fn process_names(&self) -> BTreeSet<&str> {
        self.process.iter().map(|p| p.name.as_str()).collect()
    }
}

/// One `[[process]]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessConfig {
    /// Unique, human-readable tag for the process.
    pub name: String,

    /// Path to the executable.
    pub path: PathBuf,

    /// Arguments, split on whitespace. No quoting is understood.
    #[serde(default)]
    pub args: String,

    /// Working directory; an empty private directory when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// File receiving stdout (appended). Output is discarded when unset.
    #[serde(default)]
    pub stdout: Option<PathBuf>,

    /// File receiving stderr. Follows stdout when unset or equal to it.
    #[serde(default)]
    pub stderr: Option<PathBuf>,

    /// Milliseconds to wait before restarting a failed process.
    #[serde(default)]
    pub restart_delay: u64,

    /// Never restart this process, whatever its exit status.
    #[serde(default)]
    pub ignore_failure: bool,

    /// If a process fails within this many milliseconds, don't restart it.
    /// `0` disables the check.
    #[serde(default)]
    pub min_runtime: u64,

    /// Processes that must have started before this one is launched.
    #[serde(default)]
    pub soft_depends: Vec<String>,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub group: String,
}
