// src/registry/definition.rs

//! Immutable process definitions.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::ProcessConfig;
use crate::types::ProcessName;

/// Static description of one managed process.
///
/// Built from a validated [`ProcessConfig`] (or directly by embedders and
/// tests). Name uniqueness is assumed, not checked, by everything downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDefinition {
    pub name: ProcessName,
    pub path: PathBuf,
    pub args: String,
    /// Working directory; `None` selects the supervisor's empty directory.
    pub dir: Option<PathBuf>,
    /// `None` discards output.
    pub stdout: Option<PathBuf>,
    /// `None`, or the same path as `stdout`, shares the stdout sink.
    pub stderr: Option<PathBuf>,
    pub restart_delay: Duration,
    pub ignore_failure: bool,
    /// Crash loop guard; `Duration::ZERO` disables it.
    pub min_runtime: Duration,
    /// Soft dependencies, in configuration order.
    pub soft_depends: Vec<ProcessName>,
    pub user: String,
    pub group: String,
}

impl ProcessDefinition {
    /// A definition with every optional field at its default.
    pub fn new(name: impl Into<ProcessName>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            args: String::new(),
            dir: None,
            stdout: None,
            stderr: None,
            restart_delay: Duration::ZERO,
            ignore_failure: false,
            min_runtime: Duration::ZERO,
            soft_depends: Vec::new(),
            user: String::new(),
            group: String::new(),
        }
    }

    /// Leaf processes have no soft dependencies.
    pub fn is_leaf(&self) -> bool {
        self.soft_depends.is_empty()
    }

    /// Whether a failed run of `elapsed` trips the crash loop guard.
    pub fn failed_too_quickly(&self, elapsed: Duration) -> bool {
        !self.min_runtime.is_zero() && elapsed < self.min_runtime
    }
}

impl From<&ProcessConfig> for ProcessDefinition {
    fn from(cfg: &ProcessConfig) -> Self {
        Self {
            name: cfg.name.clone(),
            path: cfg.path.clone(),
            args: cfg.args.clone(),
            dir: cfg.dir.clone().filter(|d| !d.as_os_str().is_empty()),
            stdout: cfg.stdout.clone().filter(|p| !p.as_os_str().is_empty()),
            stderr: cfg.stderr.clone().filter(|p| !p.as_os_str().is_empty()),
            restart_delay: Duration::from_millis(cfg.restart_delay),
            ignore_failure: cfg.ignore_failure,
            min_runtime: Duration::from_millis(cfg.min_runtime),
            soft_depends: cfg.soft_depends.clone(),
            user: cfg.user.clone(),
            group: cfg.group.clone(),
        }
    }
}
