// src/signals/sweep.rs

//! Termination sweep over the running children.

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use crate::types::{ProcessName, RegistrySnapshot};

/// Delivers a termination request to one pid.
pub trait ProcessSignaller: Send + Sync {
    fn terminate(&self, pid: u32) -> Result<(), Errno>;
}

/// `kill(pid, SIGTERM)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NixSignaller;

impl ProcessSignaller for NixSignaller {
    fn terminate(&self, pid: u32) -> Result<(), Errno> {
        let raw = i32::try_from(pid).map_err(|_| Errno::EINVAL)?;
        kill(Pid::from_raw(raw), Signal::SIGTERM)
    }
}

/// Outcome of one sweep. Nothing here is treated as an error by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Termination delivered.
    pub signalled: Vec<(ProcessName, u32)>,
    /// The pid no longer exists (`ESRCH`).
    pub already_gone: Vec<(ProcessName, u32)>,
    /// Delivery failed for another reason.
    pub failed: Vec<(ProcessName, u32, Errno)>,
}

impl SweepReport {
    /// Every pid a termination was attempted for.
    pub fn attempted(&self) -> usize {
        self.signalled.len() + self.already_gone.len() + self.failed.len()
    }
}

/// Send a termination request to every entry marked running.
///
/// Fire-and-forget: no waiting for the children to exit, no retries.
pub fn terminate_all(snapshot: &RegistrySnapshot, signaller: &dyn ProcessSignaller) -> SweepReport {
    let mut report = SweepReport::default();

    for (name, pid) in snapshot.running_pids() {
        if pid == 0 {
            // kill(0) would hit our own process group.
            warn!(process = %name, "refusing to signal pid 0");
            continue;
        }

        match signaller.terminate(pid) {
            Ok(()) => {
                info!(process = %name, pid, "sent SIGTERM");
                report.signalled.push((name.to_string(), pid));
            }
            Err(Errno::ESRCH) => {
                debug!(process = %name, pid, "process already gone");
                report.already_gone.push((name.to_string(), pid));
            }
            Err(errno) => {
                warn!(process = %name, pid, error = %errno, "failed to send SIGTERM");
                report.failed.push((name.to_string(), pid, errno));
            }
        }
    }

    report
}
