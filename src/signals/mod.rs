// src/signals/mod.rs

//! OS signal handling.
//!
//! - Terminate requests (SIGINT, SIGTERM, SIGQUIT): send SIGTERM to every
//!   running child, then let the supervisor exit without waiting for them.
//! - Status requests (SIGINFO where the platform has it, SIGUSR1 elsewhere):
//!   print the process table to stderr.
//!
//! The handler reads the registry only through the snapshots the engine
//! publishes, so what it sees may lag the engine by one event. A child that
//! starts or exits mid-sweep can be missed or signalled after it is gone;
//! both are tolerated.

pub mod status;
pub mod sweep;

use std::io::{self, Write};

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::types::RegistrySnapshot;

pub use status::render_status_table;
pub use sweep::{terminate_all, NixSignaller, ProcessSignaller, SweepReport};

/// What the operator asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalRequest {
    Terminate,
    Status,
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
fn status_signal_kind() -> SignalKind {
    SignalKind::info()
}

#[cfg(not(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
)))]
fn status_signal_kind() -> SignalKind {
    SignalKind::user_defined1()
}

/// Install the OS signal listeners and forward them as [`SignalRequest`]s.
///
/// Fails only if the listeners cannot be registered.
pub fn listen() -> io::Result<mpsc::Receiver<SignalRequest>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;
    let mut status = signal(status_signal_kind())?;

    let (tx, rx) = mpsc::channel(8);

    tokio::spawn(async move {
        loop {
            let request = tokio::select! {
                _ = sigint.recv() => SignalRequest::Terminate,
                _ = sigterm.recv() => SignalRequest::Terminate,
                _ = sigquit.recv() => SignalRequest::Terminate,
                _ = status.recv() => SignalRequest::Status,
            };
            if tx.send(request).await.is_err() {
                break;
            }
        }
    });

    Ok(rx)
}

/// Acts on [`SignalRequest`]s against the latest registry snapshot.
pub struct SignalHandler<S: ProcessSignaller> {
    status: watch::Receiver<RegistrySnapshot>,
    signaller: S,
}

impl<S: ProcessSignaller> SignalHandler<S> {
    pub fn new(status: watch::Receiver<RegistrySnapshot>, signaller: S) -> Self {
        Self { status, signaller }
    }

    /// Terminate every child currently marked running.
    pub fn terminate_all(&self) -> SweepReport {
        let snapshot = self.status.borrow().clone();
        terminate_all(&snapshot, &self.signaller)
    }

    /// Render the process table.
    pub fn render_status(&self, out: &mut dyn Write) -> io::Result<()> {
        let snapshot = self.status.borrow().clone();
        render_status_table(&snapshot, out)
    }

    /// Serve requests until a terminate request arrives, then sweep and
    /// return the report. Status tables go to `out`.
    ///
    /// Returns `None` if the request stream ends first.
    pub async fn run(
        self,
        mut requests: mpsc::Receiver<SignalRequest>,
        out: &mut (dyn Write + Send),
    ) -> Option<SweepReport> {
        while let Some(request) = requests.recv().await {
            match request {
                SignalRequest::Status => {
                    if let Err(e) = self.render_status(out) {
                        warn!(error = %e, "failed to write status table");
                    }
                }
                SignalRequest::Terminate => {
                    info!("termination requested; signalling running processes");
                    let report = self.terminate_all();
                    info!(
                        signalled = report.signalled.len(),
                        already_gone = report.already_gone.len(),
                        failed = report.failed.len(),
                        "termination sweep done"
                    );
                    return Some(report);
                }
            }
        }

        error!("signal listener stopped");
        None
    }
}
