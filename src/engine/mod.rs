// src/engine/mod.rs

//! Supervision engine.
//!
//! This module ties together:
//! - the process registry
//! - dependency-gated launching
//! - restart / crash loop policy
//! - the main event loop that reacts to launcher and restart-timer events
//!
//! The pure core state machine lives in [`core`] (with the per-event logic in
//! [`event_handlers`]); the async/IO shell is implemented in [`runtime`].

use std::time::Duration;

use crate::errors::LaunchError;
use crate::types::ProcessName;

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use self::core::SupervisorCore;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Supervisor;

/// Lifecycle event reported by a launcher.
///
/// A launcher emits at most one `Started` followed by exactly one `Finished`.
#[derive(Debug)]
pub enum LaunchEvent {
    /// The child process was spawned.
    Started { name: ProcessName, pid: u32 },
    /// The launch is over: the child exited, or it never started.
    ///
    /// `error` is `None` only for a zero exit status.
    Finished {
        name: ProcessName,
        error: Option<LaunchError>,
        duration: Duration,
    },
}

impl LaunchEvent {
    pub fn name(&self) -> &str {
        match self {
            LaunchEvent::Started { name, .. } | LaunchEvent::Finished { name, .. } => name,
        }
    }
}

/// Everything that flows into the engine's single event channel.
#[derive(Debug)]
pub enum SupervisorEvent {
    Launch(LaunchEvent),
    /// A restart delay for `name` has elapsed.
    RestartDue { name: ProcessName },
}

impl From<LaunchEvent> for SupervisorEvent {
    fn from(event: LaunchEvent) -> Self {
        SupervisorEvent::Launch(event)
    }
}
