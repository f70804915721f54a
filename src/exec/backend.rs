// src/exec/backend.rs

//! Pluggable launch backend abstraction.
//!
//! The supervisor talks to a `LaunchBackend` instead of spawning processes
//! itself. This makes it easy to swap in a fake launcher in tests while
//! keeping the production launcher in [`launcher`](super::launcher).
//!
//! - `RealLaunchBackend` spawns one Tokio task per definition, each running
//!   [`launch_process`].
//! - Tests can provide their own `LaunchBackend` that, for example, records
//!   which processes were launched and emits scripted `LaunchEvent`s.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::SupervisorEvent;
use crate::errors::Result;
use crate::registry::ProcessDefinition;

use super::launcher::{launch_process, LaunchContext};

/// Trait abstracting how definitions are launched.
///
/// Implementations must report every launch back to the supervisor's event
/// channel as one optional `Started` followed by exactly one `Finished`.
pub trait LaunchBackend: Send {
    /// Launch every given definition, once each.
    fn launch(
        &mut self,
        definitions: Vec<ProcessDefinition>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real launch backend used in production.
pub struct RealLaunchBackend {
    events: mpsc::Sender<SupervisorEvent>,
    context: Arc<LaunchContext>,
}

impl RealLaunchBackend {
    /// Create a launcher reporting to the given supervisor event sender.
    pub fn new(events: mpsc::Sender<SupervisorEvent>, context: LaunchContext) -> Self {
        Self {
            events,
            context: Arc::new(context),
        }
    }
}

impl LaunchBackend for RealLaunchBackend {
    fn launch(
        &mut self,
        definitions: Vec<ProcessDefinition>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone so the future doesn't borrow `self` across `await`.
        let events = self.events.clone();
        let context = Arc::clone(&self.context);

        Box::pin(async move {
            for definition in definitions {
                debug!(process = %definition.name, "spawning launcher task");
                tokio::spawn(launch_process(
                    definition,
                    Arc::clone(&context),
                    events.clone(),
                ));
            }
            Ok(())
        })
    }
}
