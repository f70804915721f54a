use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::os::unix::process::ExitStatusExt;
use std::pin::Pin;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use paladin::engine::{LaunchEvent, SupervisorEvent};
use paladin::errors::{LaunchError, Result};
use paladin::exec::LaunchBackend;
use paladin::registry::ProcessDefinition;
use tokio::sync::mpsc;
use tracing::debug;

/// What one scripted launch does.
#[derive(Debug, Clone)]
pub enum FakeRun {
    /// Starts, waits `runtime`, exits 0.
    Succeed { runtime: Duration },
    /// Starts, waits `runtime`, exits 1.
    Fail { runtime: Duration },
    /// Never starts; only `Finished` with a spawn error.
    SpawnError,
    /// Starts and never exits.
    Hang,
}

/// A fake launcher that:
/// - records which processes were launched, in launch order
/// - plays back a per-process script of [`FakeRun`]s (default: immediate
///   success) by emitting `Started`/`Finished` like the real launcher.
#[derive(Clone)]
pub struct ScriptedLauncher {
    events: mpsc::Sender<SupervisorEvent>,
    launched: Arc<Mutex<Vec<String>>>,
    scripts: Arc<Mutex<HashMap<String, VecDeque<FakeRun>>>>,
    next_pid: Arc<AtomicU32>,
}

impl ScriptedLauncher {
    pub fn new(events: mpsc::Sender<SupervisorEvent>) -> Self {
        Self {
            events,
            launched: Arc::new(Mutex::new(Vec::new())),
            scripts: Arc::new(Mutex::new(HashMap::new())),
            next_pid: Arc::new(AtomicU32::new(1000)),
        }
    }

    /// Queue runs for `name`; each launch consumes one.
    pub fn script(self, name: &str, runs: impl IntoIterator<Item = FakeRun>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .extend(runs);
        self
    }

    /// Shared handle to the launch log.
    pub fn launched(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.launched)
    }

    fn next_run(&self, name: &str) -> FakeRun {
        self.scripts
            .lock()
            .unwrap()
            .get_mut(name)
            .and_then(|runs| runs.pop_front())
            .unwrap_or(FakeRun::Succeed {
                runtime: Duration::ZERO,
            })
    }
}

impl LaunchBackend for ScriptedLauncher {
    fn launch(
        &mut self,
        definitions: Vec<ProcessDefinition>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            for definition in definitions {
                let name = definition.name.clone();
                self.launched.lock().unwrap().push(name.clone());

                let run = self.next_run(&name);
                let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
                let tx = self.events.clone();

                tokio::spawn(play(name, pid, run, tx));
            }
            Ok(())
        })
    }
}

async fn play(name: String, pid: u32, run: FakeRun, tx: mpsc::Sender<SupervisorEvent>) {
    let (runtime, error) = match run {
        FakeRun::SpawnError => {
            let error = LaunchError::Spawn {
                path: "/fake".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            };
            send(
                &tx,
                LaunchEvent::Finished {
                    name,
                    error: Some(error),
                    duration: Duration::ZERO,
                },
            )
            .await;
            return;
        }
        FakeRun::Hang => (None, None),
        FakeRun::Succeed { runtime } => (Some(runtime), None),
        FakeRun::Fail { runtime } => (
            Some(runtime),
            Some(LaunchError::Exited(ExitStatus::from_raw(1 << 8))),
        ),
    };

    send(&tx, LaunchEvent::Started { name: name.clone(), pid }).await;

    let Some(runtime) = runtime else {
        std::future::pending::<()>().await;
        return;
    };

    tokio::time::sleep(runtime).await;
    send(
        &tx,
        LaunchEvent::Finished {
            name,
            error,
            duration: runtime,
        },
    )
    .await;
}

async fn send(tx: &mpsc::Sender<SupervisorEvent>, event: LaunchEvent) {
    let name = event.name().to_string();
    if tx.send(event.into()).await.is_err() {
        debug!(process = %name, "supervisor gone; dropping scripted event");
    }
}
