// tests/signal_handling.rs

mod common;
use crate::common::builders::DefinitionBuilder;
use crate::common::{init_tracing, with_timeout};

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use paladin::exec::{ensure_empty_dir, LaunchContext};
use paladin::privilege::mock::StaticIdentity;
use paladin::registry::Registry;
use paladin::signals::{
    render_status_table, terminate_all, NixSignaller, ProcessSignaller, SignalHandler,
    SignalRequest,
};
use paladin::types::{ProcessStatus, RegistrySnapshot};
use paladin::{supervise, Outcome};
use tempfile::TempDir;
use tokio::sync::{mpsc, watch};

/// Records every pid it is asked to terminate; pids in `gone` report ESRCH.
#[derive(Default)]
struct RecordingSignaller {
    gone: HashSet<u32>,
    seen: Mutex<Vec<u32>>,
}

impl ProcessSignaller for RecordingSignaller {
    fn terminate(&self, pid: u32) -> Result<(), Errno> {
        self.seen.lock().unwrap().push(pid);
        if self.gone.contains(&pid) {
            Err(Errno::ESRCH)
        } else {
            Ok(())
        }
    }
}

fn status(name: &str, running: bool, pid: Option<u32>) -> ProcessStatus {
    ProcessStatus {
        name: name.to_string(),
        running,
        pid,
        path: PathBuf::from(format!("/usr/bin/{name}")),
        args: String::new(),
        user: String::new(),
        group: String::new(),
    }
}

fn sample_snapshot() -> RegistrySnapshot {
    RegistrySnapshot {
        processes: vec![
            status("a", true, Some(11)),
            status("b", true, Some(12)),
            status("c", true, Some(13)),
            status("d", false, None),
        ],
    }
}

#[test]
fn sweep_signals_every_running_pid_even_when_some_are_gone() {
    init_tracing();

    let signaller = RecordingSignaller {
        gone: HashSet::from([12]),
        ..Default::default()
    };

    let report = terminate_all(&sample_snapshot(), &signaller);

    assert_eq!(*signaller.seen.lock().unwrap(), vec![11, 12, 13]);
    assert_eq!(report.attempted(), 3);
    assert_eq!(report.signalled.len(), 2);
    assert_eq!(report.already_gone, vec![("b".to_string(), 12)]);
    assert!(report.failed.is_empty());
}

#[test]
fn sweep_never_signals_pid_zero() {
    let snapshot = RegistrySnapshot {
        processes: vec![status("weird", true, Some(0))],
    };
    let signaller = RecordingSignaller::default();

    let report = terminate_all(&snapshot, &signaller);

    assert!(signaller.seen.lock().unwrap().is_empty());
    assert_eq!(report.attempted(), 0);
}

#[test]
fn status_table_lists_every_process() {
    let mut snapshot = sample_snapshot();
    snapshot.processes[0].args = "--port 80".to_string();
    snapshot.processes[0].user = "www".to_string();

    let mut out = Vec::new();
    render_status_table(&snapshot, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 5);
    for header in ["NAME", "RUNNING", "PID", "PATH", "ARGS", "USER", "GROUP"] {
        assert!(lines[0].contains(header), "missing {header}: {}", lines[0]);
    }
    assert!(lines[1].starts_with('a'));
    assert!(lines[1].contains("yes"));
    assert!(lines[1].contains("11"));
    assert!(lines[1].contains("--port 80"));
    assert!(lines[1].contains("www"));
    assert!(lines[4].starts_with('d'));
    assert!(lines[4].contains("no"));
    assert!(lines[4].contains('-'));
}

#[tokio::test]
async fn handler_prints_status_then_stops_on_terminate() {
    init_tracing();

    let (_status_tx, status_rx) = watch::channel(sample_snapshot());
    let handler = SignalHandler::new(status_rx, RecordingSignaller::default());

    let (tx, rx) = mpsc::channel(4);
    tx.send(SignalRequest::Status).await.unwrap();
    tx.send(SignalRequest::Terminate).await.unwrap();

    let mut out = Vec::new();
    let report = with_timeout(handler.run(rx, &mut out)).await;

    let report = report.expect("terminate should produce a report");
    assert_eq!(report.attempted(), 3);
    assert!(String::from_utf8(out).unwrap().contains("RUNNING"));
}

#[tokio::test]
async fn handler_returns_none_when_requests_end() {
    let (_status_tx, status_rx) = watch::channel(RegistrySnapshot::default());
    let handler = SignalHandler::new(status_rx, RecordingSignaller::default());

    let (tx, rx) = mpsc::channel(1);
    drop(tx);

    let mut out = Vec::new();
    assert!(with_timeout(handler.run(rx, &mut out)).await.is_none());
}

#[tokio::test]
async fn terminate_request_signals_real_children() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let empty_dir = ensure_empty_dir(Some(tmp.path())).unwrap();
    let context = LaunchContext::new(empty_dir, Arc::new(StaticIdentity::new()));

    let registry = Registry::from_definitions(vec![
        DefinitionBuilder::new("sleep-a", "/bin/sleep").args("30").build(),
        DefinitionBuilder::new("sleep-b", "/bin/sleep").args("30").build(),
        // Exits on its own before the sweep.
        DefinitionBuilder::new("quick", "/bin/true").build(),
    ]);

    let (tx, rx) = mpsc::channel(4);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let _ = tx.send(SignalRequest::Terminate).await;
    });

    let outcome = with_timeout(supervise(registry, context, rx, NixSignaller))
        .await
        .expect("supervise failed");

    let report = match outcome {
        Outcome::Terminated(report) => report,
        other => panic!("expected termination, got {other:?}"),
    };

    assert_eq!(report.attempted(), 3);
    assert!(report.failed.is_empty());

    let sleepers: Vec<u32> = report
        .signalled
        .iter()
        .filter(|(name, _)| name.starts_with("sleep"))
        .map(|(_, pid)| *pid)
        .collect();
    assert_eq!(sleepers.len(), 2);

    // The launcher tasks reap the children once they die.
    with_timeout(async {
        for pid in sleepers {
            while kill(Pid::from_raw(pid as i32), None).is_ok() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        }
    })
    .await;
}
