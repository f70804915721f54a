// tests/supervisor_runtime.rs

mod common;
use crate::common::builders::DefinitionBuilder;
use crate::common::fake_launcher::{FakeRun, ScriptedLauncher};
use crate::common::{init_tracing, with_timeout};

use std::time::{Duration, Instant};

use paladin::engine::{Supervisor, SupervisorCore, SupervisorEvent};
use paladin::registry::{ProcessDefinition, Registry};
use tokio::sync::mpsc;

/// Wire a supervisor around a scripted launcher. `script` gets to queue runs
/// before the supervisor is built.
fn supervisor_with(
    definitions: Vec<ProcessDefinition>,
    script: impl FnOnce(ScriptedLauncher) -> ScriptedLauncher,
) -> (Supervisor<ScriptedLauncher>, ScriptedLauncher) {
    let (tx, rx) = mpsc::channel::<SupervisorEvent>(64);
    let launcher = script(ScriptedLauncher::new(tx.clone()));
    let core = SupervisorCore::new(Registry::from_definitions(definitions));
    let supervisor = Supervisor::new(core, tx, rx, launcher.clone());
    (supervisor, launcher)
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[tokio::test]
async fn chain_launches_in_dependency_order_and_completes() {
    init_tracing();

    let (supervisor, launcher) = supervisor_with(
        vec![
            DefinitionBuilder::named("c").after("b").build(),
            DefinitionBuilder::named("b").after("a").build(),
            DefinitionBuilder::named("a").build(),
        ],
        |l| l,
    );
    let launched = launcher.launched();

    with_timeout(supervisor.run()).await.expect("supervisor failed");

    assert_eq!(*launched.lock().unwrap(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn successful_leaves_finish_without_restarts() {
    init_tracing();

    let definitions = (0..4)
        .map(|i| DefinitionBuilder::named(&format!("p{i}")).build())
        .collect();
    let (supervisor, launcher) = supervisor_with(definitions, |l| {
        l.script("p0", [FakeRun::Succeed { runtime: ms(30) }])
            .script("p3", [FakeRun::Succeed { runtime: ms(10) }])
    });
    let launched = launcher.launched();

    with_timeout(supervisor.run()).await.expect("supervisor failed");

    assert_eq!(launched.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn failing_process_is_restarted_until_it_succeeds() {
    init_tracing();

    let (supervisor, launcher) = supervisor_with(
        vec![DefinitionBuilder::named("flaky").restart_delay_ms(20).build()],
        |l| {
            l.script(
                "flaky",
                [
                    FakeRun::Fail { runtime: ms(10) },
                    FakeRun::Fail { runtime: ms(10) },
                    FakeRun::Succeed { runtime: ms(0) },
                ],
            )
        },
    );
    let launched = launcher.launched();

    with_timeout(supervisor.run()).await.expect("supervisor failed");

    assert_eq!(*launched.lock().unwrap(), vec!["flaky", "flaky", "flaky"]);
}

#[tokio::test]
async fn spawn_failures_are_retried_like_crashes() {
    init_tracing();

    let (supervisor, launcher) = supervisor_with(
        vec![DefinitionBuilder::named("missing").restart_delay_ms(10).build()],
        |l| l.script("missing", [FakeRun::SpawnError, FakeRun::SpawnError]),
    );
    let launched = launcher.launched();

    with_timeout(supervisor.run()).await.expect("supervisor failed");

    assert_eq!(launched.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn crash_loop_guard_stops_restarts() {
    init_tracing();

    let (supervisor, launcher) = supervisor_with(
        vec![DefinitionBuilder::named("crashy")
            .min_runtime_ms(300)
            .restart_delay_ms(10)
            .build()],
        |l| l.script("crashy", [FakeRun::Fail { runtime: ms(20) }]),
    );
    let launched = launcher.launched();

    with_timeout(supervisor.run()).await.expect("supervisor failed");

    assert_eq!(*launched.lock().unwrap(), vec!["crashy"]);
}

#[tokio::test]
async fn ignored_failure_is_not_restarted() {
    init_tracing();

    let (supervisor, launcher) = supervisor_with(
        vec![DefinitionBuilder::named("oneshot").ignore_failure(true).build()],
        |l| l.script("oneshot", [FakeRun::Fail { runtime: ms(5) }]),
    );
    let launched = launcher.launched();

    with_timeout(supervisor.run()).await.expect("supervisor failed");

    assert_eq!(*launched.lock().unwrap(), vec!["oneshot"]);
}

#[tokio::test]
async fn restart_delays_do_not_serialize_the_loop() {
    init_tracing();

    let (supervisor, _launcher) = supervisor_with(
        vec![
            DefinitionBuilder::named("a").restart_delay_ms(400).build(),
            DefinitionBuilder::named("b").restart_delay_ms(400).build(),
        ],
        |l| {
            l.script("a", [FakeRun::Fail { runtime: ms(0) }])
                .script("b", [FakeRun::Fail { runtime: ms(100) }])
        },
    );

    let started = Instant::now();
    with_timeout(supervisor.run()).await.expect("supervisor failed");
    let elapsed = started.elapsed();

    // Both delays overlap: roughly 500ms in total, not 900ms.
    assert!(elapsed >= ms(400), "finished too early: {elapsed:?}");
    assert!(elapsed < ms(750), "restart delays ran back to back: {elapsed:?}");
}

#[tokio::test]
async fn supervisor_returns_when_a_dependency_gives_up() {
    init_tracing();

    let (supervisor, launcher) = supervisor_with(
        vec![
            DefinitionBuilder::named("db").min_runtime_ms(300).build(),
            DefinitionBuilder::named("app").after("db").build(),
        ],
        |l| l.script("db", [FakeRun::SpawnError]),
    );
    let launched = launcher.launched();

    with_timeout(supervisor.run()).await.expect("supervisor failed");

    assert_eq!(*launched.lock().unwrap(), vec!["db"]);
}

#[tokio::test]
async fn cyclic_dependencies_hang_without_launching() {
    init_tracing();

    let (supervisor, launcher) = supervisor_with(
        vec![
            DefinitionBuilder::named("x").after("y").build(),
            DefinitionBuilder::named("y").after("x").build(),
        ],
        |l| l,
    );
    let launched = launcher.launched();

    let res = tokio::time::timeout(ms(300), supervisor.run()).await;

    assert!(res.is_err(), "supervisor should idle on a dependency cycle");
    assert!(launched.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unrelated_processes_run_while_a_cycle_blocks() {
    init_tracing();

    let (supervisor, launcher) = supervisor_with(
        vec![
            DefinitionBuilder::named("web").build(),
            DefinitionBuilder::named("x").after("y").build(),
            DefinitionBuilder::named("y").after("x").build(),
        ],
        |l| l,
    );
    let launched = launcher.launched();

    let res = tokio::time::timeout(ms(300), supervisor.run()).await;

    assert!(res.is_err());
    assert_eq!(*launched.lock().unwrap(), vec!["web"]);
}

#[tokio::test]
async fn snapshots_track_started_processes() {
    init_tracing();

    let (supervisor, _launcher) = supervisor_with(
        vec![
            DefinitionBuilder::named("db").build(),
            DefinitionBuilder::named("app").after("db").build(),
            DefinitionBuilder::named("idle").after("never").build(),
        ],
        |l| l.script("db", [FakeRun::Hang]).script("app", [FakeRun::Hang]),
    );
    let mut status = supervisor.subscribe();

    let handle = tokio::spawn(supervisor.run());

    let snapshot = with_timeout(async {
        loop {
            status.changed().await.expect("supervisor dropped");
            let snapshot = status.borrow_and_update().clone();
            if snapshot.running_pids().count() == 2 {
                break snapshot;
            }
        }
    })
    .await;
    handle.abort();

    let names: Vec<_> = snapshot.processes.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["db", "app", "idle"]);

    let idle = &snapshot.processes[2];
    assert!(!idle.running);
    assert_eq!(idle.pid, None);
}
