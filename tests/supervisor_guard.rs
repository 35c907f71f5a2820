//! Entry-point integration suite: builder validation, the one-live-supervisor
//! guard, and the fault policy banner.

mod support;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};

use procvisor::{
    ConfigError, EventKind, RuntimeError, Signals, Supervisor, WorkersPolicy,
};
use support::{drain_kinds, factory, serial, TestApp, TestHost};

fn passive_policy() -> WorkersPolicy {
    WorkersPolicy {
        restart_on_exception: false,
        ..WorkersPolicy::default()
    }
}

#[test]
fn builder_requires_an_application_factory() {
    let err = Supervisor::builder()
        .with_workers(WorkersPolicy::default())
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingApp));
    assert_eq!(err.as_label(), "config_missing_app");
}

#[tokio::test]
async fn only_one_supervisor_may_be_live_per_process() {
    let _lock = serial();

    let (first_sig, first_signals) = Signals::channel();
    let first = Supervisor::builder()
        .with_app(factory(&TestApp::new()))
        .with_workers(passive_policy())
        .with_host(Arc::new(TestHost::worker()))
        .with_signals(first_signals)
        .build()
        .expect("valid configuration");
    let first_run = tokio::spawn(first.run());
    sleep(Duration::from_millis(30)).await;

    // a second live instance is rejected while the first holds the slot
    let (_sig, second_signals) = Signals::channel();
    let second = Supervisor::builder()
        .with_app(factory(&TestApp::new()))
        .with_workers(passive_policy())
        .with_host(Arc::new(TestHost::worker()))
        .with_signals(second_signals)
        .build()
        .expect("valid configuration");
    let err = second.run().await.unwrap_err();
    assert!(matches!(err, RuntimeError::SupervisorActive));

    first_sig.terminate();
    let code = timeout(Duration::from_secs(5), first_run)
        .await
        .expect("first run did not finish")
        .expect("first run panicked")
        .expect("first run errored");
    assert_eq!(code, 0);

    // the slot is re-acquirable once the previous run finished
    let (third_sig, third_signals) = Signals::channel();
    let third = Supervisor::builder()
        .with_app(factory(&TestApp::new()))
        .with_workers(passive_policy())
        .with_host(Arc::new(TestHost::worker()))
        .with_signals(third_signals)
        .build()
        .expect("valid configuration");
    let third_run = tokio::spawn(third.run());
    sleep(Duration::from_millis(30)).await;
    third_sig.terminate();
    let code = timeout(Duration::from_secs(5), third_run)
        .await
        .expect("third run did not finish")
        .expect("third run panicked")
        .expect("third run errored");
    assert_eq!(code, 0);
}

#[tokio::test]
async fn disabled_fault_restart_publishes_the_banner() {
    let _lock = serial();

    let (sig, signals) = Signals::channel();
    let sup = Supervisor::builder()
        .with_app(factory(&TestApp::new()))
        .with_workers(passive_policy())
        .with_host(Arc::new(TestHost::worker()))
        .with_signals(signals)
        .build()
        .expect("valid configuration");
    let mut rx = sup.bus().subscribe();
    let run = tokio::spawn(sup.run());
    sleep(Duration::from_millis(30)).await;

    sig.terminate();
    let code = timeout(Duration::from_secs(5), run)
        .await
        .expect("run did not finish")
        .expect("run panicked")
        .expect("run errored");
    assert_eq!(code, 0);

    let kinds = drain_kinds(&mut rx);
    assert!(kinds.contains(&EventKind::FaultRestartDisabled));
}
