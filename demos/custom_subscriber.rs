//! Plugging a custom event sink into the supervisor.
//!
//! Counts worker crashes and prints every event at warning level or above.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use procvisor::{
    AppFactoryFn, AppFault, AppRef, Application, Event, EventKind, Level, Subscribe, Supervisor,
    WorkersPolicy,
};

struct Noop;

#[async_trait]
impl Application for Noop {
    async fn initialize(&self) -> Result<(), AppFault> {
        Ok(())
    }
    async fn shutdown(&self) -> Result<(), AppFault> {
        Ok(())
    }
}

struct CrashCounter {
    crashes: AtomicUsize,
}

#[async_trait]
impl Subscribe for CrashCounter {
    async fn on_event(&self, ev: &Event) {
        if matches!(ev.kind, EventKind::WorkerLost) {
            let n = self.crashes.fetch_add(1, Ordering::Relaxed) + 1;
            eprintln!("crash #{n} (pid {:?})", ev.pid);
        }
        if ev.kind.level() != Level::Info {
            eprintln!("[{}] {:?}", ev.kind.level(), ev.kind);
        }
    }

    fn name(&self) -> &'static str {
        "crash-counter"
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(CrashCounter {
        crashes: AtomicUsize::new(0),
    })];

    let sup = Supervisor::builder()
        .with_app(AppFactoryFn::arc(|_env: &str| Ok(Arc::new(Noop) as AppRef)))
        .with_workers(WorkersPolicy::default())
        .with_subscribers(subscribers)
        .build()?;

    let code = sup.run().await?;
    std::process::exit(code);
}
