//! Minimal daemon: two workers hosting a ticking "echo" application.
//!
//! Run with:
//! ```text
//! cargo run --example echo_daemon --features logging
//! ```
//! Then send SIGTERM (or Ctrl-C) to the primary pid to watch the graceful
//! shutdown ladder; send it twice to watch the forced escalation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use procvisor::{
    AppFactoryFn, AppFault, AppRef, Application, LogWriter, Subscribe, Supervisor, WorkerCount,
    WorkersPolicy,
};

struct Echo {
    env: String,
    stop: CancellationToken,
}

#[async_trait]
impl Application for Echo {
    async fn initialize(&self) -> Result<(), AppFault> {
        println!("echo[{}] up in env={}", std::process::id(), self.env);

        let stop = self.stop.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_secs(2)) => {
                        println!("echo[{}] tick", std::process::id());
                    }
                }
            }
        });
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), AppFault> {
        self.stop.cancel();
        println!("echo[{}] drained", std::process::id());
        Ok(())
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];

    let sup = Supervisor::builder()
        .with_app(AppFactoryFn::arc(|env: &str| {
            Ok(Arc::new(Echo {
                env: env.to_string(),
                stop: CancellationToken::new(),
            }) as AppRef)
        }))
        .with_workers(WorkersPolicy {
            count: WorkerCount::Fixed(2),
            restart_timeout: Duration::from_millis(1000),
            shutdown_timeout: Duration::from_secs(10),
            restart_on_exception: true,
        })
        .with_subscribers(subscribers)
        .build()?;

    let code = sup.run().await?;
    std::process::exit(code);
}
