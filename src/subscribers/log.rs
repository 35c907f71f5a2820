//! # LogWriter — simple event printer
//!
//! A minimal subscriber that renders incoming [`Event`]s as structured log
//! lines on stdout. Use it for tests or demos; production deployments
//! usually plug their own [`Subscribe`] sink instead.
//!
//! ## Example output
//! ```text
//! [info] [pid 4311] worker forked pool=2
//! [warning] [pid 4311] worker exited unexpectedly, restarting in 1000ms
//! [info] shutting down workers pool=2
//! [warning] forcing shutdown pool=1
//! [warning] app shutdown timed out after 30000ms
//! [info] workers exited, shutting down daemon
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn render(e: &Event) -> String {
    let body = match e.kind {
        EventKind::WorkerForked => format!(
            "worker forked pool={}",
            e.pool_size.unwrap_or_default()
        ),
        EventKind::WorkerLost => format!(
            "worker exited unexpectedly, restarting in {}ms",
            e.delay_ms.unwrap_or_default()
        ),
        EventKind::WorkerStopped => format!(
            "worker shut down pool={}",
            e.pool_size.unwrap_or_default()
        ),
        EventKind::SpawnFailed => format!(
            "worker spawn failed ({}), retrying in {}ms",
            e.reason.as_deref().unwrap_or("unknown"),
            e.delay_ms.unwrap_or_default()
        ),
        EventKind::RestartCanceled => "scheduled restart dropped, shutdown in progress".into(),
        EventKind::ShutdownRequested => format!(
            "shutting down workers pool={}",
            e.pool_size.unwrap_or_default()
        ),
        EventKind::ShutdownForced => format!(
            "forcing shutdown pool={}",
            e.pool_size.unwrap_or_default()
        ),
        EventKind::PoolDrained => "workers exited, shutting down daemon".into(),
        EventKind::PrimaryExiting => format!(
            "daemon exiting with code {}",
            e.exit_code.unwrap_or_default()
        ),
        EventKind::AppInitialized => "app initialized".into(),
        EventKind::AppInitFailed => format!(
            "app init failed: {}",
            e.reason.as_deref().unwrap_or("unknown")
        ),
        EventKind::AppShutdownStarted => "app shutdown started".into(),
        EventKind::AppShutdownFailed => format!(
            "app shutdown failed: {}",
            e.reason.as_deref().unwrap_or("unknown")
        ),
        EventKind::AppShutdownTimeout => format!(
            "app shutdown timed out after {}ms",
            e.timeout_ms.unwrap_or_default()
        ),
        EventKind::WorkerExiting => format!(
            "worker exiting with code {}",
            e.exit_code.unwrap_or_default()
        ),
        EventKind::FaultTrapped => format!(
            "uncaught fault: {}",
            e.reason.as_deref().unwrap_or("unknown")
        ),
        EventKind::FaultRestartDisabled => {
            "!!! restart-on-fault DISABLED — faults will not recycle this process !!!".into()
        }
    };

    match e.pid {
        Some(pid) => format!("[{}] [pid {}] {}", e.kind.level(), pid, body),
        None => format!("[{}] {}", e.kind.level(), body),
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", render(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_render_restart_line() {
        let ev = Event::now(EventKind::WorkerLost)
            .with_pid(99)
            .with_delay(Duration::from_millis(1000));
        assert_eq!(
            render(&ev),
            "[warning] [pid 99] worker exited unexpectedly, restarting in 1000ms"
        );
    }

    #[test]
    fn test_render_without_pid() {
        let ev = Event::now(EventKind::PoolDrained);
        assert_eq!(render(&ev), "[info] workers exited, shutting down daemon");
    }
}
