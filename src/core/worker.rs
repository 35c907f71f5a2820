//! # WorkerSupervisor: one application instance, deadline-raced shutdown.
//!
//! A worker process hosts exactly one [`Application`](crate::Application)
//! instance and defers every shutdown decision to the primary: interrupts
//! are ignored, the first terminate runs the cooperative shutdown path,
//! later terminates are no-ops.
//!
//! ## Lifecycle
//! ```text
//! factory.create(env) ──► app.initialize()
//!        │ fault               │ fault
//!        ▼                     ▼
//!   shutdown path ◄────── shutdown path        (init faults still shut down)
//!        ▲
//!        │ first SIGTERM                        (SIGINT ignored)
//!   wait for signal ◄── app running
//!
//! shutdown path:
//!   race app.shutdown() against shutdown_timeout
//!     ├─ Ok        → exit 0
//!     ├─ fault     → logged, exit 0
//!     └─ deadline  → timeout warning, exit 0
//! ```
//!
//! ## Rules
//! - No abrupt crash path exists for application faults: every outcome of
//!   `initialize`/`shutdown` converges on a clean exit with code 0.
//! - An application that never completes `shutdown` resolves via deadline
//!   expiry alone ([`deadline_race`]).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::app::{AppFactory, AppRef};
use crate::config::WorkersPolicy;
use crate::core::signals::{SignalClass, Signals};
use crate::core::state::ShutdownState;
use crate::events::{Bus, Event, EventKind};
use crate::host::ProcessHost;

/// Environment variable naming the application environment.
pub const APP_ENV: &str = "APP_ENV";

/// Environment name used when [`APP_ENV`] is unset.
const DEFAULT_ENV: &str = "development";

/// Worker-side state machine: drives one application instance.
pub(crate) struct WorkerSupervisor {
    workers: WorkersPolicy,
    factory: Arc<dyn AppFactory>,
    host: Arc<dyn ProcessHost>,
    bus: Bus,
    state: ShutdownState,
}

impl WorkerSupervisor {
    pub(crate) fn new(
        workers: WorkersPolicy,
        factory: Arc<dyn AppFactory>,
        host: Arc<dyn ProcessHost>,
        bus: Bus,
    ) -> Self {
        Self {
            workers,
            factory,
            host,
            bus,
            state: ShutdownState::Running,
        }
    }

    /// Runs the application lifecycle; returns the process exit code.
    pub(crate) async fn run(mut self, mut signals: Signals) -> i32 {
        let env = self
            .host
            .env_var(APP_ENV)
            .unwrap_or_else(|| DEFAULT_ENV.to_string());

        let app = match self.factory.create(&env) {
            Ok(app) => app,
            Err(fault) => {
                self.bus
                    .publish(Event::now(EventKind::AppInitFailed).with_reason(fault.to_string()));
                return self.shutdown(None).await;
            }
        };

        if let Err(fault) = app.initialize().await {
            self.bus
                .publish(Event::now(EventKind::AppInitFailed).with_reason(fault.to_string()));
            return self.shutdown(Some(app)).await;
        }
        self.bus.publish(Event::now(EventKind::AppInitialized));

        loop {
            match signals.recv().await {
                // Shutdown decisions belong to the primary; Ctrl-C reaches
                // the whole process group on some terminals.
                Some(SignalClass::Interrupt) => continue,
                Some(SignalClass::Terminate) | None => break,
            }
        }

        self.shutdown(Some(app)).await
    }

    /// Cooperative shutdown path; every outcome exits with code 0.
    ///
    /// Signals received from here on are not read again, which is what
    /// makes a second terminate during shutdown a no-op.
    async fn shutdown(&mut self, app: Option<AppRef>) -> i32 {
        self.state.advance(ShutdownState::GracefulShutdown);
        self.bus.publish(Event::now(EventKind::AppShutdownStarted));

        if let Some(app) = app {
            match deadline_race(self.workers.shutdown_timeout, app.shutdown()).await {
                Some(Ok(())) => {}
                Some(Err(fault)) => {
                    self.bus.publish(
                        Event::now(EventKind::AppShutdownFailed).with_reason(fault.to_string()),
                    );
                }
                None => {
                    self.bus.publish(
                        Event::now(EventKind::AppShutdownTimeout)
                            .with_timeout(self.workers.shutdown_timeout),
                    );
                }
            }
        }

        self.state.advance(ShutdownState::Terminated);
        self.bus
            .publish(Event::now(EventKind::WorkerExiting).with_exit_code(0));
        0
    }
}

/// Races a future against a deadline.
///
/// Returns `Some(output)` when the future settles first, `None` once the
/// deadline passes — always resolves after `deadline` even if the inner
/// future never does.
async fn deadline_race<F: Future>(deadline: Duration, fut: F) -> Option<F::Output> {
    match time::timeout(deadline, fut).await {
        Ok(out) => Some(out),
        Err(_elapsed) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_race_settled_future_wins() {
        let out = deadline_race(Duration::from_secs(5), async { 7 }).await;
        assert_eq!(out, Some(7));
    }

    #[tokio::test]
    async fn test_deadline_race_resolves_on_pending_future() {
        let out = deadline_race(
            Duration::from_millis(10),
            std::future::pending::<()>(),
        )
        .await;
        assert_eq!(out, None);
    }
}
