//! # Supervisor: per-process entry point and role selector.
//!
//! The [`Supervisor`] resolves the primary-vs-worker role exactly once and
//! hands control to the matching state machine
//! ([`MasterSupervisor`](super::master::MasterSupervisor) or
//! [`WorkerSupervisor`](super::worker::WorkerSupervisor)), sharing one
//! configuration and one set of host-facility handles between them.
//!
//! ## Key responsibilities
//! - validate configuration ([`SupervisorBuilder::build`] is the only place
//!   a [`ConfigError`] can surface)
//! - guard the process-wide signal subscription: at most one live
//!   supervisor per process, re-acquirable after the previous run finishes
//! - install the fault guard policy before any application code runs
//! - fan events out to subscribers and flush them when the run ends
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use procvisor::{AppFactoryFn, AppFault, AppRef, Application, Supervisor, WorkersPolicy};
//! use async_trait::async_trait;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Application for Echo {
//!     async fn initialize(&self) -> Result<(), AppFault> { Ok(()) }
//!     async fn shutdown(&self) -> Result<(), AppFault> { Ok(()) }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::builder()
//!         .with_app(AppFactoryFn::arc(|_env: &str| Ok(Arc::new(Echo) as AppRef)))
//!         .with_workers(WorkersPolicy::default())
//!         .build()?;
//!
//!     let code = sup.run().await?;
//!     std::process::exit(code);
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

use crate::app::AppFactory;
use crate::config::WorkersPolicy;
use crate::core::master::MasterSupervisor;
use crate::core::signals::Signals;
use crate::core::worker::WorkerSupervisor;
use crate::error::{ConfigError, RuntimeError};
use crate::events::Bus;
use crate::fault::{FaultGuard, FaultPolicy};
use crate::host::{ProcessHost, Role, SystemHost};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Whether a supervisor currently owns this process's signal subscription.
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// RAII claim on the process-wide supervisor slot.
struct ActiveGuard;

impl ActiveGuard {
    fn acquire() -> Result<Self, RuntimeError> {
        if ACTIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Ok(Self)
        } else {
            Err(RuntimeError::SupervisorActive)
        }
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::SeqCst);
    }
}

/// Builder for constructing a [`Supervisor`].
///
/// The application factory is the only required input; everything else has
/// defaults (two workers, OS-backed host and signals, no subscribers).
pub struct SupervisorBuilder {
    app: Option<Arc<dyn AppFactory>>,
    workers: WorkersPolicy,
    subscribers: Vec<Arc<dyn Subscribe>>,
    host: Option<Arc<dyn ProcessHost>>,
    signals: Option<Signals>,
    bus_capacity: usize,
}

impl SupervisorBuilder {
    fn new() -> Self {
        Self {
            app: None,
            workers: WorkersPolicy::default(),
            subscribers: Vec::new(),
            host: None,
            signals: None,
            bus_capacity: 1024,
        }
    }

    /// Sets the application factory (required).
    pub fn with_app(mut self, app: Arc<dyn AppFactory>) -> Self {
        self.app = Some(app);
        self
    }

    /// Sets the worker pool policy.
    pub fn with_workers(mut self, workers: WorkersPolicy) -> Self {
        self.workers = workers;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (pool lifecycle, shutdown
    /// escalation, faults) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Overrides the host facilities (default: [`SystemHost`]).
    pub fn with_host(mut self, host: Arc<dyn ProcessHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Overrides the signal source (default: [`Signals::from_os`] at run time).
    pub fn with_signals(mut self, signals: Signals) -> Self {
        self.signals = Some(signals);
        self
    }

    /// Sets the event bus ring-buffer capacity (default 1024, min 1).
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    /// Builds the supervisor.
    ///
    /// Fails with [`ConfigError::MissingApp`] when no application factory
    /// was provided — the single fatal configuration error.
    pub fn build(self) -> Result<Supervisor, ConfigError> {
        let app = self.app.ok_or(ConfigError::MissingApp)?;
        Ok(Supervisor {
            app,
            workers: self.workers,
            subscribers: self.subscribers,
            host: self.host.unwrap_or_else(|| Arc::new(SystemHost::new())),
            signals: self.signals,
            bus: Bus::new(self.bus_capacity),
        })
    }
}

/// Per-process supervision entry point.
///
/// Built once, run once: [`Supervisor::run`] resolves the role, drives the
/// matching state machine to completion, and returns the process exit code
/// (0 clean stop, 1 forced stop) for the hosting binary to apply.
pub struct Supervisor {
    app: Arc<dyn AppFactory>,
    workers: WorkersPolicy,
    subscribers: Vec<Arc<dyn Subscribe>>,
    host: Arc<dyn ProcessHost>,
    signals: Option<Signals>,
    bus: Bus,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("workers", &self.workers)
            .field("subscribers", &self.subscribers.len())
            .field("signals", &self.signals.is_some())
            .finish_non_exhaustive()
    }
}

impl Supervisor {
    /// Starts building a supervisor.
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::new()
    }

    /// Returns a handle to the event bus.
    ///
    /// Subscribing before [`run`](Self::run) observes every published event.
    pub fn bus(&self) -> Bus {
        self.bus.clone()
    }

    /// Resolves the role and runs the matching state machine to completion.
    ///
    /// Returns the exit code the process should terminate with. Fails with
    /// [`RuntimeError::SupervisorActive`] if another supervisor is live in
    /// this process, or [`RuntimeError::SignalSetup`] if OS signal
    /// registration fails.
    pub async fn run(mut self) -> Result<i32, RuntimeError> {
        let _guard = ActiveGuard::acquire()?;

        let signals = match self.signals.take() {
            Some(signals) => signals,
            None => Signals::from_os()?,
        };

        let flush = self.spawn_subscriber_listener();
        FaultGuard::install(FaultPolicy::from_workers(&self.workers), self.bus.clone());

        let code = match self.host.role() {
            Role::Primary => {
                MasterSupervisor::new(self.workers, self.host.clone(), self.bus.clone())
                    .run(signals)
                    .await
            }
            Role::Worker => WorkerSupervisor::new(
                self.workers,
                self.app.clone(),
                self.host.clone(),
                self.bus.clone(),
            )
            .run(signals)
            .await,
        };

        flush.flush().await;
        Ok(code)
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    ///
    /// Returns a flush handle that drains buffered events and joins the
    /// subscriber workers when the run ends.
    fn spawn_subscriber_listener(&self) -> ListenerFlush {
        let subs = SubscriberSet::new(self.subscribers.clone());
        let mut rx = self.bus.subscribe();
        let token = CancellationToken::new();
        let stop = token.clone();

        let handle = tokio::spawn(async move {
            use tokio::sync::broadcast::error::RecvError;
            loop {
                tokio::select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => subs.emit(&ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => {
                        while let Ok(ev) = rx.try_recv() {
                            subs.emit(&ev);
                        }
                        break;
                    }
                }
            }
            subs.shutdown().await;
        });

        ListenerFlush { token, handle }
    }
}

/// Drains the subscriber pipeline at the end of a run.
struct ListenerFlush {
    token: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

impl ListenerFlush {
    async fn flush(self) {
        self.token.cancel();
        let _ = self.handle.await;
    }
}
