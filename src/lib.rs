//! # procvisor
//!
//! **Procvisor** is a process-level supervisor for daemon-style server
//! applications: one long-running application type, replicated across N
//! worker processes on one host, with crash detection, automatic restart,
//! and a two-stage (graceful-then-forced) shutdown protocol.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                     ┌──────────────────────────────┐
//!                     │  Supervisor (role selector)  │
//!                     │  - resolves role once        │
//!                     │  - owns signal channels      │
//!                     │  - installs FaultGuard       │
//!                     └───────┬──────────────┬───────┘
//!                     primary │              │ worker
//!                             ▼              ▼
//!            ┌──────────────────────┐   ┌─────────────────────────┐
//!            │  MasterSupervisor    │   │  WorkerSupervisor       │
//!            │  - WorkerPool        │   │  - one Application      │
//!            │  - restart timers    │   │  - deadline-raced       │
//!            │  - shutdown ladder   │   │    shutdown             │
//!            └──────┬───────────────┘   └───────────┬─────────────┘
//!                   │ ProcessHost::spawn_worker     │ AppFactory::create
//!                   ▼                               ▼
//!           ┌──────────────┐               ┌──────────────────┐
//!           │ worker procs │               │ Application      │
//!           │ (same binary,│               │ initialize() /   │
//!           │  role marker)│               │ shutdown()       │
//!           └──────────────┘               └──────────────────┘
//!
//! All components publish to one Bus; a listener fans events out to
//! Subscribe sinks (per-subscriber bounded queues, panic isolation).
//! ```
//!
//! ### Lifecycle (primary)
//! ```text
//! run()
//!   ├─► resolve worker count (fixed or one-per-CPU)
//!   ├─► spawn N workers
//!   └─► loop {
//!         worker exit while Running   ─► schedule one replacement fork
//!                                        after restart_timeout
//!         INT/TERM                    ─► GracefulShutdown:
//!                                        terminate pool, arm force timer
//!         pool drained (graceful)     ─► exit 0
//!         second INT/TERM or deadline ─► ForcedShutdown:
//!                                        kill pool, exit 1 after 1000ms
//!       }
//! ```
//!
//! ### Lifecycle (worker)
//! ```text
//! run()
//!   ├─► app = factory.create(APP_ENV | "development")
//!   ├─► app.initialize()            (fault ─► shutdown path anyway)
//!   └─► wait for SIGTERM            (SIGINT ignored: primary decides)
//!         └─► race app.shutdown() against shutdown_timeout
//!               └─► exit 0 on completion, fault, or deadline alike
//! ```
//!
//! ## Features
//! | Area              | Description                                                          | Key types / traits                      |
//! |-------------------|----------------------------------------------------------------------|-----------------------------------------|
//! | **Supervision**   | Fork topology, crash restart, shutdown escalation.                   | [`Supervisor`], [`WorkersPolicy`]       |
//! | **Applications**  | Async init/shutdown lifecycle contract and factory.                  | [`Application`], [`AppFactory`]         |
//! | **Host**          | Capability trait over fork/exit/signal/CPU facilities.               | [`ProcessHost`], [`SystemHost`]         |
//! | **Faults**        | Process-wide uncaught-fault containment policy.                      | [`FaultGuard`], [`FaultPolicy`]         |
//! | **Subscriber API**| Hook into runtime events (logging, metrics, custom subscribers).     | [`Subscribe`]                           |
//! | **Errors**        | Typed errors for configuration, runtime, and application faults.     | [`ConfigError`], [`RuntimeError`], [`AppFault`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use procvisor::{
//!     AppFactoryFn, AppFault, AppRef, Application, Supervisor, WorkerCount, WorkersPolicy,
//! };
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Application for Echo {
//!     async fn initialize(&self) -> Result<(), AppFault> {
//!         // bind listeners...
//!         Ok(())
//!     }
//!     async fn shutdown(&self) -> Result<(), AppFault> {
//!         // drain connections...
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::builder()
//!         .with_app(AppFactoryFn::arc(|_env: &str| Ok(Arc::new(Echo) as AppRef)))
//!         .with_workers(WorkersPolicy {
//!             count: WorkerCount::Auto,
//!             ..WorkersPolicy::default()
//!         })
//!         .build()?;
//!
//!     // Same binary runs as primary and as worker; the role marker decides.
//!     let code = sup.run().await?;
//!     std::process::exit(code);
//! }
//! ```

mod app;
mod config;
mod core;
mod error;
mod events;
mod fault;
mod host;
mod subscribers;

// ---- Public re-exports ----

pub use app::{AppFactory, AppFactoryFn, AppRef, Application};
pub use config::{WorkerCount, WorkersPolicy};
pub use core::{
    ShutdownState, SignalClass, SignalSender, Signals, Supervisor, SupervisorBuilder, APP_ENV,
};
pub use error::{AppFault, ConfigError, RuntimeError};
pub use events::{Bus, Event, EventKind, Level};
pub use fault::{FaultGuard, FaultPolicy};
pub use host::{
    ProcessHost, Role, SystemHost, WorkerExit, WorkerHandle, WorkerSignal, WORKER_ROLE_ENV,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
