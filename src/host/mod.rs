//! Host facilities consumed by the supervisor.
//!
//! Internal modules:
//! - [`facilities`]: the [`ProcessHost`] capability trait and pool types;
//! - [`system`]: the production implementation backed by the OS.

mod facilities;
mod system;

pub use facilities::{ProcessHost, Role, WorkerExit, WorkerHandle, WorkerSignal};
pub use system::{SystemHost, WORKER_ROLE_ENV};
