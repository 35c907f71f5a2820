//! # Host capability surface.
//!
//! [`ProcessHost`] gathers everything the supervisor needs from the hosting
//! operating system behind one trait: the fork primitive with exit
//! observation, the primary/worker role flag, the CPU count query, and
//! environment access. The production implementation is
//! [`SystemHost`](crate::SystemHost); tests supply in-memory hosts to drive
//! the state machines deterministically.
//!
//! ## Rules
//! - `spawn_worker` delivers **at most one** [`WorkerExit`] per spawned
//!   worker, on the channel handed to it.
//! - `signal_worker` is fire-and-forget; signalling an already-dead pid is
//!   not an error.
//! - The role is resolved once per process and never changes.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::RuntimeError;

/// Which side of the fork topology this process is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// The single process that spawns and supervises workers.
    Primary,
    /// A spawned process hosting one application instance.
    Worker,
}

/// Signal classes the primary sends to pooled workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerSignal {
    /// Cooperative stop request (SIGTERM); workers run their shutdown path.
    Terminate,
    /// Non-catchable kill (SIGKILL); used only during forced shutdown.
    Kill,
}

/// Exit notification for a previously spawned worker.
///
/// Delivered at most once per worker, on the channel passed to
/// [`ProcessHost::spawn_worker`].
#[derive(Clone, Copy, Debug)]
pub struct WorkerExit {
    /// Pid of the worker that exited.
    pub pid: u32,
}

/// Pool entry for one live worker.
///
/// Owned exclusively by the master loop: created at spawn confirmation,
/// removed at observed exit. Kill capability stays on the host, keyed by pid.
#[derive(Clone, Copy, Debug)]
pub struct WorkerHandle {
    /// Worker process id.
    pub pid: u32,
}

/// # Facilities the supervisor consumes from its host.
///
/// One implementation per process; shared by the role selector, the master
/// loop, and the worker runtime.
#[async_trait]
pub trait ProcessHost: Send + Sync + 'static {
    /// Resolves this process's side of the fork topology.
    fn role(&self) -> Role;

    /// Number of CPUs, used by the `"auto"` worker-count policy.
    fn cpu_count(&self) -> usize;

    /// Reads an environment variable of the current process.
    fn env_var(&self, key: &str) -> Option<String>;

    /// Spawns one worker process.
    ///
    /// The returned handle confirms the fork; the worker's eventual exit is
    /// reported exactly once on `exits`. Spawn failures are recoverable —
    /// the master retries them on the restart path.
    async fn spawn_worker(
        &self,
        exits: mpsc::Sender<WorkerExit>,
    ) -> Result<WorkerHandle, RuntimeError>;

    /// Sends a signal to a previously spawned worker.
    ///
    /// Best effort: the worker may already be gone.
    fn signal_worker(&self, pid: u32, signal: WorkerSignal);
}
