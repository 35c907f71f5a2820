//! # OS-backed host implementation.
//!
//! [`SystemHost`] realizes the fork topology by re-executing the current
//! binary: a spawned worker runs the same executable with the same
//! arguments plus the [`WORKER_ROLE_ENV`] marker variable, which is how a
//! process discovers it is a worker. Exits are observed by a detached
//! reaper task per child; signalling goes through the process table by pid.
//!
//! ```text
//! primary:  /usr/bin/mydaemon --flag
//!             └─ spawn ──► /usr/bin/mydaemon --flag   (PROCVISOR_WORKER=1)
//!                            └─ reaper task: child.wait() ──► exits channel
//! ```

use std::env;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::error::RuntimeError;
use crate::host::facilities::{ProcessHost, Role, WorkerExit, WorkerHandle, WorkerSignal};

/// Environment variable marking a process as a spawned worker.
///
/// Set by the primary on every worker it spawns; its presence (any value)
/// resolves [`SystemHost::role`] to [`Role::Worker`].
pub const WORKER_ROLE_ENV: &str = "PROCVISOR_WORKER";

/// Production [`ProcessHost`] backed by the operating system.
#[derive(Default)]
pub struct SystemHost;

impl SystemHost {
    /// Constructs a new system host.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessHost for SystemHost {
    fn role(&self) -> Role {
        if env::var_os(WORKER_ROLE_ENV).is_some() {
            Role::Worker
        } else {
            Role::Primary
        }
    }

    fn cpu_count(&self) -> usize {
        num_cpus::get()
    }

    fn env_var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }

    async fn spawn_worker(
        &self,
        exits: mpsc::Sender<WorkerExit>,
    ) -> Result<WorkerHandle, RuntimeError> {
        let exe = env::current_exe().map_err(|e| RuntimeError::SpawnFailed {
            reason: e.to_string(),
        })?;

        let mut child = Command::new(exe)
            .args(env::args_os().skip(1))
            .env(WORKER_ROLE_ENV, "1")
            .spawn()
            .map_err(|e| RuntimeError::SpawnFailed {
                reason: e.to_string(),
            })?;

        let pid = child.id().ok_or_else(|| RuntimeError::SpawnFailed {
            reason: "child exited before pid was observed".to_string(),
        })?;

        // Reaper: owns the child, waits for it, reports the exit once.
        tokio::spawn(async move {
            let _ = child.wait().await;
            let _ = exits.send(WorkerExit { pid }).await;
        });

        Ok(WorkerHandle { pid })
    }

    #[cfg(unix)]
    fn signal_worker(&self, pid: u32, signal: WorkerSignal) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let sig = match signal {
            WorkerSignal::Terminate => Signal::SIGTERM,
            WorkerSignal::Kill => Signal::SIGKILL,
        };
        let _ = kill(Pid::from_raw(pid as i32), sig);
    }

    #[cfg(not(unix))]
    fn signal_worker(&self, _pid: u32, _signal: WorkerSignal) {
        // Windows has no SIGTERM equivalent for arbitrary pids; workers are
        // reaped on primary exit instead.
    }
}
