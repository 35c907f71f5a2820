//! # Runtime events emitted by the master loop, worker runtime, and fault guard.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Pool events**: fork/exit/restart flow on the primary
//! - **Shutdown events**: the two-stage escalation state machine
//! - **Application events**: worker-side init/shutdown lifecycle
//! - **Fault events**: trapped process-wide faults
//!
//! Every kind carries a [`Level`] so sinks can render structured log lines;
//! the [`Event`] struct adds metadata such as timestamps, worker pid,
//! delays, and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use procvisor::{Event, EventKind, Level};
//!
//! let ev = Event::now(EventKind::WorkerLost)
//!     .with_pid(4242)
//!     .with_delay(Duration::from_millis(1000));
//!
//! assert_eq!(ev.kind, EventKind::WorkerLost);
//! assert_eq!(ev.kind.level(), Level::Warning);
//! assert_eq!(ev.pid, Some(4242));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Severity attached to each [`EventKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => write!(f, "info"),
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Pool events (primary) ===
    /// A worker process was spawned and recorded in the pool.
    ///
    /// Sets:
    /// - `pid`: worker pid
    /// - `pool_size`: pool population after insertion
    WorkerForked,

    /// A worker exited unexpectedly while the pool was running.
    ///
    /// A single replacement fork is scheduled after `delay`.
    ///
    /// Sets:
    /// - `pid`: worker pid
    /// - `delay_ms`: restart delay
    WorkerLost,

    /// A worker exited as part of a planned shutdown.
    ///
    /// Sets:
    /// - `pid`: worker pid
    /// - `pool_size`: pool population after removal
    WorkerStopped,

    /// Spawning a worker failed; a retry is scheduled after `delay`.
    ///
    /// Sets:
    /// - `reason`: spawn failure detail
    /// - `delay_ms`: retry delay
    SpawnFailed,

    /// A scheduled replacement fork was dropped (shutdown already started).
    RestartCanceled,

    // === Shutdown events ===
    /// Graceful shutdown started; terminate sent to every pooled worker.
    ///
    /// Sets:
    /// - `pool_size`: number of workers signalled
    ShutdownRequested,

    /// Shutdown escalated; kill sent to every still-pooled worker.
    ///
    /// Sets:
    /// - `pool_size`: number of workers killed
    ShutdownForced,

    /// All workers exited within the graceful window; the primary stops.
    PoolDrained,

    /// The primary is about to exit.
    ///
    /// Sets:
    /// - `exit_code`: 0 clean, 1 forced
    PrimaryExiting,

    // === Application events (worker) ===
    /// The application instance initialized successfully.
    AppInitialized,

    /// Application construction or `initialize` faulted.
    ///
    /// The worker proceeds into the graceful shutdown path.
    ///
    /// Sets:
    /// - `reason`: fault message
    AppInitFailed,

    /// Cooperative application shutdown started.
    AppShutdownStarted,

    /// `Application::shutdown` returned a fault (logged, exit stays clean).
    ///
    /// Sets:
    /// - `reason`: fault message
    AppShutdownFailed,

    /// `Application::shutdown` did not resolve before the deadline.
    ///
    /// Sets:
    /// - `timeout_ms`: configured shutdown window
    AppShutdownTimeout,

    /// The worker is about to exit.
    ///
    /// Sets:
    /// - `exit_code`: always 0 for application-driven exits
    WorkerExiting,

    // === Fault events ===
    /// A fault escaped all local handling and was trapped process-wide.
    ///
    /// Sets:
    /// - `reason`: panic payload / fault detail
    FaultTrapped,

    /// Restart-on-fault is disabled; the process keeps running after faults.
    ///
    /// Published at installation and again on every trapped fault.
    FaultRestartDisabled,
}

impl EventKind {
    /// Returns the severity this kind is logged at.
    pub fn level(&self) -> Level {
        match self {
            EventKind::WorkerForked
            | EventKind::WorkerStopped
            | EventKind::RestartCanceled
            | EventKind::ShutdownRequested
            | EventKind::PoolDrained
            | EventKind::PrimaryExiting
            | EventKind::AppInitialized
            | EventKind::AppShutdownStarted
            | EventKind::WorkerExiting => Level::Info,

            EventKind::WorkerLost
            | EventKind::ShutdownForced
            | EventKind::AppShutdownTimeout
            | EventKind::FaultRestartDisabled => Level::Warning,

            EventKind::SpawnFailed
            | EventKind::AppInitFailed
            | EventKind::AppShutdownFailed
            | EventKind::FaultTrapped => Level::Error,
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Worker process id, if applicable.
    pub pid: Option<u32>,
    /// Human-readable reason (fault messages, spawn errors, etc.).
    pub reason: Option<Arc<str>>,
    /// Restart/retry delay in milliseconds.
    pub delay_ms: Option<u64>,
    /// Shutdown deadline in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Pool population after the event applied.
    pub pool_size: Option<usize>,
    /// Process exit code, for `PrimaryExiting` / `WorkerExiting`.
    pub exit_code: Option<i32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            pid: None,
            reason: None,
            delay_ms: None,
            timeout_ms: None,
            pool_size: None,
            exit_code: None,
        }
    }

    /// Attaches a worker pid.
    #[inline]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a restart/retry delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches a shutdown deadline (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches the pool population after the event applied.
    #[inline]
    pub fn with_pool_size(mut self, n: usize) -> Self {
        self.pool_size = Some(n);
        self
    }

    /// Attaches a process exit code.
    #[inline]
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::now(EventKind::WorkerForked);
        let b = Event::now(EventKind::WorkerForked);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_levels_match_shutdown_escalation() {
        assert_eq!(EventKind::ShutdownRequested.level(), Level::Info);
        assert_eq!(EventKind::ShutdownForced.level(), Level::Warning);
        assert_eq!(EventKind::FaultTrapped.level(), Level::Error);
    }

    #[test]
    fn test_metadata_builders() {
        let ev = Event::now(EventKind::WorkerLost)
            .with_pid(7)
            .with_delay(Duration::from_millis(250))
            .with_pool_size(3);
        assert_eq!(ev.pid, Some(7));
        assert_eq!(ev.delay_ms, Some(250));
        assert_eq!(ev.pool_size, Some(3));
    }
}
