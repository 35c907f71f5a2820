//! # MasterSupervisor: pool ownership, restart loop, shutdown escalation.
//!
//! The master is a single event loop that owns the worker pool outright.
//! Everything that can change the pool — spawn confirmations, observed
//! exits, restart timers, shutdown deadlines — arrives as a message on a
//! channel the loop selects over, so there is exactly one writer and no
//! locking.
//!
//! ## Event flow
//! ```text
//! signals ────────────┐
//! worker exits ───────┼──► select loop ──► pool mutation, host signalling
//! timer messages ─────┘         │
//!                               └─► spawned sleeps send RestartDue /
//!                                   ForceDeadline / ForcedGraceElapsed
//!                                   back into the loop
//! ```
//!
//! ## Shutdown escalation
//! ```text
//! Running ──(INT/TERM)──► GracefulShutdown: terminate sent to pool,
//!    │                        force timer armed (shutdown_timeout)
//!    │                        │
//!    │          pool drained ─┴─► exit 0
//!    │                        │
//!    │        second trigger ─┴─► ForcedShutdown: kill sent to pool,
//!    │         or force timer         exit 1 after fixed 1000ms grace
//! ```
//!
//! ## Rules
//! - A crashing worker never aborts the primary; it schedules exactly one
//!   replacement after `restart_timeout` (flat delay, no cap).
//! - A restart timer that fires after shutdown has started does not fork.
//! - The pool-drained exit (code 0) applies only during `GracefulShutdown`;
//!   the forced path always exits 1 after its grace window.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;

use crate::config::WorkersPolicy;
use crate::core::signals::{SignalClass, Signals};
use crate::core::state::ShutdownState;
use crate::events::{Bus, Event, EventKind};
use crate::host::{ProcessHost, WorkerExit, WorkerHandle, WorkerSignal};

/// Fixed grace between the kill burst and the forced primary exit.
const FORCED_EXIT_GRACE: Duration = Duration::from_millis(1000);

/// Timer expirations delivered back into the master loop.
enum TimerMsg {
    /// A restart delay elapsed; fork a replacement if still running.
    RestartDue,
    /// The graceful window elapsed; escalate to forced shutdown.
    ForceDeadline,
    /// The forced grace elapsed; exit with code 1.
    ForcedGraceElapsed,
}

/// Primary-side state machine: owns the pool, drives restarts and shutdown.
pub(crate) struct MasterSupervisor {
    workers: WorkersPolicy,
    host: Arc<dyn ProcessHost>,
    bus: Bus,
    state: ShutdownState,
    pool: HashMap<u32, WorkerHandle>,
}

impl MasterSupervisor {
    pub(crate) fn new(workers: WorkersPolicy, host: Arc<dyn ProcessHost>, bus: Bus) -> Self {
        Self {
            workers,
            host,
            bus,
            state: ShutdownState::Running,
            pool: HashMap::new(),
        }
    }

    /// Runs the pool until shutdown completes; returns the process exit code.
    pub(crate) async fn run(mut self, signals: Signals) -> i32 {
        let target = self.workers.count.resolve(self.host.cpu_count());

        let (exit_tx, mut exit_rx) = mpsc::channel::<WorkerExit>(64);
        let (timer_tx, mut timer_rx) = mpsc::channel::<TimerMsg>(16);

        for _ in 0..target {
            self.fork(&exit_tx, &timer_tx).await;
        }

        let mut signals = Some(signals);
        loop {
            tokio::select! {
                _class = next_signal(&mut signals) => {
                    if let Some(code) = self.initiate_shutdown(&timer_tx) {
                        return code;
                    }
                }
                Some(exit) = exit_rx.recv() => {
                    if let Some(code) = self.on_worker_exit(exit, &timer_tx) {
                        return code;
                    }
                }
                Some(msg) = timer_rx.recv() => {
                    if let Some(code) = self.on_timer(msg, &exit_tx, &timer_tx).await {
                        return code;
                    }
                }
            }
        }
    }

    /// Forks one worker and records it in the pool.
    ///
    /// A spawn failure is handled like an unexpected exit: logged and
    /// retried after `restart_timeout`.
    async fn fork(&mut self, exit_tx: &mpsc::Sender<WorkerExit>, timer_tx: &mpsc::Sender<TimerMsg>) {
        match self.host.spawn_worker(exit_tx.clone()).await {
            Ok(handle) => {
                self.pool.insert(handle.pid, handle);
                self.bus.publish(
                    Event::now(EventKind::WorkerForked)
                        .with_pid(handle.pid)
                        .with_pool_size(self.pool.len()),
                );
            }
            Err(e) => {
                self.bus.publish(
                    Event::now(EventKind::SpawnFailed)
                        .with_reason(e.to_string())
                        .with_delay(self.workers.restart_timeout),
                );
                self.schedule(timer_tx, self.workers.restart_timeout, TimerMsg::RestartDue);
            }
        }
    }

    /// Handles one observed worker exit. Returns an exit code when the
    /// drained pool completes a graceful shutdown.
    fn on_worker_exit(
        &mut self,
        exit: WorkerExit,
        timer_tx: &mpsc::Sender<TimerMsg>,
    ) -> Option<i32> {
        if self.pool.remove(&exit.pid).is_none() {
            return None;
        }

        match self.state {
            ShutdownState::Running => {
                self.bus.publish(
                    Event::now(EventKind::WorkerLost)
                        .with_pid(exit.pid)
                        .with_delay(self.workers.restart_timeout),
                );
                self.schedule(timer_tx, self.workers.restart_timeout, TimerMsg::RestartDue);
                None
            }
            ShutdownState::GracefulShutdown => {
                self.bus.publish(
                    Event::now(EventKind::WorkerStopped)
                        .with_pid(exit.pid)
                        .with_pool_size(self.pool.len()),
                );
                if self.pool.is_empty() {
                    self.bus.publish(Event::now(EventKind::PoolDrained));
                    Some(self.exit_with(0))
                } else {
                    None
                }
            }
            ShutdownState::ForcedShutdown | ShutdownState::Terminated => {
                self.bus.publish(
                    Event::now(EventKind::WorkerStopped)
                        .with_pid(exit.pid)
                        .with_pool_size(self.pool.len()),
                );
                None
            }
        }
    }

    /// Handles a timer expiry. Returns an exit code when the forced grace
    /// window closes.
    async fn on_timer(
        &mut self,
        msg: TimerMsg,
        exit_tx: &mpsc::Sender<WorkerExit>,
        timer_tx: &mpsc::Sender<TimerMsg>,
    ) -> Option<i32> {
        match msg {
            TimerMsg::RestartDue => {
                if self.state == ShutdownState::Running {
                    self.fork(exit_tx, timer_tx).await;
                } else {
                    self.bus.publish(Event::now(EventKind::RestartCanceled));
                }
                None
            }
            TimerMsg::ForceDeadline => {
                if self.state == ShutdownState::GracefulShutdown {
                    self.forced_shutdown(timer_tx);
                }
                None
            }
            TimerMsg::ForcedGraceElapsed => Some(self.exit_with(1)),
        }
    }

    /// Idempotent shutdown trigger.
    ///
    /// First call moves to `GracefulShutdown` and terminates the pool; a
    /// call while already graceful escalates immediately. Returns an exit
    /// code when the pool was already empty.
    fn initiate_shutdown(&mut self, timer_tx: &mpsc::Sender<TimerMsg>) -> Option<i32> {
        match self.state {
            ShutdownState::Running => {
                self.state.advance(ShutdownState::GracefulShutdown);
                self.bus.publish(
                    Event::now(EventKind::ShutdownRequested).with_pool_size(self.pool.len()),
                );

                if self.pool.is_empty() {
                    self.bus.publish(Event::now(EventKind::PoolDrained));
                    return Some(self.exit_with(0));
                }

                for pid in self.pool.keys() {
                    self.host.signal_worker(*pid, WorkerSignal::Terminate);
                }
                self.schedule(timer_tx, self.workers.shutdown_timeout, TimerMsg::ForceDeadline);
                None
            }
            ShutdownState::GracefulShutdown => {
                self.forced_shutdown(timer_tx);
                None
            }
            ShutdownState::ForcedShutdown | ShutdownState::Terminated => None,
        }
    }

    /// Escalates: kill every still-pooled worker, then exit 1 after the
    /// fixed grace.
    fn forced_shutdown(&mut self, timer_tx: &mpsc::Sender<TimerMsg>) {
        if !self.state.advance(ShutdownState::ForcedShutdown) {
            return;
        }
        self.bus
            .publish(Event::now(EventKind::ShutdownForced).with_pool_size(self.pool.len()));

        for pid in self.pool.keys() {
            self.host.signal_worker(*pid, WorkerSignal::Kill);
        }
        self.schedule(timer_tx, FORCED_EXIT_GRACE, TimerMsg::ForcedGraceElapsed);
    }

    /// Marks the machine terminated and publishes the final exit event.
    fn exit_with(&mut self, code: i32) -> i32 {
        self.state.advance(ShutdownState::Terminated);
        self.bus
            .publish(Event::now(EventKind::PrimaryExiting).with_exit_code(code));
        code
    }

    /// Arms a one-shot timer that reports back into the master loop.
    fn schedule(&self, timer_tx: &mpsc::Sender<TimerMsg>, delay: Duration, msg: TimerMsg) {
        let tx = timer_tx.clone();
        tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = tx.send(msg).await;
        });
    }
}

/// Resolves to the next signal; pends forever once the source is gone so
/// the select loop keeps draining exits and timers.
async fn next_signal(signals: &mut Option<Signals>) -> SignalClass {
    loop {
        match signals {
            Some(s) => match s.recv().await {
                Some(class) => return class,
                None => *signals = None,
            },
            None => std::future::pending().await,
        }
    }
}
