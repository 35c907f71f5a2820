//! # Process-wide uncaught-fault containment.
//!
//! [`FaultGuard`] installs one panic hook per process, the last line of
//! defense for faults that escape all local handling. The policy comes
//! from [`WorkersPolicy::restart_on_exception`](crate::WorkersPolicy):
//!
//! - **Restart** (default): publish the fault, then request graceful
//!   self-termination by raising SIGTERM against the current process —
//!   the normal signal path shuts the role machine down and, on a worker,
//!   the primary forks a replacement. A hard-kill fallback fires 5000ms
//!   later in case graceful self-termination stalls.
//! - **Continue**: publish the fault and keep running. A loud warning
//!   banner is published at installation and again on every fault; this
//!   mode exists for debugging only.
//!
//! The hook chains to the previously installed hook first, so the default
//! stderr backtrace stays intact.

use std::time::Duration;

use crate::config::WorkersPolicy;
use crate::events::{Bus, Event, EventKind};

/// Delay before the hard-kill fallback when graceful self-termination stalls.
const HARD_KILL_FALLBACK: Duration = Duration::from_millis(5000);

/// What to do with a fault that escaped all local handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Terminate this process gracefully so the pool replaces it.
    Restart,
    /// Log and keep running (debug-only opt-out).
    Continue,
}

impl FaultPolicy {
    /// Derives the policy from the pool configuration.
    pub fn from_workers(workers: &WorkersPolicy) -> Self {
        if workers.restart_on_exception {
            FaultPolicy::Restart
        } else {
            FaultPolicy::Continue
        }
    }
}

/// Process-wide panic hook with a restart-or-continue policy.
pub struct FaultGuard;

impl FaultGuard {
    /// Installs the hook. Safe to call again; the newest installation wins.
    pub fn install(policy: FaultPolicy, bus: Bus) {
        if policy == FaultPolicy::Continue {
            bus.publish(Event::now(EventKind::FaultRestartDisabled));
        }

        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            previous(info);
            bus.publish(Event::now(EventKind::FaultTrapped).with_reason(info.to_string()));

            match policy {
                FaultPolicy::Restart => Self::terminate_self(),
                FaultPolicy::Continue => {
                    bus.publish(Event::now(EventKind::FaultRestartDisabled));
                }
            }
        }));
    }

    /// Requests graceful self-termination, with a delayed hard kill.
    #[cfg(unix)]
    fn terminate_self() {
        use nix::sys::signal::{raise, Signal};

        let _ = raise(Signal::SIGTERM);
        std::thread::spawn(|| {
            std::thread::sleep(HARD_KILL_FALLBACK);
            let _ = raise(Signal::SIGKILL);
        });
    }

    #[cfg(not(unix))]
    fn terminate_self() {
        std::thread::spawn(|| {
            std::thread::sleep(HARD_KILL_FALLBACK);
            std::process::exit(1);
        });
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_workers() {
        let mut w = WorkersPolicy::default();
        assert_eq!(FaultPolicy::from_workers(&w), FaultPolicy::Restart);
        w.restart_on_exception = false;
        assert_eq!(FaultPolicy::from_workers(&w), FaultPolicy::Continue);
    }

    #[test]
    fn test_continue_policy_publishes_banner_and_fault() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        FaultGuard::install(FaultPolicy::Continue, bus.clone());

        let joined = std::thread::spawn(|| panic!("boom")).join();
        assert!(joined.is_err());

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        let _ = std::panic::take_hook();

        assert_eq!(kinds[0], EventKind::FaultRestartDisabled);
        assert!(kinds.contains(&EventKind::FaultTrapped));
        // banner repeats on every trapped fault
        assert!(
            kinds
                .iter()
                .filter(|k| **k == EventKind::FaultRestartDisabled)
                .count()
                >= 2
        );
    }
}
