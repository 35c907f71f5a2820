//! # Worker pool configuration.
//!
//! Provides [`WorkersPolicy`], the per-pool settings merged with defaults by
//! the [`SupervisorBuilder`](crate::SupervisorBuilder), and [`WorkerCount`],
//! the count policy resolved against the host CPU count at startup.
//!
//! ## Field semantics
//! - `count`: how many workers to keep alive (`Auto` = one per CPU)
//! - `restart_timeout`: flat delay before replacing a crashed worker
//! - `shutdown_timeout`: graceful window before shutdown escalates
//! - `restart_on_exception`: process-wide fault policy (see [`crate::fault`])
//!
//! Timer fields pass through verbatim — no floor or ceiling is applied.
//! A zero `shutdown_timeout` escalates immediately; a zero `restart_timeout`
//! replaces crashed workers without delay.

use std::time::Duration;

/// Worker count policy: a fixed target or one worker per host CPU.
///
/// Resolution never fails and the resolved target is always ≥ 1:
/// unparseable or non-positive inputs fall back to a single worker.
///
/// # Example
/// ```
/// use procvisor::WorkerCount;
///
/// assert_eq!(WorkerCount::parse("auto"), WorkerCount::Auto);
/// assert_eq!(WorkerCount::parse("4"), WorkerCount::Fixed(4));
/// assert_eq!(WorkerCount::parse("banana"), WorkerCount::Fixed(1));
/// assert_eq!(WorkerCount::Auto.resolve(8), 8);
/// assert_eq!(WorkerCount::Fixed(0).resolve(8), 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerCount {
    /// One worker per host CPU.
    Auto,
    /// A fixed number of workers.
    Fixed(u32),
}

impl WorkerCount {
    /// Parses a count from its textual form: `"auto"` or a positive integer.
    ///
    /// Never fails: parse errors and values below 1 fall back to `Fixed(1)`.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return WorkerCount::Auto;
        }
        match s.parse::<i64>() {
            Ok(n) if n >= 1 => WorkerCount::Fixed(n.min(i64::from(u32::MAX)) as u32),
            _ => WorkerCount::Fixed(1),
        }
    }

    /// Resolves the policy to a concrete target against the host CPU count.
    ///
    /// The result is always ≥ 1.
    pub fn resolve(&self, cpus: usize) -> usize {
        match self {
            WorkerCount::Auto => cpus.max(1),
            WorkerCount::Fixed(n) => (*n as usize).max(1),
        }
    }
}

impl Default for WorkerCount {
    /// Returns [`WorkerCount::Fixed(2)`](WorkerCount::Fixed).
    fn default() -> Self {
        WorkerCount::Fixed(2)
    }
}

impl From<u32> for WorkerCount {
    fn from(n: u32) -> Self {
        WorkerCount::Fixed(n)
    }
}

/// Pool lifecycle policy for the supervisor.
///
/// Defines:
/// - **Topology**: target worker count ([`WorkerCount`])
/// - **Recovery**: flat restart delay after an unexpected worker exit
/// - **Shutdown**: graceful window before escalation to forced kill
/// - **Fault policy**: restart-self vs log-and-continue on uncaught faults
#[derive(Clone, Copy, Debug)]
pub struct WorkersPolicy {
    /// Target number of workers.
    pub count: WorkerCount,

    /// Delay before replacing a worker that exited unexpectedly.
    ///
    /// Flat delay: no backoff growth and no retry cap. A persistently
    /// crashing application is replaced forever at this cadence.
    pub restart_timeout: Duration,

    /// Maximum wait for cooperative shutdown before escalation.
    ///
    /// On the primary: time between sending terminate to the pool and
    /// force-killing stragglers. On a worker: deadline for
    /// [`Application::shutdown`](crate::Application::shutdown).
    pub shutdown_timeout: Duration,

    /// Uncaught-fault policy (default `true`).
    ///
    /// `true`: a trapped fault terminates the process gracefully so the
    /// primary replaces it. `false`: log-and-continue, debug only.
    pub restart_on_exception: bool,
}

impl Default for WorkersPolicy {
    /// Default policy:
    ///
    /// - `count = Fixed(2)`
    /// - `restart_timeout = 1s`
    /// - `shutdown_timeout = 30s`
    /// - `restart_on_exception = true`
    fn default() -> Self {
        Self {
            count: WorkerCount::default(),
            restart_timeout: Duration::from_millis(1000),
            shutdown_timeout: Duration::from_millis(30_000),
            restart_on_exception: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auto_any_case() {
        assert_eq!(WorkerCount::parse("auto"), WorkerCount::Auto);
        assert_eq!(WorkerCount::parse("AUTO"), WorkerCount::Auto);
        assert_eq!(WorkerCount::parse("  Auto "), WorkerCount::Auto);
    }

    #[test]
    fn test_parse_positive_integer() {
        assert_eq!(WorkerCount::parse("1"), WorkerCount::Fixed(1));
        assert_eq!(WorkerCount::parse("16"), WorkerCount::Fixed(16));
    }

    #[test]
    fn test_parse_invalid_falls_back_to_one() {
        assert_eq!(WorkerCount::parse(""), WorkerCount::Fixed(1));
        assert_eq!(WorkerCount::parse("zero"), WorkerCount::Fixed(1));
        assert_eq!(WorkerCount::parse("0"), WorkerCount::Fixed(1));
        assert_eq!(WorkerCount::parse("-3"), WorkerCount::Fixed(1));
        assert_eq!(WorkerCount::parse("2.5"), WorkerCount::Fixed(1));
    }

    #[test]
    fn test_resolve_auto_uses_cpu_count() {
        assert_eq!(WorkerCount::Auto.resolve(3), 3);
        assert_eq!(WorkerCount::Auto.resolve(12), 12);
    }

    #[test]
    fn test_resolve_never_below_one() {
        assert_eq!(WorkerCount::Auto.resolve(0), 1);
        assert_eq!(WorkerCount::Fixed(0).resolve(8), 1);
    }

    #[test]
    fn test_default_policy() {
        let p = WorkersPolicy::default();
        assert_eq!(p.count, WorkerCount::Fixed(2));
        assert_eq!(p.restart_timeout, Duration::from_millis(1000));
        assert_eq!(p.shutdown_timeout, Duration::from_millis(30_000));
        assert!(p.restart_on_exception);
    }

    #[test]
    fn test_timers_pass_through_verbatim() {
        let p = WorkersPolicy {
            restart_timeout: Duration::ZERO,
            shutdown_timeout: Duration::from_millis(50),
            ..WorkersPolicy::default()
        };
        assert_eq!(p.restart_timeout, Duration::ZERO);
        assert_eq!(p.shutdown_timeout, Duration::from_millis(50));
    }
}
