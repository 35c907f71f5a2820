//! # Shutdown escalation state.
//!
//! [`ShutdownState`] is held independently by the master loop and by each
//! worker runtime. It only ever moves forward:
//!
//! ```text
//! Running → GracefulShutdown → ForcedShutdown → Terminated
//! ```
//!
//! Stages may be skipped (a worker goes straight from `GracefulShutdown`
//! to `Terminated`), but no transition ever regresses.

/// Monotonic shutdown stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShutdownState {
    /// Normal operation; crashes trigger restarts.
    Running,
    /// Cooperative stop in progress; terminate sent, deadline armed.
    GracefulShutdown,
    /// Escalated stop; kill sent, fixed grace before exit.
    ForcedShutdown,
    /// Final state; the process is about to exit.
    Terminated,
}

impl ShutdownState {
    /// Advances to `next` if it is strictly later than the current stage.
    ///
    /// Returns `true` when the transition applied. Regressions and repeats
    /// are rejected, which is what makes shutdown triggers idempotent.
    pub fn advance(&mut self, next: ShutdownState) -> bool {
        if next > *self {
            *self = next;
            true
        } else {
            false
        }
    }

    /// Returns `true` once any shutdown stage has been entered.
    pub fn is_shutting_down(&self) -> bool {
        *self >= ShutdownState::GracefulShutdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advances_forward_only() {
        let mut s = ShutdownState::Running;
        assert!(s.advance(ShutdownState::GracefulShutdown));
        assert!(s.advance(ShutdownState::ForcedShutdown));
        assert!(s.advance(ShutdownState::Terminated));
        assert_eq!(s, ShutdownState::Terminated);
    }

    #[test]
    fn test_rejects_regression_and_repeat() {
        let mut s = ShutdownState::ForcedShutdown;
        assert!(!s.advance(ShutdownState::ForcedShutdown));
        assert!(!s.advance(ShutdownState::GracefulShutdown));
        assert!(!s.advance(ShutdownState::Running));
        assert_eq!(s, ShutdownState::ForcedShutdown);
    }

    #[test]
    fn test_skipping_stages_is_allowed() {
        let mut s = ShutdownState::Running;
        assert!(s.advance(ShutdownState::Terminated));
    }

    #[test]
    fn test_shutting_down_predicate() {
        assert!(!ShutdownState::Running.is_shutting_down());
        assert!(ShutdownState::GracefulShutdown.is_shutting_down());
        assert!(ShutdownState::ForcedShutdown.is_shutting_down());
        assert!(ShutdownState::Terminated.is_shutting_down());
    }
}
