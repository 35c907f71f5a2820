//! Error types used by the procvisor runtime and applications.
//!
//! This module defines three error types:
//!
//! - [`ConfigError`] — fatal configuration errors, raised at construction only.
//! - [`RuntimeError`] — errors raised by the supervision runtime itself.
//! - [`AppFault`] — faults raised by an [`Application`](crate::Application)
//!   lifecycle hook; always recoverable (a faulting worker still exits cleanly).
//!
//! [`ConfigError`] and [`RuntimeError`] provide `as_label` helpers producing
//! short stable labels for logs.

use std::io;
use thiserror::Error;

/// # Fatal configuration errors.
///
/// The only errors that abort supervisor construction. Everything that can go
/// wrong later (worker crashes, application faults, spawn failures) is handled
/// by the restart and shutdown paths instead.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No application factory was provided to the builder.
    #[error("an application factory is required; call SupervisorBuilder::with_app")]
    MissingApp,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use procvisor::ConfigError;
    ///
    /// assert_eq!(ConfigError::MissingApp.as_label(), "config_missing_app");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::MissingApp => "config_missing_app",
        }
    }
}

/// # Errors produced by the supervision runtime.
///
/// These represent failures in the orchestration machinery itself, not in the
/// supervised application.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Another supervisor is already live in this process.
    ///
    /// Exactly one supervisor may own the process-wide signal subscriptions at
    /// a time; the guard is released when the previous run finishes.
    #[error("a supervisor is already running in this process")]
    SupervisorActive,

    /// OS signal listener registration failed.
    #[error("signal registration failed: {source}")]
    SignalSetup {
        /// Underlying I/O error from the signal driver.
        #[source]
        source: io::Error,
    },

    /// Spawning a worker process failed.
    #[error("worker spawn failed: {reason}")]
    SpawnFailed {
        /// Human-readable spawn failure detail.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::SupervisorActive => "runtime_supervisor_active",
            RuntimeError::SignalSetup { .. } => "runtime_signal_setup",
            RuntimeError::SpawnFailed { .. } => "runtime_spawn_failed",
        }
    }
}

/// # Fault raised by an application lifecycle hook.
///
/// Returned from [`Application::initialize`](crate::Application::initialize),
/// [`Application::shutdown`](crate::Application::shutdown), and
/// [`AppFactory::create`](crate::AppFactory::create). A fault never crashes
/// the worker abnormally: initialization faults route into the graceful
/// shutdown path, shutdown faults are logged, and the worker exits cleanly.
///
/// # Example
/// ```
/// use procvisor::AppFault;
///
/// let fault = AppFault::new("listener bind failed");
/// assert_eq!(fault.to_string(), "listener bind failed");
/// ```
#[derive(Error, Debug)]
#[error("{message}")]
pub struct AppFault {
    message: String,
}

impl AppFault {
    /// Creates a fault with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<io::Error> for AppFault {
    fn from(e: io::Error) -> Self {
        AppFault::new(e.to_string())
    }
}
