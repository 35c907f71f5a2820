//! # Application contract and factory.
//!
//! This module defines the [`Application`] trait (async init/shutdown
//! lifecycle) and a convenient closure-backed factory implementation
//! [`AppFactoryFn`]. The common handle type is [`AppRef`], an
//! `Arc<dyn Application>` suitable for sharing across the worker runtime.
//!
//! One `Application` instance lives per worker process. The worker runtime
//! drives it through exactly one `initialize` and at most one `shutdown`
//! call; an instance that never completes `shutdown` is tolerated (the
//! runtime's deadline resolves it).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppFault;

/// Shared handle to an application instance.
pub type AppRef = Arc<dyn Application>;

/// # Supervised unit of work with an init/shutdown lifecycle.
///
/// Both hooks are async and fallible. Returning a fault never crashes the
/// worker: an `initialize` fault routes into the graceful shutdown path,
/// and a `shutdown` fault is logged before the clean exit.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use procvisor::{AppFault, Application};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Application for Echo {
///     async fn initialize(&self) -> Result<(), AppFault> {
///         // bind listeners, open pools...
///         Ok(())
///     }
///
///     async fn shutdown(&self) -> Result<(), AppFault> {
///         // drain connections, flush buffers...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Application: Send + Sync + 'static {
    /// Brings the application up. Called once, before any signal handling.
    async fn initialize(&self) -> Result<(), AppFault>;

    /// Tears the application down cooperatively.
    ///
    /// Raced against the pool's `shutdown_timeout`; implementations that
    /// manage their own lifecycle may simply never return.
    async fn shutdown(&self) -> Result<(), AppFault>;
}

/// # Builds one application instance per worker process.
///
/// The factory receives the environment name (from the `APP_ENV` host
/// variable, default `"development"`) and returns the instance the worker
/// runtime will drive. A factory failure is treated like an initialization
/// fault: the worker runs its shutdown path and exits cleanly.
pub trait AppFactory: Send + Sync + 'static {
    /// Constructs the application for the given environment name.
    fn create(&self, env: &str) -> Result<AppRef, AppFault>;
}

/// Closure-backed factory implementation.
///
/// Wraps a closure `Fn(&str) -> Result<AppRef, AppFault>`, producing a fresh
/// instance per call. Prefer [`AppFactoryFn::arc`] when you immediately need
/// an `Arc<dyn AppFactory>` for the builder.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use procvisor::{AppFactory, AppFactoryFn, AppFault, AppRef, Application};
///
/// struct Echo { env: String }
///
/// #[async_trait]
/// impl Application for Echo {
///     async fn initialize(&self) -> Result<(), AppFault> { Ok(()) }
///     async fn shutdown(&self) -> Result<(), AppFault> { Ok(()) }
/// }
///
/// let factory = AppFactoryFn::arc(|env: &str| {
///     Ok(Arc::new(Echo { env: env.to_string() }) as AppRef)
/// });
/// assert!(factory.create("production").is_ok());
/// ```
pub struct AppFactoryFn<F> {
    f: F,
}

impl<F> AppFactoryFn<F>
where
    F: Fn(&str) -> Result<AppRef, AppFault> + Send + Sync + 'static,
{
    /// Creates a new closure-backed factory.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the factory and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F> AppFactory for AppFactoryFn<F>
where
    F: Fn(&str) -> Result<AppRef, AppFault> + Send + Sync + 'static,
{
    fn create(&self, env: &str) -> Result<AppRef, AppFault> {
        (self.f)(env)
    }
}
