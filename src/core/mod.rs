//! Runtime core: role selection and the two lifecycle state machines.
//!
//! The public API from this module is [`Supervisor`] (with its builder),
//! the per-process entry point. Internal modules:
//!
//! - [`state`]: the monotonic shutdown state shared by both machines;
//! - [`signals`]: owned signal channels, OS-backed or injected;
//! - [`master`]: pool ownership, restart loop, shutdown escalation;
//! - [`worker`]: one application instance, deadline-raced shutdown;
//! - [`supervisor`]: builder, single-instance guard, role dispatch.

mod master;
mod state;
mod supervisor;
mod worker;

pub mod signals;

pub use signals::{SignalClass, SignalSender, Signals};
pub use state::ShutdownState;
pub use supervisor::{Supervisor, SupervisorBuilder};
pub use worker::APP_ENV;
