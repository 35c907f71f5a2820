//! Event delivery to user-provided sinks.
//!
//! Internal modules:
//! - [`subscriber`]: the [`Subscribe`] extension trait;
//! - [`set`]: bounded-queue fan-out with panic isolation;
//! - [`log`]: embedded line printer (feature `logging`).

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
