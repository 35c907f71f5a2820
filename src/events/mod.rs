//! Runtime events and the broadcast bus carrying them.
//!
//! Internal modules:
//! - [`event`]: event classification, severity levels, and metadata;
//! - [`bus`]: broadcast channel wrapper for non-blocking publishing.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, Level};
