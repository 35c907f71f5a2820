//! # Owned signal channels.
//!
//! Process-wide signal subscriptions become explicit channels owned by the
//! one live supervisor: [`Signals`] is the receiving end the role state
//! machines select on, and it is built either from the OS
//! ([`Signals::from_os`]) or from an in-memory pair
//! ([`Signals::channel`]) for embedding and tests.
//!
//! ## Signal classes
//! - [`SignalClass::Interrupt`] — SIGINT / Ctrl-C. Honored by the primary
//!   as a shutdown trigger; ignored by workers (some terminals deliver
//!   Ctrl-C to the whole process group, and shutdown decisions belong to
//!   the primary).
//! - [`SignalClass::Terminate`] — SIGTERM. Honored by both roles.
//!
//! SIGKILL is never subscribed; it is only ever *sent*, by the primary to
//! workers during forced shutdown.

use tokio::sync::mpsc;

use crate::error::RuntimeError;

/// Classified termination signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalClass {
    /// Interrupt (SIGINT / Ctrl-C).
    Interrupt,
    /// Terminate (SIGTERM).
    Terminate,
}

/// Injecting end of an in-memory signal channel.
///
/// Produced by [`Signals::channel`]; lets embedders and tests deliver
/// signals without touching process-wide handlers.
#[derive(Clone)]
pub struct SignalSender {
    tx: mpsc::Sender<SignalClass>,
}

impl SignalSender {
    /// Delivers an interrupt.
    pub fn interrupt(&self) {
        let _ = self.tx.try_send(SignalClass::Interrupt);
    }

    /// Delivers a terminate.
    pub fn terminate(&self) {
        let _ = self.tx.try_send(SignalClass::Terminate);
    }
}

/// Receiving end of the supervisor's signal subscription.
pub struct Signals {
    rx: mpsc::Receiver<SignalClass>,
}

impl Signals {
    /// Subscribes to OS termination signals.
    ///
    /// Spawns one forwarding task; each delivered SIGINT/SIGTERM becomes a
    /// [`SignalClass`] on the returned channel. Registration failures
    /// surface as [`RuntimeError::SignalSetup`].
    #[cfg(unix)]
    pub fn from_os() -> Result<Self, RuntimeError> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())
            .map_err(|source| RuntimeError::SignalSetup { source })?;
        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|source| RuntimeError::SignalSetup { source })?;

        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(async move {
            loop {
                let class = tokio::select! {
                    _ = sigint.recv() => SignalClass::Interrupt,
                    _ = sigterm.recv() => SignalClass::Terminate,
                };
                if tx.send(class).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self { rx })
    }

    /// Subscribes to Ctrl-C only (non-Unix platforms).
    #[cfg(not(unix))]
    pub fn from_os() -> Result<Self, RuntimeError> {
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if tx.send(SignalClass::Interrupt).await.is_err() {
                    break;
                }
            }
        });
        Ok(Self { rx })
    }

    /// Creates an in-memory signal pair for embedding and tests.
    pub fn channel() -> (SignalSender, Self) {
        let (tx, rx) = mpsc::channel(8);
        (SignalSender { tx }, Self { rx })
    }

    /// Receives the next classified signal.
    ///
    /// Returns `None` when every sending side is gone.
    pub(crate) async fn recv(&mut self) -> Option<SignalClass> {
        self.rx.recv().await
    }
}
