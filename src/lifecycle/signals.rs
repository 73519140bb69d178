//! OS signal handling.
//!
//! SIGINT and SIGTERM request shutdown; SIGHUP requests a config reload.
//! Off Unix only Ctrl+C is observed.

use std::io;

/// What the process was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Shutdown,
    Reload,
}

/// Installed signal streams; create once and poll with [`Signals::recv`].
pub struct Signals {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
}

impl Signals {
    pub fn install() -> io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                terminate: signal(SignalKind::terminate())?,
                hangup: signal(SignalKind::hangup())?,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Wait for the next signal.
    pub async fn recv(&mut self) -> io::Result<Signal> {
        #[cfg(unix)]
        {
            tokio::select! {
                res = tokio::signal::ctrl_c() => res.map(|_| Signal::Shutdown),
                _ = self.terminate.recv() => Ok(Signal::Shutdown),
                _ = self.hangup.recv() => Ok(Signal::Reload),
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.map(|_| Signal::Shutdown)
        }
    }
}
