//! # Cross-platform shutdown signal monitor.
//!
//! [`ShutdownSignals`] installs the OS listeners once; [`spawn_signal_monitor`]
//! turns every received signal into a cancellation of the shared shutdown token.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]
//!
//! ## Rules
//! - The first signal raises the shutdown flag; later signals are no-ops on it.
//! - The monitor keeps listening for the whole process lifetime.

use std::io;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Installed termination signal listeners.
pub struct ShutdownSignals {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigquit: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    /// Registers the listeners. Fails if the OS refuses registration.
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    /// Registers the listeners. Fails if the OS refuses registration.
    #[cfg(not(unix))]
    pub fn install() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Waits for the next signal and returns its name.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigint.recv()  => "SIGINT",
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigquit.recv() => "SIGQUIT",
        }
    }

    /// Waits for the next signal and returns its name.
    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "ctrl-c",
            Err(_) => std::future::pending().await,
        }
    }
}

/// Installs the listeners, then spawns the monitor: every signal cancels `shutdown`.
///
/// Listeners are registered before this returns, so a signal raised right
/// after the call is not lost. On registration failure nothing is spawned and
/// the shell only stops on `exit` or end of input.
pub fn spawn_signal_monitor(shutdown: CancellationToken) -> io::Result<JoinHandle<()>> {
    let mut signals = ShutdownSignals::install()?;
    Ok(tokio::spawn(async move {
        loop {
            let signal = signals.recv().await;
            if shutdown.is_cancelled() {
                info!(signal, "shutdown already in progress");
            } else {
                info!(signal, "received shutdown signal");
                shutdown.cancel();
            }
        }
    }))
}
