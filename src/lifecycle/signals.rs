//! Signal handling for graceful shutdown and config reload

use anyhow::{Context, Result};
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{debug, warn};

/// Handles shutdown signals (SIGTERM, SIGINT)
pub struct ShutdownSignal;

impl ShutdownSignal {
    pub fn new() -> Self {
        Self
    }

    /// Wait for a shutdown signal
    pub async fn wait(&self) {
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt())
            .expect("failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                debug!("received SIGTERM");
            }
            _ = sigint.recv() => {
                debug!("received SIGINT");
            }
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// SIGHUP-driven configuration reload. Each delivery triggers a re-read
/// of the config file and a full ungrab/regrab cycle of the bindings.
pub struct ReloadSignal {
    sighup: Signal,
}

impl ReloadSignal {
    pub fn new() -> Result<Self> {
        let sighup = signal(SignalKind::hangup())
            .context("failed to register SIGHUP handler")?;
        Ok(Self { sighup })
    }

    /// Wait for the next reload request
    pub async fn wait(&mut self) {
        match self.sighup.recv().await {
            Some(()) => debug!("received SIGHUP"),
            None => {
                warn!("SIGHUP stream closed, reload disabled");
                std::future::pending::<()>().await;
            }
        }
    }
}
