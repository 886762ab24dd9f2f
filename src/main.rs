//! mediakeyd: global hotkey media-control daemon for X11
//!
//! Registers passive grabs on the root window for a configurable set of
//! media shortcuts, so they fire regardless of which window has focus,
//! and relays matched shortcuts to a media player over a Unix socket.
//!
//! - Lock-modifier discovery and power-set grab registration, so
//!   NumLock/CapsLock/ScrollLock state never breaks a shortcut
//! - Bindings persisted per action, reloaded (ungrab + regrab) on SIGHUP
//! - Fire-and-forget player commands; the daemon survives a missing
//!   player and a missing display

mod config;
mod events;
mod hotkey;
mod ipc;
mod lifecycle;
mod player;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::hotkey::HotkeyListener;
use crate::ipc::PlayerClient;
use crate::lifecycle::{ReloadSignal, ShutdownSignal};
use crate::player::Controller;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "mediakeyd starting");

    // Load configuration
    let config = Config::load()?;
    let socket_path = config.player_socket_path()?;
    info!(?socket_path, "configuration loaded");

    let shutdown = ShutdownSignal::new();
    let mut reload = ReloadSignal::new()?;

    // Hotkey listener -> controller
    let (event_tx, event_rx) = mpsc::channel(32);

    let mut listener = HotkeyListener::new(config.clone(), event_tx);
    match listener.start() {
        Ok(()) => {
            info!("hotkey listener started");
        }
        Err(e) => {
            error!(?e, "failed to start hotkey listener");
            warn!("continuing without global shortcuts - is DISPLAY set?");
        }
    }

    let client = PlayerClient::new(socket_path);
    let mut controller = Controller::new(client, &config);

    info!("daemon initialized, entering main loop");

    tokio::select! {
        // Dispatch matched shortcuts to the player
        _ = controller.run(event_rx) => {
            info!("controller exited");
        }

        // SIGHUP: re-read the config and swap the binding set
        _ = async {
            loop {
                reload.wait().await;
                match Config::load() {
                    Ok(new_config) => listener.reload(new_config),
                    Err(e) => warn!(?e, "config reload failed, keeping current bindings"),
                }
            }
        } => {}

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup: release every grab before exiting
    info!("shutting down...");
    listener.stop();
    info!("mediakeyd stopped");

    Ok(())
}
