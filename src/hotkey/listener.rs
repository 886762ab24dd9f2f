//! Global hotkey listener on a dedicated X11 event thread
//!
//! Owns the display connection: connects, discovers lock-modifier masks,
//! resolves bindings, installs the passive grabs, then polls the event
//! queue and bridges matched shortcuts into the async side of the daemon.
//! Binding reloads and shutdown are signalled into the thread; the thread
//! releases every grab on the way out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use crate::config::Config;
use crate::events::Action;

use super::binding::{BindingKind, Bindings};
use super::grab::{GrabManager, XBackend};
use super::{keysyms, modmap};

/// Poll granularity of the event loop; also bounds shutdown latency
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Events sent from the listener thread to the controller
#[derive(Debug, Clone)]
pub enum ListenerEvent {
    /// A configured shortcut fired
    Action(Action),
    /// The X connection died; shortcuts are gone until restart
    ConnectionLost,
}

/// Errors that can occur in the hotkey listener
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("failed to connect to X server: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    #[error("X11 request failed: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error("X11 reply failed: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),
}

/// Global hotkey listener driving passive grabs on the root window
pub struct HotkeyListener {
    config: Config,
    event_tx: mpsc::Sender<ListenerEvent>,
    control_tx: Option<mpsc::UnboundedSender<Config>>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl HotkeyListener {
    pub fn new(config: Config, event_tx: mpsc::Sender<ListenerEvent>) -> Self {
        Self {
            config,
            event_tx,
            control_tx: None,
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// Start the listener thread: connect, compute lock masks, install
    /// grabs, and begin dispatching events. Calling this while already
    /// running is a no-op.
    pub fn start(&mut self) -> Result<(), HotkeyError> {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("listener already running, start ignored");
            return Ok(());
        }

        let (control_tx, control_rx) = mpsc::unbounded_channel();
        self.control_tx = Some(control_tx);

        let config = self.config.clone();
        let event_tx = self.event_tx.clone();
        let running = Arc::clone(&self.running);

        let handle = thread::Builder::new()
            .name("hotkey-listener".to_string())
            .spawn(move || {
                info!("hotkey listener thread started");

                if let Err(e) = run_event_loop(config, &event_tx, control_rx, &running) {
                    error!(?e, "hotkey listener error");
                    let _ = event_tx.blocking_send(ListenerEvent::ConnectionLost);
                }

                running.store(false, Ordering::SeqCst);
                info!("hotkey listener thread stopped");
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                HotkeyError::ThreadSpawn(e.to_string())
            })?;

        self.thread = Some(handle);
        Ok(())
    }

    /// Hand a fresh configuration to the listener thread. The thread
    /// releases the old grab set before installing the new one.
    pub fn reload(&mut self, config: Config) {
        self.config = config.clone();
        match &self.control_tx {
            Some(tx) if self.is_running() => {
                if tx.send(config).is_err() {
                    warn!("listener thread gone, reload dropped");
                }
            }
            _ => debug!("listener not running, reload deferred to next start"),
        }
    }

    /// Stop the listener and release all grabs. Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.control_tx = None;
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("hotkey listener thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

fn run_event_loop(
    config: Config,
    event_tx: &mpsc::Sender<ListenerEvent>,
    mut control_rx: mpsc::UnboundedReceiver<Config>,
    running: &AtomicBool,
) -> Result<(), HotkeyError> {
    let (conn, screen_num) = RustConnection::connect(None)?;
    let root = conn.setup().roots[screen_num].root;
    info!(screen = screen_num, "connected to X server");

    let locks = modmap::discover(&conn);

    let resolve = |keysym: u32| match keysyms::keysym_to_keycode(&conn, keysym) {
        Ok(keycode) => keycode,
        Err(e) => {
            debug!(?e, keysym, "keysym resolution failed");
            None
        }
    };

    let mut bindings = Bindings::from_config(&config, resolve);
    let backend = XBackend::new(&conn, root);
    let mut manager = GrabManager::new(backend, locks);
    manager.install(&bindings);
    conn.flush()?;
    info!(bound = bindings.bound_count(), "global shortcuts grabbed");

    while running.load(Ordering::SeqCst) {
        // Binding changes swap the whole set: ungrab old, grab new.
        while let Ok(new_config) = control_rx.try_recv() {
            manager.remove(&bindings);
            bindings = Bindings::from_config(&new_config, resolve);
            manager.install(&bindings);
            conn.flush()?;
            info!(bound = bindings.bound_count(), "bindings reloaded");
        }

        match conn.poll_for_event()? {
            Some(Event::KeyPress(press)) => {
                let state = u16::from(press.state);
                match bindings.match_press(press.detail, state, BindingKind::Key, &locks) {
                    Some(action) => {
                        debug!(%action, code = press.detail, state, "key shortcut matched");
                        if event_tx.blocking_send(ListenerEvent::Action(action)).is_err() {
                            warn!("event channel closed, stopping listener");
                            break;
                        }
                    }
                    None => debug!(code = press.detail, state, "key press not matched"),
                }
            }
            Some(Event::ButtonPress(press)) => {
                let state = u16::from(press.state);
                match bindings.match_press(press.detail, state, BindingKind::Button, &locks) {
                    Some(action) => {
                        debug!(%action, button = press.detail, state, "button shortcut matched");
                        if event_tx.blocking_send(ListenerEvent::Action(action)).is_err() {
                            warn!("event channel closed, stopping listener");
                            break;
                        }
                    }
                    None => debug!(button = press.detail, state, "button press not matched"),
                }
            }
            Some(_) => {}
            None => thread::sleep(POLL_INTERVAL),
        }
    }

    manager.remove(&bindings);
    let _ = conn.flush();

    Ok(())
}
