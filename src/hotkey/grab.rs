//! Passive grab registration
//!
//! X11 treats every lock-modifier state as a distinct modifier combination,
//! so a binding has to be grabbed once per subset of the lock masks present
//! on the keyboard: up to 8 grabs per binding. One routine enumerates the
//! variants and is shared between install and release; only the underlying
//! request differs.
//!
//! Individual grab requests may fail (another client already holds the
//! combination). Failures are absorbed per request and the batch keeps
//! going; the binding is just less reliable for that lock-state
//! combination. Nothing here is fatal.

use tracing::debug;
use x11rb::connection::Connection;
use x11rb::errors::{ConnectionError, ReplyError};
use x11rb::protocol::xproto::{
    ButtonIndex, ConnectionExt as _, EventMask, GrabMode, ModMask, Window,
};

use super::binding::{BindingKind, Bindings, MOD_ANY};
use super::modmap::LockMasks;

/// A failed grab or ungrab request
#[derive(Debug, thiserror::Error)]
pub enum GrabError {
    #[error("request could not be sent: {0}")]
    Send(#[from] ConnectionError),
    #[error("server rejected request: {0}")]
    Rejected(#[from] ReplyError),
}

/// The OS seam: issues or releases one passive grab.
///
/// Implemented by [`XBackend`] against a live connection and by a
/// recording fake in tests.
pub trait GrabBackend {
    fn grab(&self, kind: BindingKind, code: u8, mods: u16) -> Result<(), GrabError>;
    fn release(&self, kind: BindingKind, code: u8, mods: u16) -> Result<(), GrabError>;

    /// Round-trip barrier bracketing a batch of requests, so that errors
    /// from the batch are delivered (and absorbed) before it returns.
    fn barrier(&self) {}
}

#[derive(Clone, Copy)]
enum GrabOp {
    Install,
    Release,
}

/// Owns the "are grabs installed" flag and drives grab batches.
///
/// Install and remove are idempotent: a redundant call is a cheap no-op.
/// A binding change must go through [`GrabManager::remove`] with the old
/// set before [`GrabManager::install`] with the new one.
pub struct GrabManager<B> {
    backend: B,
    locks: LockMasks,
    grabbed: bool,
}

impl<B: GrabBackend> GrabManager<B> {
    pub fn new(backend: B, locks: LockMasks) -> Self {
        GrabManager {
            backend,
            locks,
            grabbed: false,
        }
    }

    /// Register passive grabs for every bound binding, covering all
    /// lock-modifier states. No-op when grabs are already installed.
    pub fn install(&mut self, bindings: &Bindings) {
        if self.grabbed {
            return;
        }
        self.apply_all(bindings, GrabOp::Install);
        self.grabbed = true;
    }

    /// Release exactly the grabs [`GrabManager::install`] registered.
    /// No-op when nothing is installed.
    pub fn remove(&mut self, bindings: &Bindings) {
        if !self.grabbed {
            return;
        }
        self.apply_all(bindings, GrabOp::Release);
        self.grabbed = false;
    }

    fn apply_all(&self, bindings: &Bindings, op: GrabOp) {
        self.backend.barrier();
        for (action, binding) in bindings.iter() {
            if !binding.is_bound() {
                continue;
            }
            let base = binding.mods & !self.locks.all();
            for mods in lock_variants(base, &self.locks) {
                let result = match op {
                    GrabOp::Install => self.backend.grab(binding.kind, binding.code, mods),
                    GrabOp::Release => self.backend.release(binding.kind, binding.code, mods),
                };
                if let Err(e) = result {
                    debug!(%action, code = binding.code, mods, ?e, "grab request failed");
                }
            }
        }
        self.backend.barrier();
    }
}

/// Enumerate the modifier combinations a grab must cover: the base mask
/// alone plus the base combined with every non-empty subset of the
/// present (non-zero) lock masks. A wildcard base already subsumes every
/// lock state and yields only itself.
fn lock_variants(base: u16, locks: &LockMasks) -> Vec<u16> {
    if base == MOD_ANY {
        return vec![base];
    }
    let present: Vec<u16> = [locks.num, locks.caps, locks.scroll]
        .into_iter()
        .filter(|&mask| mask != 0)
        .collect();

    let mut variants = Vec::with_capacity(1 << present.len());
    for subset in 0u8..(1 << present.len()) {
        let mut mods = base;
        for (bit, &mask) in present.iter().enumerate() {
            if subset & (1 << bit) != 0 {
                mods |= mask;
            }
        }
        variants.push(mods);
    }
    variants
}

/// Grab backend talking to a live X server, registering on the root
/// window with asynchronous pointer/keyboard modes.
pub struct XBackend<'a, C: Connection> {
    conn: &'a C,
    root: Window,
}

impl<'a, C: Connection> XBackend<'a, C> {
    pub fn new(conn: &'a C, root: Window) -> Self {
        XBackend { conn, root }
    }
}

impl<C: Connection> GrabBackend for XBackend<'_, C> {
    fn grab(&self, kind: BindingKind, code: u8, mods: u16) -> Result<(), GrabError> {
        let modifiers = ModMask::from(mods);
        match kind {
            BindingKind::Key => {
                self.conn
                    .grab_key(
                        false,
                        self.root,
                        modifiers,
                        code,
                        GrabMode::ASYNC,
                        GrabMode::ASYNC,
                    )?
                    .check()?;
            }
            BindingKind::Button => {
                self.conn
                    .grab_button(
                        false,
                        self.root,
                        EventMask::BUTTON_PRESS,
                        GrabMode::ASYNC,
                        GrabMode::ASYNC,
                        x11rb::NONE,
                        x11rb::NONE,
                        ButtonIndex::from(code),
                        modifiers,
                    )?
                    .check()?;
            }
        }
        Ok(())
    }

    fn release(&self, kind: BindingKind, code: u8, mods: u16) -> Result<(), GrabError> {
        let modifiers = ModMask::from(mods);
        match kind {
            BindingKind::Key => {
                self.conn.ungrab_key(code, self.root, modifiers)?.check()?;
            }
            BindingKind::Button => {
                self.conn
                    .ungrab_button(ButtonIndex::from(code), self.root, modifiers)?
                    .check()?;
            }
        }
        Ok(())
    }

    fn barrier(&self) {
        // GetInputFocus round-trip: forces delivery of any outstanding
        // errors from the preceding requests.
        if let Ok(cookie) = self.conn.get_input_focus() {
            let _ = cookie.reply();
        }
    }
}
