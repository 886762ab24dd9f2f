//! Global shortcut grabbing and matching
//!
//! Converts configured bindings into X11 passive grabs covering every
//! lock-modifier state, and dispatches matching key/button presses back
//! to named player actions.

mod binding;
mod grab;
pub(crate) mod keysyms;
mod listener;
mod modmap;

pub use binding::{Binding, BindingKind, Bindings, MOD_ANY};
pub use listener::{HotkeyError, HotkeyListener, ListenerEvent};
pub use modmap::LockMasks;
