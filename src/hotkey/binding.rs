//! Shortcut bindings and event matching
//!
//! A binding ties one key or pointer-button code plus a modifier mask to a
//! player action. Matching is lock-state-invariant: NumLock, CapsLock and
//! ScrollLock bits are stripped from the observed event state before the
//! comparison, mirroring the lock-variant enumeration done at grab time.

use serde::{Deserialize, Serialize};

use crate::config::{Config, StoredBinding, DEFAULT_BINDINGS};
use crate::events::Action;

use super::modmap::LockMasks;

/// Wildcard modifier mask (X11 `AnyModifier`). A binding configured with
/// this mask matches any modifier combination and is grabbed exactly once.
pub const MOD_ANY: u16 = 0x8000;

/// Whether a binding refers to a keyboard key or a pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    Key,
    Button,
}

/// One configured shortcut: key-or-button code, modifier mask, kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// Keycode or button number; 0 means unbound
    pub code: u8,
    /// Required modifier mask, lock modifiers excluded
    pub mods: u16,
    pub kind: BindingKind,
}

impl Binding {
    pub const UNBOUND: Binding = Binding {
        code: 0,
        mods: 0,
        kind: BindingKind::Key,
    };

    /// An unbound binding is never grabbed and never matches
    pub fn is_bound(self) -> bool {
        self.code != 0
    }
}

impl From<StoredBinding> for Binding {
    fn from(stored: StoredBinding) -> Self {
        Binding {
            code: stored.code,
            mods: stored.mask,
            kind: stored.kind,
        }
    }
}

/// The full set of configured bindings, in match-priority order
#[derive(Debug, Clone)]
pub struct Bindings {
    entries: Vec<(Action, Binding)>,
}

impl Bindings {
    /// Build the binding set from persisted configuration.
    ///
    /// Actions absent from the config file fall back to their default
    /// keysym, resolved to a keycode through `resolve` (which needs the
    /// live keyboard mapping); actions with no default stay unbound.
    pub fn from_config(config: &Config, resolve: impl Fn(u32) -> Option<u8>) -> Self {
        let entries = DEFAULT_BINDINGS
            .iter()
            .map(|&(action, default_keysym)| {
                let binding = match config.bindings.get(action.config_key()) {
                    Some(&stored) => stored.into(),
                    None if default_keysym != 0 => Binding {
                        code: resolve(default_keysym).unwrap_or(0),
                        mods: 0,
                        kind: BindingKind::Key,
                    },
                    None => Binding::UNBOUND,
                };
                (action, binding)
            })
            .collect();
        Bindings { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Action, Binding)> {
        self.entries.iter()
    }

    /// Number of bound entries
    pub fn bound_count(&self) -> usize {
        self.entries.iter().filter(|(_, b)| b.is_bound()).count()
    }

    /// Offer a key or button press to the matcher.
    ///
    /// Lock modifier bits are stripped from `state` before comparison.
    /// The scan runs in declaration order and the first match wins, so
    /// identically configured bindings resolve to the first-declared
    /// action. `Some` means the event is consumed.
    pub fn match_press(
        &self,
        code: u8,
        state: u16,
        kind: BindingKind,
        locks: &LockMasks,
    ) -> Option<Action> {
        let stripped = state & !locks.all();
        self.entries
            .iter()
            .find(|(_, b)| {
                b.is_bound() && b.code == code && b.kind == kind && b.mods == stripped
            })
            .map(|&(action, _)| action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locks() -> LockMasks {
        LockMasks {
            num: 0x10,
            caps: 0x02,
            scroll: 0x20,
        }
    }

    fn bindings(entries: Vec<(Action, Binding)>) -> Bindings {
        Bindings { entries }
    }

    #[test]
    fn test_match_ignores_lock_state() {
        // Mute on bare keycode 121; CapsLock engaged on the event.
        let set = bindings(vec![(
            Action::Mute,
            Binding {
                code: 121,
                mods: 0,
                kind: BindingKind::Key,
            },
        )]);
        assert_eq!(
            set.match_press(121, 0x02, BindingKind::Key, &locks()),
            Some(Action::Mute)
        );
        // All three lock bits set at once.
        assert_eq!(
            set.match_press(121, 0x32, BindingKind::Key, &locks()),
            Some(Action::Mute)
        );
    }

    #[test]
    fn test_match_requires_exact_modifiers() {
        let set = bindings(vec![(
            Action::Play,
            Binding {
                code: 65,
                mods: 0x04, // Control
                kind: BindingKind::Key,
            },
        )]);
        assert_eq!(
            set.match_press(65, 0x04, BindingKind::Key, &locks()),
            Some(Action::Play)
        );
        // Control+NumLock still matches; Control+Shift does not.
        assert_eq!(
            set.match_press(65, 0x14, BindingKind::Key, &locks()),
            Some(Action::Play)
        );
        assert_eq!(set.match_press(65, 0x05, BindingKind::Key, &locks()), None);
        assert_eq!(set.match_press(65, 0x00, BindingKind::Key, &locks()), None);
    }

    #[test]
    fn test_match_distinguishes_kind() {
        let set = bindings(vec![(
            Action::NextTrack,
            Binding {
                code: 9,
                mods: 0,
                kind: BindingKind::Button,
            },
        )]);
        assert_eq!(
            set.match_press(9, 0, BindingKind::Button, &locks()),
            Some(Action::NextTrack)
        );
        assert_eq!(set.match_press(9, 0, BindingKind::Key, &locks()), None);
    }

    #[test]
    fn test_unbound_never_matches() {
        let set = bindings(vec![(Action::Stop, Binding::UNBOUND)]);
        assert_eq!(set.match_press(0, 0, BindingKind::Key, &locks()), None);
    }

    #[test]
    fn test_first_declared_action_wins() {
        let duplicate = Binding {
            code: 55,
            mods: 0,
            kind: BindingKind::Key,
        };
        let set = bindings(vec![
            (Action::Play, duplicate),
            (Action::Stop, duplicate),
        ]);
        assert_eq!(
            set.match_press(55, 0, BindingKind::Key, &locks()),
            Some(Action::Play)
        );
    }

    #[test]
    fn test_mod_any_matches_x11_constant() {
        assert_eq!(
            MOD_ANY,
            u16::from(x11rb::protocol::xproto::ModMask::ANY)
        );
    }
}
