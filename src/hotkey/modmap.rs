//! Lock-modifier mask discovery
//!
//! X11 keyboards may map NumLock and ScrollLock to any of the eight
//! hardware modifier bits, so the masks have to be read from the server's
//! modifier mapping. CapsLock always occupies the fixed `LockMask` bit.
//! Discovery runs once per connection; a failed query degrades to zero
//! masks for NumLock/ScrollLock, which simply disables lock-variant
//! grab coverage instead of failing.

use tracing::{debug, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt as _, Keycode};

use super::keysyms::{self, XK_NUM_LOCK, XK_SCROLL_LOCK};

/// CapsLock's fixed modifier bit (`LockMask`)
const CAPS_LOCK_MASK: u16 = 0x02;

/// The eight modifier bit groups, indexed by mapping slot group
const MASK_TABLE: [u16; 8] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80];

/// Modifier masks of the three lock keys on the current keyboard mapping.
/// A zero mask means the keyboard has no such key (or discovery failed),
/// and every computation that combines it degenerates to a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockMasks {
    pub num: u16,
    pub caps: u16,
    pub scroll: u16,
}

impl Default for LockMasks {
    fn default() -> Self {
        LockMasks {
            num: 0,
            caps: CAPS_LOCK_MASK,
            scroll: 0,
        }
    }
}

impl LockMasks {
    /// Union of all three masks, for stripping lock bits from a state
    pub fn all(&self) -> u16 {
        self.num | self.caps | self.scroll
    }
}

/// Discover the NumLock and ScrollLock modifier masks from the server.
///
/// Never fails: any query error is logged and leaves the affected masks
/// at zero, degrading grab coverage to the exact configured modifiers.
pub fn discover<C: Connection>(conn: &C) -> LockMasks {
    let num_keycode = lock_keycode(conn, XK_NUM_LOCK);
    let scroll_keycode = lock_keycode(conn, XK_SCROLL_LOCK);

    let reply = match conn.get_modifier_mapping() {
        Ok(cookie) => cookie.reply(),
        Err(e) => Err(e.into()),
    };

    match reply {
        Ok(mapping) => {
            let masks = masks_from_mapping(
                mapping.keycodes_per_modifier(),
                &mapping.keycodes,
                num_keycode,
                scroll_keycode,
            );
            debug!(
                num = masks.num,
                caps = masks.caps,
                scroll = masks.scroll,
                "lock modifier masks discovered"
            );
            masks
        }
        Err(e) => {
            warn!(?e, "modifier mapping query failed, lock-state grab variants disabled");
            LockMasks::default()
        }
    }
}

fn lock_keycode<C: Connection>(conn: &C, keysym: u32) -> Keycode {
    match keysyms::keysym_to_keycode(conn, keysym) {
        Ok(Some(keycode)) => keycode,
        Ok(None) => 0,
        Err(e) => {
            warn!(?e, keysym, "keyboard mapping query failed");
            0
        }
    }
}

/// Scan the modifier mapping table for the lock keycodes.
///
/// The table holds `keycodes_per_modifier` keycodes for each of the eight
/// modifier bit groups; a slot whose keycode equals a lock keycode puts
/// that key on the slot's bit group. A keycode of zero marks both an
/// empty slot and an absent lock key, so zero keycodes never match.
fn masks_from_mapping(
    keycodes_per_modifier: u8,
    keycodes: &[Keycode],
    num_keycode: Keycode,
    scroll_keycode: Keycode,
) -> LockMasks {
    let mut masks = LockMasks::default();
    if keycodes_per_modifier == 0 {
        return masks;
    }

    for (slot, &keycode) in keycodes.iter().enumerate() {
        let group = slot / keycodes_per_modifier as usize;
        if group >= MASK_TABLE.len() {
            break;
        }
        if keycode == num_keycode && num_keycode != 0 {
            masks.num = MASK_TABLE[group];
        } else if keycode == scroll_keycode && scroll_keycode != 0 {
            masks.scroll = MASK_TABLE[group];
        }
    }

    masks
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUM_KC: Keycode = 77;
    const SCROLL_KC: Keycode = 78;

    fn mapping_with(num_group: usize, scroll_group: Option<usize>) -> [Keycode; 16] {
        // Two keycodes per modifier group.
        let mut table = [0u8; 16];
        table[num_group * 2] = NUM_KC;
        if let Some(group) = scroll_group {
            table[group * 2 + 1] = SCROLL_KC;
        }
        table
    }

    #[test]
    fn test_numlock_on_mod2() {
        let table = mapping_with(4, None);
        let masks = masks_from_mapping(2, &table, NUM_KC, SCROLL_KC);
        assert_eq!(masks.num, 0x10);
        assert_eq!(masks.scroll, 0);
        assert_eq!(masks.caps, 0x02);
    }

    #[test]
    fn test_both_locks_found() {
        let table = mapping_with(4, Some(5));
        let masks = masks_from_mapping(2, &table, NUM_KC, SCROLL_KC);
        assert_eq!(masks.num, 0x10);
        assert_eq!(masks.scroll, 0x20);
        assert_eq!(masks.all(), 0x32);
    }

    #[test]
    fn test_absent_lock_key_stays_zero() {
        // Keycode 0 denotes "no NumLock key"; the zero slots in the table
        // must not register a mask for it.
        let table = mapping_with(4, None);
        let masks = masks_from_mapping(2, &table, 0, SCROLL_KC);
        assert_eq!(masks.num, 0);
        assert_eq!(masks.scroll, 0);
    }

    #[test]
    fn test_empty_mapping() {
        let masks = masks_from_mapping(0, &[], NUM_KC, SCROLL_KC);
        assert_eq!(masks, LockMasks::default());
    }
}
