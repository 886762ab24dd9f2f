//! Keysym constants and keysym-to-keycode resolution
//!
//! Only the handful of symbols the daemon needs are declared here: the
//! XF86 multimedia keys used as default bindings, and the two lock keys
//! whose modifier masks must be discovered at runtime.

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt as _, Keycode, Keysym};

use super::listener::HotkeyError;

pub const XF86_AUDIO_LOWER_VOLUME: Keysym = 0x1008_ff11;
pub const XF86_AUDIO_MUTE: Keysym = 0x1008_ff12;
pub const XF86_AUDIO_RAISE_VOLUME: Keysym = 0x1008_ff13;
pub const XF86_AUDIO_PLAY: Keysym = 0x1008_ff14;
pub const XF86_AUDIO_STOP: Keysym = 0x1008_ff15;
pub const XF86_AUDIO_PREV: Keysym = 0x1008_ff16;
pub const XF86_AUDIO_NEXT: Keysym = 0x1008_ff17;
pub const XF86_AUDIO_PAUSE: Keysym = 0x1008_ff31;
pub const XF86_AUDIO_MEDIA: Keysym = 0x1008_ff32;
pub const XF86_AUDIO_REWIND: Keysym = 0x1008_ff3e;

pub const XK_NUM_LOCK: Keysym = 0xff7f;
pub const XK_SCROLL_LOCK: Keysym = 0xff14;

/// Resolve a keysym to the first keycode that produces it on the current
/// keyboard mapping, or `None` if no key does.
pub fn keysym_to_keycode<C: Connection>(
    conn: &C,
    keysym: Keysym,
) -> Result<Option<Keycode>, HotkeyError> {
    let setup = conn.setup();
    let min = setup.min_keycode;
    let count = setup.max_keycode - min + 1;
    let reply = conn.get_keyboard_mapping(min, count)?.reply()?;
    Ok(find_keycode(
        min,
        reply.keysyms_per_keycode,
        &reply.keysyms,
        keysym,
    ))
}

/// Scan a keyboard mapping table for the first keycode carrying `target`
/// in any of its keysym columns.
fn find_keycode(
    min_keycode: Keycode,
    keysyms_per_keycode: u8,
    keysyms: &[Keysym],
    target: Keysym,
) -> Option<Keycode> {
    if target == 0 || keysyms_per_keycode == 0 {
        return None;
    }
    keysyms
        .chunks(keysyms_per_keycode as usize)
        .position(|columns| columns.contains(&target))
        .map(|index| min_keycode + index as Keycode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_keycode_first_column() {
        // Two keysym columns per keycode, keycodes starting at 8.
        let keysyms = [
            0x61, 0x41, // keycode 8: a / A
            XF86_AUDIO_MUTE, 0, // keycode 9
            0x62, 0x42, // keycode 10: b / B
        ];
        assert_eq!(find_keycode(8, 2, &keysyms, XF86_AUDIO_MUTE), Some(9));
    }

    #[test]
    fn test_find_keycode_shifted_column() {
        let keysyms = [0x61, XK_NUM_LOCK, 0x62, 0x42];
        assert_eq!(find_keycode(8, 2, &keysyms, XK_NUM_LOCK), Some(8));
    }

    #[test]
    fn test_find_keycode_absent() {
        let keysyms = [0x61, 0x41, 0x62, 0x42];
        assert_eq!(find_keycode(8, 2, &keysyms, XF86_AUDIO_PLAY), None);
    }

    #[test]
    fn test_find_keycode_never_matches_empty_slots() {
        // Unfilled mapping slots hold keysym 0; looking up 0 must not
        // resolve to a keycode.
        let keysyms = [0, 0, 0x61, 0x41];
        assert_eq!(find_keycode(8, 2, &keysyms, 0), None);
    }
}
