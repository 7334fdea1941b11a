//! Set-1 scancode translation tables.
//!
//! A raw scancode byte carries the key identity in bits 0–6 and the release
//! flag in bit 7. The tables below cover the main block of a US keyboard:
//! letters, digits, punctuation, and the whitespace/editing keys that produce
//! a literal byte. Modifier keys (shift, ctrl, alt, caps lock) and escape are
//! not in the tables — the decoder handles those before any table lookup.
//!
//! Letters map to their *lowercase* form; the decoder applies the
//! shift-XOR-caps case fold afterwards. The shifted table only contains codes
//! whose shifted output differs from a case change (digit row punctuation,
//! brackets, and friends), which is why the decoder falls back to the base
//! table when a code has no shifted entry.

/// Bit 7 of a raw scancode: set on key release, clear on key press.
pub const RELEASE_FLAG: u8 = 0x80;

/// Mask extracting the 7-bit key code from a raw scancode byte.
pub const CODE_MASK: u8 = 0x7F;

/// Escape.
pub const SC_ESC: u8 = 0x01;
/// Backspace (produces a literal `\b` that is never counted).
pub const SC_BACKSPACE: u8 = 0x0E;
/// Left shift.
pub const SC_LEFT_SHIFT: u8 = 0x2A;
/// Right shift.
pub const SC_RIGHT_SHIFT: u8 = 0x36;
/// Left control.
pub const SC_CTRL: u8 = 0x1D;
/// Left alt.
pub const SC_ALT: u8 = 0x38;
/// Caps lock.
pub const SC_CAPS_LOCK: u8 = 0x3A;

/// Returns `true` when the raw byte has the release flag set.
pub const fn is_release(raw: u8) -> bool {
    raw & RELEASE_FLAG != 0
}

/// Strips the release flag, leaving the 7-bit key code.
pub const fn key_code(raw: u8) -> u8 {
    raw & CODE_MASK
}

/// Translates a 7-bit key code to its unshifted character.
///
/// Returns `None` for codes with no printable mapping (modifiers, function
/// keys, and unused code points).
pub fn base_char(code: u8) -> Option<u8> {
    match code {
        // Digit row
        0x02 => Some(b'1'),
        0x03 => Some(b'2'),
        0x04 => Some(b'3'),
        0x05 => Some(b'4'),
        0x06 => Some(b'5'),
        0x07 => Some(b'6'),
        0x08 => Some(b'7'),
        0x09 => Some(b'8'),
        0x0A => Some(b'9'),
        0x0B => Some(b'0'),
        0x0C => Some(b'-'),
        0x0D => Some(b'='),
        0x0E => Some(b'\x08'), // backspace
        0x0F => Some(b'\t'),

        // Top letter row
        0x10 => Some(b'q'),
        0x11 => Some(b'w'),
        0x12 => Some(b'e'),
        0x13 => Some(b'r'),
        0x14 => Some(b't'),
        0x15 => Some(b'y'),
        0x16 => Some(b'u'),
        0x17 => Some(b'i'),
        0x18 => Some(b'o'),
        0x19 => Some(b'p'),
        0x1A => Some(b'['),
        0x1B => Some(b']'),
        0x1C => Some(b'\n'), // enter

        // Home row
        0x1E => Some(b'a'),
        0x1F => Some(b's'),
        0x20 => Some(b'd'),
        0x21 => Some(b'f'),
        0x22 => Some(b'g'),
        0x23 => Some(b'h'),
        0x24 => Some(b'j'),
        0x25 => Some(b'k'),
        0x26 => Some(b'l'),
        0x27 => Some(b';'),
        0x28 => Some(b'\''),
        0x29 => Some(b'`'),
        0x2B => Some(b'\\'),

        // Bottom row
        0x2C => Some(b'z'),
        0x2D => Some(b'x'),
        0x2E => Some(b'c'),
        0x2F => Some(b'v'),
        0x30 => Some(b'b'),
        0x31 => Some(b'n'),
        0x32 => Some(b'm'),
        0x33 => Some(b','),
        0x34 => Some(b'.'),
        0x35 => Some(b'/'),

        0x39 => Some(b' '), // space

        _ => None,
    }
}

/// Translates a 7-bit key code to its shifted character.
///
/// Only codes whose shifted output is *not* a plain case change appear here
/// (the digit row and punctuation). Letter codes return `None`: the decoder
/// handles letter case via the shift-XOR-caps fold on the base character.
pub fn shifted_char(code: u8) -> Option<u8> {
    match code {
        0x02 => Some(b'!'),
        0x03 => Some(b'@'),
        0x04 => Some(b'#'),
        0x05 => Some(b'$'),
        0x06 => Some(b'%'),
        0x07 => Some(b'^'),
        0x08 => Some(b'&'),
        0x09 => Some(b'*'),
        0x0A => Some(b'('),
        0x0B => Some(b')'),
        0x0C => Some(b'_'),
        0x0D => Some(b'+'),
        0x1A => Some(b'{'),
        0x1B => Some(b'}'),
        0x27 => Some(b':'),
        0x28 => Some(b'"'),
        0x29 => Some(b'~'),
        0x2B => Some(b'|'),
        0x33 => Some(b'<'),
        0x34 => Some(b'>'),
        0x35 => Some(b'?'),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
