//! Stateful scancode decoder.
//!
//! Consumes raw scancode bytes (release flag in bit 7, key code in bits 0–6)
//! and produces at most one [`DecodedUnit`] per byte: either a literal
//! character or a named token such as `<SHIFT>` or `<ESC>`.
//!
//! Per-byte processing order:
//!
//! 1. Shift / ctrl / alt update their *momentary* flag on both edges but emit
//!    a token on press only.
//! 2. Caps lock is *latched*: press toggles the flag and emits
//!    `<CAPS_ON>` / `<CAPS_OFF>` for the new state, release is ignored.
//! 3. Every other release emits nothing.
//! 4. Escape emits `<ESC>`.
//! 5. Everything else goes through the [`keymap`](crate::keymap) tables.
//!    When shift is held the shifted table is consulted first, falling back
//!    to the base table for codes (letters) it does not cover. Letters are
//!    upper-cased when exactly one of shift and caps is active — both
//!    together cancel back to lowercase.
//!
//! Only a literal printable character counts toward keystroke statistics.
//! Backspace is emitted (so a consumer can erase its display buffer) but is
//! never counted, and no token is ever counted.

use std::fmt;

use tracing::trace;

use crate::keymap;

/// The current modifier key state maintained across press/release bytes.
///
/// `shift`, `ctrl`, and `alt` are momentary (true only while held);
/// `caps` is latched (toggled on each caps-lock press).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ModifierState {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub caps: bool,
}

/// A named non-character decoder output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Shift,
    Ctrl,
    Alt,
    CapsOn,
    CapsOff,
    Esc,
}

impl Token {
    /// The rendered form of the token, as it appears in a transcript.
    pub const fn as_str(self) -> &'static str {
        match self {
            Token::Shift => "<SHIFT>",
            Token::Ctrl => "<CTRL>",
            Token::Alt => "<ALT>",
            Token::CapsOn => "<CAPS_ON>",
            Token::CapsOff => "<CAPS_OFF>",
            Token::Esc => "<ESC>",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded keystroke: a literal character or a named token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedUnit {
    /// A literal character byte (letter, digit, punctuation, `\n`, `\t`,
    /// space, or `\x08` backspace).
    Char(char),
    /// A named modifier/special token.
    Token(Token),
}

impl DecodedUnit {
    /// Whether this unit counts toward printed-character statistics.
    ///
    /// True only for a literal character that is not backspace; tokens are
    /// never counted.
    pub fn counted(&self) -> bool {
        matches!(self, DecodedUnit::Char(c) if *c != '\x08')
    }

    /// Appends the rendered form of this unit to `out`.
    pub fn push_onto(&self, out: &mut String) {
        match self {
            DecodedUnit::Char(c) => out.push(*c),
            DecodedUnit::Token(t) => out.push_str(t.as_str()),
        }
    }
}

impl fmt::Display for DecodedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedUnit::Char(c) => write!(f, "{c}"),
            DecodedUnit::Token(t) => f.write_str(t.as_str()),
        }
    }
}

/// The decoding state machine.
///
/// One decoder instance corresponds to one decoding session; it is
/// independent of the buffer/source lifetime and can be [`reset`] at any
/// time.
///
/// [`reset`]: ScancodeDecoder::reset
#[derive(Debug, Default)]
pub struct ScancodeDecoder {
    modifiers: ModifierState,
}

impl ScancodeDecoder {
    /// Creates a decoder with all modifiers clear.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current modifier state.
    pub fn modifiers(&self) -> ModifierState {
        self.modifiers
    }

    /// Clears all modifier state, including the caps latch.
    pub fn reset(&mut self) {
        self.modifiers = ModifierState::default();
    }

    /// Decodes one raw scancode byte.
    ///
    /// Returns `None` for releases of non-modifier keys, caps-lock releases,
    /// and unmapped codes. At most one unit is produced per input byte.
    pub fn decode(&mut self, raw: u8) -> Option<DecodedUnit> {
        let release = keymap::is_release(raw);
        let code = keymap::key_code(raw);

        match code {
            keymap::SC_LEFT_SHIFT | keymap::SC_RIGHT_SHIFT => {
                self.modifiers.shift = !release;
                trace!(shift = self.modifiers.shift, "shift edge");
                return (!release).then_some(DecodedUnit::Token(Token::Shift));
            }
            keymap::SC_CTRL => {
                self.modifiers.ctrl = !release;
                trace!(ctrl = self.modifiers.ctrl, "ctrl edge");
                return (!release).then_some(DecodedUnit::Token(Token::Ctrl));
            }
            keymap::SC_ALT => {
                self.modifiers.alt = !release;
                trace!(alt = self.modifiers.alt, "alt edge");
                return (!release).then_some(DecodedUnit::Token(Token::Alt));
            }
            keymap::SC_CAPS_LOCK => {
                if release {
                    return None;
                }
                self.modifiers.caps = !self.modifiers.caps;
                trace!(caps = self.modifiers.caps, "caps toggled");
                let token = if self.modifiers.caps {
                    Token::CapsOn
                } else {
                    Token::CapsOff
                };
                return Some(DecodedUnit::Token(token));
            }
            _ => {}
        }

        // Remaining keys act on press only.
        if release {
            return None;
        }

        if code == keymap::SC_ESC {
            return Some(DecodedUnit::Token(Token::Esc));
        }

        let ch = if self.modifiers.shift {
            keymap::shifted_char(code).or_else(|| keymap::base_char(code))
        } else {
            keymap::base_char(code)
        }?;

        // Exactly one of shift/caps upper-cases a letter; both cancel.
        let ch = if ch.is_ascii_lowercase() && (self.modifiers.shift ^ self.modifiers.caps) {
            ch.to_ascii_uppercase()
        } else {
            ch
        };

        Some(DecodedUnit::Char(ch as char))
    }

    /// Decodes one raw byte into a caller-supplied buffer.
    ///
    /// Writes the rendered unit (truncated to `out.len()` if it does not
    /// fit) and returns `(bytes_written, counted_characters)`, where
    /// `counted_characters` is 1 only when a countable character byte was
    /// actually written. At most one character or token is produced per
    /// input byte, so the counted value is always 0 or 1.
    pub fn decode_into(&mut self, raw: u8, out: &mut [u8]) -> (usize, usize) {
        let Some(unit) = self.decode(raw) else {
            return (0, 0);
        };

        let ch_byte;
        let text: &[u8] = match &unit {
            DecodedUnit::Char(c) => {
                ch_byte = [*c as u8];
                &ch_byte
            }
            DecodedUnit::Token(t) => t.as_str().as_bytes(),
        };

        let written = text.len().min(out.len());
        out[..written].copy_from_slice(&text[..written]);

        let counted = usize::from(unit.counted() && written > 0);
        (written, counted)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
