//! # keytap-core
//!
//! Shared library for keytap containing the scancode translation tables and
//! the keystroke decoding state machine.
//!
//! This crate is used by both the capture subsystem and the monitor
//! application. It has zero dependencies on OS APIs, device files, or
//! threads — it consumes raw scancode bytes and produces decoded units.
//!
//! - **`keymap`** – Translation tables mapping 7-bit set-1 scancodes to the
//!   characters they produce, with and without shift.
//!
//! - **`decoder`** – The stateful decoder: tracks shift/ctrl/alt/caps across
//!   a byte stream and turns each press into a literal character or a named
//!   token such as `<SHIFT>` or `<ESC>`.

pub mod decoder;
pub mod keymap;

// Re-export the most-used types at the crate root so callers can write
// `keytap_core::ScancodeDecoder` instead of the full module path.
pub use decoder::{DecodedUnit, ModifierState, ScancodeDecoder, Token};
