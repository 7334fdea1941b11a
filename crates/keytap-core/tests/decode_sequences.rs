//! Integration tests for the keytap-core decoder.
//!
//! These tests drive whole typing sequences through the public API,
//! exercising the keymap tables, modifier tracking, and counting rules
//! together the way the monitor consumes them.

use keytap_core::{DecodedUnit, ScancodeDecoder, Token};

/// Runs a raw byte sequence through a fresh decoder and collects the
/// rendered output plus the total counted characters.
fn run(sequence: &[u8]) -> (String, usize) {
    let mut decoder = ScancodeDecoder::new();
    let mut rendered = String::new();
    let mut counted = 0;

    for &raw in sequence {
        if let Some(unit) = decoder.decode(raw) {
            unit.push_onto(&mut rendered);
            counted += usize::from(unit.counted());
        }
    }

    (rendered, counted)
}

#[test]
fn test_demo_sequence_decodes_to_hello_world() {
    // The synthetic source's fixed cycle.
    let sequence = [
        0x23, 0x12, 0x26, 0x26, 0x18, 0x39, 0x11, 0x18, 0x13, 0x26, 0x20, 0x39, 0x02, 0x03,
        0x04, 0x1C,
    ];

    let (rendered, counted) = run(&sequence);

    assert_eq!(rendered, "hello world 123\n");
    assert_eq!(counted, 16);
}

#[test]
fn test_shifted_sentence_with_releases() {
    // Shift down, 'h' (→ 'H'), shift up, 'i', '1', shift down, '1' (→ '!').
    let sequence = [0x2A, 0x23, 0xAA, 0x17, 0x02, 0x2A, 0x02];

    let (rendered, counted) = run(&sequence);

    assert_eq!(rendered, "<SHIFT>Hi1<SHIFT>!");
    // Tokens are not counted; the four literal characters are.
    assert_eq!(counted, 4);
}

#[test]
fn test_caps_session_with_interleaved_shift() {
    let sequence = [
        0x3A, // caps on
        0x1E, // 'A'
        0x2A, // shift down
        0x1F, // shift+caps cancel → 's'
        0xAA, // shift up
        0x20, // 'D'
        0x3A, // caps off
        0x21, // 'f'
    ];

    let (rendered, counted) = run(&sequence);

    assert_eq!(rendered, "<CAPS_ON>A<SHIFT>sD<CAPS_OFF>f");
    assert_eq!(counted, 4);
}

#[test]
fn test_backspace_appears_in_stream_but_not_in_count() {
    // "ab", backspace, "c"
    let sequence = [0x1E, 0x30, 0x0E, 0x2E];

    let (rendered, counted) = run(&sequence);

    assert_eq!(rendered, "ab\x08c");
    assert_eq!(counted, 3, "backspace must not count");
}

#[test]
fn test_control_and_escape_tokens_are_uncounted() {
    let sequence = [0x1D, 0x9D, 0x38, 0xB8, 0x01];

    let (rendered, counted) = run(&sequence);

    assert_eq!(rendered, "<CTRL><ALT><ESC>");
    assert_eq!(counted, 0);
}

#[test]
fn test_releases_and_unmapped_codes_are_silent() {
    // Releases of mapped keys, an unmapped press, and an unmapped release.
    let sequence = [0x9E, 0xB9, 0x7F, 0xFF];

    let (rendered, counted) = run(&sequence);

    assert!(rendered.is_empty());
    assert_eq!(counted, 0);
}

#[test]
fn test_modifier_state_survives_across_silent_bytes() {
    let mut decoder = ScancodeDecoder::new();
    decoder.decode(0x2A); // shift down
    decoder.decode(0xFF); // silent
    decoder.decode(0x9E); // silent release

    let unit = decoder.decode(0x1E).expect("press must emit");

    assert_eq!(unit, DecodedUnit::Char('A'));
}

#[test]
fn test_token_rendering_matches_display_strings() {
    for (token, expected) in [
        (Token::Shift, "<SHIFT>"),
        (Token::Ctrl, "<CTRL>"),
        (Token::Alt, "<ALT>"),
        (Token::CapsOn, "<CAPS_ON>"),
        (Token::CapsOff, "<CAPS_OFF>"),
        (Token::Esc, "<ESC>"),
    ] {
        assert_eq!(token.as_str(), expected);
        assert_eq!(token.to_string(), expected);
    }
}

#[test]
fn test_decode_into_matches_decode_over_a_sequence() {
    let sequence = [0x2A, 0x23, 0xAA, 0x17, 0x0E, 0x01, 0x9E];

    let mut by_unit = ScancodeDecoder::new();
    let mut by_buffer = ScancodeDecoder::new();

    for &raw in &sequence {
        let mut out = [0u8; 32];
        let (written, counted) = by_buffer.decode_into(raw, &mut out);

        match by_unit.decode(raw) {
            Some(unit) => {
                assert_eq!(
                    String::from_utf8_lossy(&out[..written]),
                    unit.to_string(),
                    "buffer form must render identically for byte {raw:#04X}"
                );
                assert_eq!(counted, usize::from(unit.counted()));
            }
            None => assert_eq!((written, counted), (0, 0)),
        }
    }
}
