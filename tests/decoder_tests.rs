//! Integration tests for the input decoder
//!
//! These tests drive the decoder through the public API with realistic byte
//! streams: pasted text, escape sequences split across reads, and adversarial
//! chunking produced by proptest.

use std::time::{Duration, Instant};

use ansikey::{Decoder, InputEvent, Modifiers, SpecialKey};

use proptest::prelude::*;

/// Feed bytes one at a time, as a slow serial line would deliver them.
fn feed_bytewise(decoder: &mut Decoder, bytes: &[u8]) -> Vec<InputEvent> {
    let mut events = Vec::new();
    for byte in bytes {
        events.extend(decoder.feed(&[*byte]));
    }
    events
}

fn keypress(text: &str) -> InputEvent {
    InputEvent::Keypress(text.to_string())
}

fn special(key: SpecialKey) -> InputEvent {
    InputEvent::Special {
        key,
        mods: Modifiers::default(),
    }
}

// ============================================================================
// Plain text
// ============================================================================

#[test]
fn test_pasted_ascii_line() {
    let mut decoder = Decoder::new();
    let events = decoder.feed(b"ls -la\r");
    let expected: Vec<InputEvent> = "ls -la\r".chars().map(|c| keypress(&c.to_string())).collect();
    assert_eq!(events, expected);
}

#[test]
fn test_utf8_text_reassembled() {
    let mut decoder = Decoder::new();
    let events = decoder.feed("héllo wörld…".as_bytes());
    let text: String = events
        .iter()
        .map(|e| match e {
            InputEvent::Keypress(t) => t.as_str(),
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(text, "héllo wörld…");
}

#[test]
fn test_utf8_split_across_reads() {
    let mut decoder = Decoder::new();
    let bytes = "日".as_bytes();
    assert!(decoder.feed(&bytes[..1]).is_empty());
    assert!(decoder.feed(&bytes[1..2]).is_empty());
    assert_eq!(decoder.feed(&bytes[2..]), vec![keypress("日")]);
}

// ============================================================================
// Escape sequences
// ============================================================================

#[test]
fn test_arrow_keys() {
    let mut decoder = Decoder::new();
    let events = decoder.feed(b"\x1b[A\x1b[B\x1b[C\x1b[D");
    assert_eq!(
        events,
        vec![
            special(SpecialKey::Up),
            special(SpecialKey::Down),
            special(SpecialKey::Right),
            special(SpecialKey::Left),
        ]
    );
}

#[test]
fn test_modified_arrow() {
    let mut decoder = Decoder::new();
    let events = decoder.feed(b"\x1b[1;5C");
    assert_eq!(
        events,
        vec![InputEvent::Special {
            key: SpecialKey::Right,
            mods: Modifiers {
                control: true,
                ..Default::default()
            },
        }]
    );
}

#[test]
fn test_function_keys_tilde_coded() {
    let mut decoder = Decoder::new();
    let events = decoder.feed(b"\x1b[11~\x1b[24~");
    assert_eq!(events, vec![special(SpecialKey::F1), special(SpecialKey::F12)]);
}

#[test]
fn test_ss3_function_keys() {
    let mut decoder = Decoder::new();
    let events = decoder.feed(b"\x1bOP\x1bOS");
    assert_eq!(events, vec![special(SpecialKey::F1), special(SpecialKey::F4)]);
}

#[test]
fn test_sequence_split_across_reads() {
    let mut decoder = Decoder::new();
    assert!(decoder.feed(b"\x1b").is_empty());
    assert!(decoder.feed(b"[").is_empty());
    assert!(decoder.feed(b"1;2").is_empty());
    let events = decoder.feed(b"H");
    assert_eq!(
        events,
        vec![InputEvent::Special {
            key: SpecialKey::Home,
            mods: Modifiers {
                shift: true,
                ..Default::default()
            },
        }]
    );
}

#[test]
fn test_cursor_position_report() {
    let mut decoder = Decoder::new();
    let events = decoder.feed(b"\x1b[12;40R");
    assert_eq!(
        events,
        vec![InputEvent::Position {
            row: "12".to_string(),
            col: "40".to_string(),
        }]
    );
}

#[test]
fn test_device_status_report() {
    let mut decoder = Decoder::new();
    assert_eq!(decoder.feed(b"\x1b[0n"), vec![InputEvent::Status("0".to_string())]);
}

#[test]
fn test_interrupt_between_sequences() {
    let mut decoder = Decoder::new();
    let events = decoder.feed(b"a\x03\x1b[A");
    assert_eq!(
        events,
        vec![keypress("a"), InputEvent::Interrupt, special(SpecialKey::Up)]
    );
}

#[test]
fn test_unknown_key_code_is_recoverable() {
    let mut decoder = Decoder::new();
    let events = decoder.feed(b"\x1b[99~\x1b[A");
    assert_eq!(
        events,
        vec![
            InputEvent::Unrecognized("99".to_string()),
            special(SpecialKey::Up),
        ]
    );
}

// ============================================================================
// Escape disambiguation timeout
// ============================================================================

#[test]
fn test_bare_escape_times_out_to_escape_key() {
    let mut decoder = Decoder::new();
    assert!(decoder.feed(b"\x1b").is_empty());
    let deadline = decoder.deadline().expect("timer must be armed");

    let mut events = Vec::new();
    // Before the deadline nothing fires
    assert!(!decoder.poll_timeout(deadline - Duration::from_millis(1), &mut events));
    assert!(events.is_empty());

    assert!(decoder.poll_timeout(deadline, &mut events));
    assert_eq!(events, vec![special(SpecialKey::Escape)]);
    assert!(decoder.deadline().is_none());
}

#[test]
fn test_following_byte_cancels_timeout() {
    let mut decoder = Decoder::new();
    decoder.feed(b"\x1b");
    let events = decoder.feed(b"[A");
    assert_eq!(events, vec![special(SpecialKey::Up)]);
    assert!(decoder.deadline().is_none());

    let mut out = Vec::new();
    assert!(!decoder.poll_timeout(Instant::now() + Duration::from_secs(1), &mut out));
    assert!(out.is_empty());
}

// ============================================================================
// Malformed input
// ============================================================================

#[test]
fn test_truncated_utf8_dumped_and_rescanned() {
    let mut decoder = Decoder::new();
    // 0xE4 promises two continuation bytes but an arrow sequence interrupts
    let events = decoder.feed(b"\xe4\x1b[A");
    assert_eq!(events, vec![keypress("ä"), special(SpecialKey::Up)]);
}

#[test]
fn test_invalid_continuation_dumps_each_byte() {
    let mut decoder = Decoder::new();
    // Lead byte, one valid continuation, then a plain letter
    let events = decoder.feed(b"\xe4\xb8A");
    assert_eq!(events, vec![keypress("ä"), keypress("¸"), keypress("A")]);
}

#[test]
fn test_dump_across_feed_boundary() {
    let mut decoder = Decoder::new();
    assert!(decoder.feed(b"\xf0\x9f").is_empty());
    let events = decoder.feed(b"x");
    assert_eq!(events, vec![keypress("ð"), keypress("\u{9f}"), keypress("x")]);
}

#[test]
fn test_oversized_parameter_sequence_survives() {
    let mut decoder = Decoder::new();
    let mut input = b"\x1b[".to_vec();
    input.extend(std::iter::repeat(b'9').take(200));
    input.push(b'~');
    // Excess parameter bytes are dropped; the sequence still terminates and
    // decoding continues
    let events = decoder.feed(&input);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], InputEvent::Unrecognized(_)));
    assert_eq!(decoder.feed(b"a"), vec![keypress("a")]);
}

#[test]
fn test_unknown_escape_follower_is_literal() {
    let mut decoder = Decoder::new();
    let events = decoder.feed(b"\x1bZ");
    assert_eq!(events, vec![keypress("Z")]);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Chunking never changes the decoded events.
    #[test]
    fn prop_chunking_is_invisible(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let mut batch = Decoder::new();
        let mut serial = Decoder::new();

        let batched = batch.feed(&bytes);
        let bytewise = feed_bytewise(&mut serial, &bytes);

        prop_assert_eq!(batched, bytewise);
    }

    /// Every ASCII byte except ^C and ESC decodes to exactly one keypress.
    #[test]
    fn prop_plain_ascii_is_one_keypress(byte in 0u8..0x80) {
        prop_assume!(byte != 0x03 && byte != 0x1b);
        let mut decoder = Decoder::new();
        let events = decoder.feed(&[byte]);
        prop_assert_eq!(events.len(), 1);
        prop_assert!(events[0].is_keypress());
    }

    /// Valid UTF-8 text passes through losslessly as keypresses.
    #[test]
    fn prop_utf8_text_lossless(text in "\\PC{0,40}") {
        prop_assume!(!text.contains('\u{1b}') && !text.contains('\u{03}'));
        let mut decoder = Decoder::new();
        let events = decoder.feed(text.as_bytes());
        let mut reassembled = String::new();
        for event in &events {
            match event {
                InputEvent::Keypress(t) => reassembled.push_str(t),
                other => prop_assert!(false, "unexpected event {:?}", other),
            }
        }
        prop_assert_eq!(reassembled, text);
    }

    /// The decoder never panics and always drains what it was fed.
    #[test]
    fn prop_arbitrary_bytes_never_wedge(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut decoder = Decoder::new();
        let _ = decoder.feed(&bytes);
        prop_assert_eq!(decoder.pending_bytes(), 0);
    }
}
