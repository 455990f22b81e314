//! Fuzz target for the frame codec
//!
//! # Invariants
//!
//! - `decode` NEVER panics, whatever the length or content
//! - Only exactly two bytes can be accepted
//! - An accepted frame re-encodes to the identical bytes
//! - A frame is only accepted for the round its digit names

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parley_proto::{decode, Decoded, Frame, FrameKind, RoundNumber};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    expected_round: u8,
    raw: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let expected = match RoundNumber::new(input.expected_round % 10) {
        Ok(round) => round,
        Err(_) => RoundNumber::FIRST,
    };

    let kind = match decode(&input.raw, expected) {
        Decoded::ValidMove(mv) => FrameKind::Move(mv),
        Decoded::ValidAck => FrameKind::Ack,
        Decoded::Rejected(_) => return,
    };

    assert_eq!(input.raw.len(), Frame::SIZE, "accepted {:?}", input.raw);
    assert_eq!(input.raw[1], expected.digit(), "accepted a frame for another round");
    assert_eq!(Frame::encode(kind, expected).as_wire(), &input.raw[..]);
});
