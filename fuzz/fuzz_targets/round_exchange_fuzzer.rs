//! Fuzz target for [`RoundExchange`] state machine
//!
//! Prevent double scoring and stuck rounds under arbitrary radio traffic
//!
//! # Strategy
//!
//! - Event sequences: Arbitrary received buffers and clock ticks
//! - Valid frames: Moves and acks for the current, previous and next round
//! - Garbage: Random bytes of any length
//! - Timeout testing: Advance time past the resend interval
//!
//! # Invariants
//!
//! - `Resolved` is emitted at most once per round
//! - The resolution NEVER changes once set
//! - Complete implies acknowledged and resolved
//! - Every valid move for the round is answered with exactly one ack
//! - Every transmitted frame is a move or ack frame for a round 1-9
//! - No resend after the ack arrived
//! - Resends only ever repeat the own move frame
//! - NEVER panic on any input

#![no_main]

use std::{ops::Sub, time::Duration};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parley_core::{ExchangeConfig, RoundAction, RoundExchange};
use parley_proto::{decode, Decoded, Frame, Move, RoundNumber};

/// Represents time as Duration since epoch 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct FuzzInstant(Duration);

impl Sub for FuzzInstant {
    type Output = Duration;

    fn sub(self, other: Self) -> Duration {
        self.0.saturating_sub(other.0)
    }
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum FuzzMove {
    Rock,
    Paper,
    Scissors,
}

impl From<FuzzMove> for Move {
    fn from(mv: FuzzMove) -> Self {
        match mv {
            FuzzMove::Rock => Move::Rock,
            FuzzMove::Paper => Move::Paper,
            FuzzMove::Scissors => Move::Scissors,
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum ExchangeEvent {
    /// Move frame, round offset -1, 0 or +1 from the exchange.
    MoveFrame { mv: FuzzMove, offset: u8 },
    AckFrame { offset: u8 },
    RandomBytes(Vec<u8>),
    Tick { advance_ms: u16 },
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzInput {
    round: u8,
    own: FuzzMove,
    reack_previous_round: bool,
    events: Vec<ExchangeEvent>,
}

fn shifted(round: RoundNumber, offset: u8) -> RoundNumber {
    let shifted = match offset % 3 {
        0 => round.previous(),
        1 => Some(round),
        _ => round.next().ok(),
    };
    shifted.unwrap_or(round)
}

fuzz_target!(|input: FuzzInput| {
    let round = RoundNumber::new(input.round % 9 + 1).unwrap_or(RoundNumber::FIRST);
    let config =
        ExchangeConfig { reack_previous_round: input.reack_previous_round, ..ExchangeConfig::default() };

    let mut now = FuzzInstant(Duration::ZERO);
    let (mut exchange, opened) = RoundExchange::open(round, input.own.into(), config, now);
    assert_eq!(opened, vec![RoundAction::Transmit(exchange.move_frame())]);

    let mut resolutions = 0;
    let mut first_resolution = None;

    for event in input.events {
        let was_acknowledged = exchange.is_acknowledged();

        let (raw, is_tick) = match event {
            ExchangeEvent::MoveFrame { mv, offset } => {
                (Frame::for_move(mv.into(), shifted(round, offset)).as_wire().to_vec(), false)
            },
            ExchangeEvent::AckFrame { offset } => {
                (Frame::ack(shifted(round, offset)).as_wire().to_vec(), false)
            },
            ExchangeEvent::RandomBytes(bytes) => (bytes, false),
            ExchangeEvent::Tick { advance_ms } => {
                now = FuzzInstant(now.0 + Duration::from_millis(u64::from(advance_ms)));
                (Vec::new(), true)
            },
        };

        let actions =
            if is_tick { exchange.handle_tick(now) } else { exchange.handle_frame(&raw) };

        let mut acks = 0;
        for action in &actions {
            match action {
                RoundAction::Transmit(frame) => {
                    assert!(frame.kind().is_ok() && frame.round().is_ok(), "bad frame {frame:?}");
                    if is_tick {
                        assert!(!was_acknowledged, "resend after ack");
                        assert_eq!(*frame, exchange.move_frame(), "resend must repeat own move");
                    } else if frame.kind() == Ok(parley_proto::FrameKind::Ack) {
                        acks += 1;
                    }
                },
                RoundAction::Resolved(resolution) => {
                    resolutions += 1;
                    first_resolution = Some(*resolution);
                },
            }
        }

        if !is_tick && matches!(decode(&raw, round), Decoded::ValidMove(_)) {
            assert_eq!(acks, 1, "valid move must be acked exactly once");
        }

        assert!(resolutions <= 1, "resolved twice");
        assert_eq!(exchange.resolution(), first_resolution, "resolution changed");
        if exchange.is_complete() {
            assert!(exchange.is_acknowledged() && exchange.resolution().is_some());
        }
    }
});
