//! Two-byte frames and the codec.
//!
//! # Invariants
//!
//! - A frame on the wire is exactly [`Frame::SIZE`] bytes
//! - Byte 0 is `R`, `P`, `S` or [`ACK_MARKER`]
//! - Byte 1 is the ASCII digit of the round, `'1'..='9'`
//!
//! [`Frame`] itself may hold arbitrary bytes because it is read straight off
//! the medium. Classification happens in [`decode`], which is the only place
//! that decides whether a frame is acted upon.

use std::fmt;

use thiserror::Error;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::{
    error::FrameError,
    moves::{Move, RoundNumber},
};

/// Symbol byte of an acknowledgement frame.
pub const ACK_MARKER: u8 = b'X';

/// What a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// The sender's move for the round.
    Move(Move),
    /// Receipt of the peer's move for the round.
    Ack,
}

impl FrameKind {
    /// Wire symbol for this kind.
    pub const fn symbol(self) -> u8 {
        match self {
            Self::Move(mv) => mv.symbol(),
            Self::Ack => ACK_MARKER,
        }
    }

    /// Kind for a wire symbol.
    pub const fn from_symbol(symbol: u8) -> Result<Self, FrameError> {
        if symbol == ACK_MARKER {
            return Ok(Self::Ack);
        }
        match Move::from_symbol(symbol) {
            Some(mv) => Ok(Self::Move(mv)),
            None => Err(FrameError::UnknownSymbol { symbol }),
        }
    }
}

/// Wire frame: symbol byte followed by round digit.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned,
)]
#[repr(C)]
pub struct Frame {
    symbol: u8,
    round: u8,
}

impl Frame {
    /// Size of every frame in bytes.
    pub const SIZE: usize = 2;

    /// Encode a frame of the given kind for a round.
    pub const fn encode(kind: FrameKind, round: RoundNumber) -> Self {
        Self { symbol: kind.symbol(), round: round.digit() }
    }

    /// Move frame for a round.
    pub const fn for_move(mv: Move, round: RoundNumber) -> Self {
        Self::encode(FrameKind::Move(mv), round)
    }

    /// Acknowledgement frame for a round.
    pub const fn ack(round: RoundNumber) -> Self {
        Self::encode(FrameKind::Ack, round)
    }

    /// Read a frame from raw bytes, checking only the length.
    pub fn parse(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.is_empty() {
            return Err(FrameError::Empty);
        }
        Self::read_from_bytes(bytes).map_err(|_| FrameError::Length { actual: bytes.len() })
    }

    /// Classify the symbol byte.
    pub const fn kind(&self) -> Result<FrameKind, FrameError> {
        FrameKind::from_symbol(self.symbol)
    }

    /// Round carried in the digit byte.
    pub const fn round(&self) -> Result<RoundNumber, FrameError> {
        RoundNumber::from_digit(self.round)
    }

    /// The two bytes as sent on the air.
    pub fn as_wire(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame(\"{}{}\")", self.symbol.escape_ascii(), self.round.escape_ascii())
    }
}

/// Result of decoding a received buffer against the awaited round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A move for the awaited round. The receiver must acknowledge it.
    ValidMove(Move),
    /// An acknowledgement for the awaited round.
    ValidAck,
    /// Anything else. Dropped without affecting round state.
    Rejected(Rejection),
}

/// Why a buffer was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Wrong length or unrecognized content.
    #[error("malformed frame: {0}")]
    Malformed(#[from] FrameError),

    /// Well-formed round digit for a round other than the awaited one.
    #[error("stale frame: awaiting round {expected}, got round {actual}")]
    Stale {
        /// Round currently awaited.
        expected: RoundNumber,
        /// Round carried by the frame.
        actual: RoundNumber,
        /// Frame kind, `None` if the symbol was also unrecognized.
        kind: Option<FrameKind>,
    },
}

/// Decode a received buffer for the awaited round.
///
/// Checks run in wire order: length, round digit, then symbol. Nothing here
/// fails loudly; every problem becomes [`Decoded::Rejected`].
pub fn decode(raw: &[u8], expected: RoundNumber) -> Decoded {
    let frame = match Frame::parse(raw) {
        Ok(frame) => frame,
        Err(e) => return Decoded::Rejected(e.into()),
    };

    if frame.round != expected.digit() {
        let rejection = match frame.round() {
            Ok(actual) => Rejection::Stale { expected, actual, kind: frame.kind().ok() },
            Err(e) => Rejection::Malformed(e),
        };
        return Decoded::Rejected(rejection);
    }

    match frame.kind() {
        Ok(FrameKind::Move(mv)) => Decoded::ValidMove(mv),
        Ok(FrameKind::Ack) => Decoded::ValidAck,
        Err(e) => Decoded::Rejected(e.into()),
    }
}
