//! Protocol error types.

use thiserror::Error;

/// Errors from parsing a [`ParticipantId`](crate::ParticipantId).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// Input was not exactly two characters long.
    #[error("participant id must be 2 hex digits, got {len} characters")]
    Length {
        /// Number of characters supplied.
        len: usize,
    },

    /// Input contained a character outside `0-9a-fA-F`.
    #[error("participant id contains non-hex character {found:?}")]
    NotHex {
        /// The offending character.
        found: char,
    },
}

/// Errors from parsing a [`Move`](crate::Move).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown move {input:?}, expected one of R, P, S")]
pub struct MoveError {
    /// The rejected input.
    pub input: String,
}

/// Frame shape and round range errors.
///
/// These never abort a round. The exchange logs them and keeps polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Received an empty buffer.
    #[error("empty frame")]
    Empty,

    /// Buffer was not exactly two bytes.
    #[error("invalid frame length: expected 2 bytes, got {actual}")]
    Length {
        /// Length of the received buffer.
        actual: usize,
    },

    /// Second byte was not an ASCII digit in `'1'..='9'`.
    #[error("invalid round byte 0x{byte:02x}")]
    RoundDigit {
        /// The raw round byte.
        byte: u8,
    },

    /// First byte was neither a move symbol nor the ack marker.
    #[error("unknown frame symbol 0x{symbol:02x}")]
    UnknownSymbol {
        /// The raw symbol byte.
        symbol: u8,
    },

    /// Round number cannot be expressed as a single decimal digit.
    #[error("round {round} out of range 1..=9")]
    RoundOutOfRange {
        /// The requested round.
        round: u8,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FrameError::Length { actual: 3 };
        assert_eq!(err.to_string(), "invalid frame length: expected 2 bytes, got 3");

        let err = FrameError::UnknownSymbol { symbol: b'Q' };
        assert_eq!(err.to_string(), "unknown frame symbol 0x51");
    }

    #[test]
    fn id_error_display() {
        let err = IdError::NotHex { found: 'g' };
        assert_eq!(err.to_string(), "participant id contains non-hex character 'g'");
    }
}
