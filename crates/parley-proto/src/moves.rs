//! Moves and round numbers.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::{FrameError, MoveError};

/// One of the three move symbols.
///
/// The discriminant is the wire symbol, so `mv as u8` is the byte that goes
/// on the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Move {
    /// `R`
    Rock = b'R',
    /// `P`
    Paper = b'P',
    /// `S`
    Scissors = b'S',
}

impl Move {
    /// All moves in wire order.
    pub const ALL: [Self; 3] = [Self::Rock, Self::Paper, Self::Scissors];

    /// Wire symbol for this move.
    pub const fn symbol(self) -> u8 {
        self as u8
    }

    /// Move for a wire symbol, `None` for anything else.
    pub const fn from_symbol(symbol: u8) -> Option<Self> {
        match symbol {
            b'R' => Some(Self::Rock),
            b'P' => Some(Self::Paper),
            b'S' => Some(Self::Scissors),
            _ => None,
        }
    }

    /// The move this one beats.
    pub const fn beats(self) -> Self {
        match self {
            Self::Rock => Self::Scissors,
            Self::Paper => Self::Rock,
            Self::Scissors => Self::Paper,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rock => "rock",
            Self::Paper => "paper",
            Self::Scissors => "scissors",
        };
        f.write_str(name)
    }
}

impl FromStr for Move {
    type Err = MoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "r" | "rock" => Ok(Self::Rock),
            "p" | "paper" => Ok(Self::Paper),
            "s" | "scissors" => Ok(Self::Scissors),
            _ => Err(MoveError { input: s.to_string() }),
        }
    }
}

/// Round number, `1..=9`.
///
/// The round travels as a single ASCII digit, so rounds past 9 cannot be
/// expressed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RoundNumber(u8);

impl RoundNumber {
    /// The first round of a match.
    pub const FIRST: Self = Self(1);

    /// Highest round the wire format can carry.
    pub const MAX: Self = Self(9);

    /// Create a round number.
    pub const fn new(round: u8) -> Result<Self, FrameError> {
        if round >= Self::FIRST.0 && round <= Self::MAX.0 {
            Ok(Self(round))
        } else {
            Err(FrameError::RoundOutOfRange { round })
        }
    }

    /// Numeric value.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// ASCII digit carried in byte 1 of a frame.
    pub const fn digit(self) -> u8 {
        b'0' + self.0
    }

    /// Round number for an ASCII digit byte.
    pub const fn from_digit(byte: u8) -> Result<Self, FrameError> {
        if byte.is_ascii_digit() && byte != b'0' {
            Ok(Self(byte - b'0'))
        } else {
            Err(FrameError::RoundDigit { byte })
        }
    }

    /// The following round.
    pub const fn next(self) -> Result<Self, FrameError> {
        Self::new(self.0 + 1)
    }

    /// The preceding round, `None` for the first.
    pub const fn previous(self) -> Option<Self> {
        if self.0 > Self::FIRST.0 { Some(Self(self.0 - 1)) } else { None }
    }
}

impl fmt::Display for RoundNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for RoundNumber {
    type Error = FrameError;

    fn try_from(round: u8) -> Result<Self, Self::Error> {
        Self::new(round)
    }
}

impl From<RoundNumber> for u8 {
    fn from(round: RoundNumber) -> Self {
        round.0
    }
}
