//! Participant identity and channel derivation.
//!
//! Both peers must land on the same channel without exchanging anything
//! first, so the derivation is a pure function of the unordered id pair.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::IdError;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Two-hex-digit device identifier.
///
/// Stored as its numeric value. The character form is always lower case, so
/// `"2F"` and `"2f"` name the same participant and derive the same channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(u8);

impl ParticipantId {
    /// Create an id from its numeric value (`0x00..=0xff`).
    pub const fn from_value(value: u8) -> Self {
        Self(value)
    }

    /// Numeric value of the id, used for channel ordering.
    pub const fn value(self) -> u8 {
        self.0
    }

    /// ASCII characters of the id, high digit first.
    pub const fn ascii(self) -> [u8; 2] {
        [HEX_DIGITS[(self.0 >> 4) as usize], HEX_DIGITS[(self.0 & 0x0f) as usize]]
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.chars().count();
        if len != 2 {
            return Err(IdError::Length { len });
        }

        let mut value = 0u8;
        for c in s.chars() {
            let digit = c.to_digit(16).ok_or(IdError::NotHex { found: c })?;
            // to_digit(16) is at most 15, and two digits fit a u8
            value = (value << 4) | digit as u8;
        }

        Ok(Self(value))
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.to_string()
    }
}

/// Shared channel key derived from both participant ids.
///
/// Four ASCII hex characters: the numerically smaller id first. Equal ids
/// keep the local id first.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelKey([u8; 4]);

impl ChannelKey {
    /// Derive the channel key for a local/remote id pair.
    ///
    /// Commutative: `derive(a, b) == derive(b, a)` for every pair.
    pub fn derive(local: ParticipantId, remote: ParticipantId) -> Self {
        let (first, second) =
            if local.value() > remote.value() { (remote, local) } else { (local, remote) };

        let [a, b] = first.ascii();
        let [c, d] = second.ascii();
        Self([a, b, c, d])
    }

    /// Radio address for this channel.
    ///
    /// The key bytes read as a little-endian integer, so `"041f"` tunes to
    /// `0x6631_3430`.
    pub const fn address(&self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            write!(f, "{}", char::from(byte))?;
        }
        Ok(())
    }
}

impl Serialize for ChannelKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Debug for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelKey({self})")
    }
}
