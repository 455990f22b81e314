//! Radio abstraction.
//!
//! The medium is an unreliable broadcast: frames may be lost, duplicated or
//! reordered, and nothing is ever acknowledged below the protocol. A `Radio`
//! only moves opaque buffers. Everything else is the exchange's job.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors from the underlying medium.
///
/// Lost frames are not errors. These only cover a broken radio.
#[derive(Debug, Error)]
pub enum RadioError {
    /// The radio was used before being tuned to a channel.
    #[error("radio not tuned to a channel")]
    NotTuned,

    /// Underlying I/O failed.
    #[error("radio I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Medium-specific failure.
    #[error("radio error: {reason}")]
    Other {
        /// Description of the failure.
        reason: String,
    },
}

impl RadioError {
    /// Returns true if the failure is momentary and the frame can be treated
    /// as lost on the air.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::TimedOut
            ),
            Self::NotTuned | Self::Other { .. } => false,
        }
    }
}

/// Unreliable broadcast link shared by both peers.
#[async_trait]
pub trait Radio: Send {
    /// Tune to a channel address.
    ///
    /// Called once at match start. Only traffic on the same address is
    /// received afterwards.
    fn tune(&mut self, address: u32) -> Result<(), RadioError>;

    /// Broadcast one frame. Returns once the frame is on the air, with no
    /// delivery guarantee.
    async fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError>;

    /// Take one received buffer, if any. Never blocks.
    fn try_receive(&mut self) -> Result<Option<Bytes>, RadioError>;
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn refused_send_is_transient() {
        let err = RadioError::from(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(err.is_transient());
    }

    #[test]
    fn untuned_radio_is_not_transient() {
        assert!(!RadioError::NotTuned.is_transient());
        let err = RadioError::from(io::Error::from(io::ErrorKind::AddrNotAvailable));
        assert!(!err.is_transient());
    }
}
