//! Parley Protocol
//!
//! Wire format and identity types shared by both peers of a Parley match.
//!
//! # Wire Format
//!
//! Every frame is exactly two ASCII bytes:
//!
//! ```text
//! [symbol: u8][round digit: u8]
//!
//!  symbol      'R' | 'P' | 'S'  move frame
//!              'X'              acknowledgement frame
//!  round digit '1'..='9'
//! ```
//!
//! There are no sequence numbers beyond the round digit, no checksums and no
//! length prefix. Anything that does not fit this shape is rejected by
//! [`decode`].
//!
//! # Identity
//!
//! Each device owns a two-hex-digit [`ParticipantId`]. Both peers derive the
//! same [`ChannelKey`] from the unordered pair of ids and tune their radio to
//! [`ChannelKey::address`] for the whole match.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod frame;
pub mod ids;
pub mod moves;

pub use error::{FrameError, IdError, MoveError};
pub use frame::{ACK_MARKER, Decoded, Frame, FrameKind, Rejection, decode};
pub use ids::{ChannelKey, ParticipantId};
pub use moves::{Move, RoundNumber};
