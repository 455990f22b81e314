//! Parley Core
//!
//! Round exchange, outcome resolution and match control for a
//! rock-paper-scissors match played over an unreliable broadcast radio.
//!
//! # Architecture
//!
//! ```text
//!            MoveSource
//!                │ choose
//!                ▼
//!   Radio ◄── Duel (poll loop) ──► Environment (now, sleep)
//!                │
//!        ┌───────┴────────┐
//!        ▼                ▼
//!      Match ◄──────  RoundExchange ──► resolve
//!   (score, round)   (ack, resend)
//! ```
//!
//! [`RoundExchange`] and [`Match`] are pure state machines: they take
//! received bytes and instants and return actions. Only [`Duel`] performs
//! I/O, which keeps every protocol rule testable without a radio or a clock.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod driver;
pub mod env;
pub mod error;
pub mod game;
pub mod outcome;
pub mod radio;
pub mod round;

pub use config::ExchangeConfig;
pub use driver::{Duel, MatchReport, MoveSource, RoundRecord, ScriptedMoves};
pub use env::Environment;
pub use error::DriverError;
pub use game::{FINAL_ROUND, GameError, Match, MatchOutcome, MatchStatus, POINTS_TO_WIN, Score};
pub use outcome::resolve;
pub use radio::{Radio, RadioError};
pub use round::{Resolution, RoundAction, RoundExchange, RoundPhase, RoundStats};
