//! Deterministic simulation harness for Parley matches.
//!
//! Turmoil supplies the virtual clock and schedules each device as a
//! simulated host. The radio is an in-process [`Ether`]: a shared broadcast
//! medium that loses, duplicates and reorders frames from a seeded RNG, so a
//! lossy match replays bit for bit under the same seed.
//!
//! # Example
//!
//! ```rust,ignore
//! use parley_harness::{EtherConfig, Scenario};
//! use parley_proto::{Move, ParticipantId};
//!
//! let alice = "04".parse()?;
//! let bob = "1f".parse()?;
//!
//! let result = Scenario::new()
//!     .with_ether(EtherConfig::lossy(0.2, 7))
//!     .player("alice", alice, bob, [Move::Rock, Move::Paper, Move::Scissors])
//!     .player("bob", bob, alice, [Move::Scissors, Move::Paper, Move::Rock])
//!     .run()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ether;
pub mod scenario;
pub mod sim_env;
pub mod sim_radio;

pub use ether::{Ether, EtherConfig, Transmission};
pub use scenario::{Scenario, ScenarioResult};
pub use sim_env::SimEnv;
pub use sim_radio::SimRadio;
