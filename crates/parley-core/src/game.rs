//! Match controller.
//!
//! Best of three: the match ends as soon as either side has two points, and
//! after the third round regardless of score.

use std::{fmt, ops::Sub, time::Duration};

use parley_proto::{FrameError, Move, RoundNumber};
use serde::Serialize;
use thiserror::Error;

use crate::{
    config::ExchangeConfig,
    round::{RoundAction, RoundExchange},
};

/// Points needed to win before the final round.
pub const POINTS_TO_WIN: u8 = 2;

/// Last round of a match.
pub const FINAL_ROUND: u8 = 3;

/// Running score, `own` from this device's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    /// Points won by this device.
    pub own: u8,
    /// Points won by the peer.
    pub opponent: u8,
}

impl Score {
    /// Add one round's `(own, opponent)` points.
    pub fn apply(&mut self, (own, opponent): (u8, u8)) {
        self.own = self.own.saturating_add(own);
        self.opponent = self.opponent.saturating_add(opponent);
    }

    /// Compare both sides.
    pub fn outcome(&self) -> MatchOutcome {
        match self.own.cmp(&self.opponent) {
            std::cmp::Ordering::Greater => MatchOutcome::Win,
            std::cmp::Ordering::Less => MatchOutcome::Loss,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.own, self.opponent)
    }
}

/// Final result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    /// This device won.
    Win,
    /// The peer won.
    Loss,
    /// Equal score after the final round.
    Draw,
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Win => "you win",
            Self::Loss => "you lose",
            Self::Draw => "draw",
        };
        f.write_str(text)
    }
}

/// What happens after a completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// Play another round.
    Continue {
        /// The round to play next.
        next_round: RoundNumber,
    },
    /// The match is over.
    Finished(MatchOutcome),
}

/// Errors from driving the match controller out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    /// The round has not been both acknowledged and resolved.
    #[error("round {round} is not complete")]
    RoundIncomplete {
        /// The incomplete round.
        round: RoundNumber,
    },

    /// The exchange belongs to a different round.
    #[error("round mismatch: expected {expected}, got {actual}")]
    RoundMismatch {
        /// Round the match is at.
        expected: RoundNumber,
        /// Round of the supplied exchange.
        actual: RoundNumber,
    },

    /// No more rounds can be played.
    #[error("match already finished")]
    MatchFinished,

    /// Next round cannot be expressed on the wire.
    #[error("round overflow: {0}")]
    RoundOverflow(#[from] FrameError),
}

/// Match state: current round, score, and whether the match is over.
///
/// Owned by the driver and passed each completed round. The score changes
/// only in [`Match::complete_round`], once per round.
#[derive(Debug, Clone)]
pub struct Match {
    round: RoundNumber,
    score: Score,
    outcome: Option<MatchOutcome>,
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

impl Match {
    /// A match at round 1 with no points.
    pub fn new() -> Self {
        Self { round: RoundNumber::FIRST, score: Score::default(), outcome: None }
    }

    /// Round being played, or the last round once finished.
    pub fn round(&self) -> RoundNumber {
        self.round
    }

    /// Current score.
    pub fn score(&self) -> Score {
        self.score
    }

    /// Outcome, once finished.
    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    /// Open the exchange for the current round.
    pub fn open_round<I>(
        &self,
        own_move: Move,
        config: ExchangeConfig,
        now: I,
    ) -> Result<(RoundExchange<I>, Vec<RoundAction>), GameError>
    where
        I: Copy + Sub<Output = Duration>,
    {
        if self.outcome.is_some() {
            return Err(GameError::MatchFinished);
        }
        Ok(RoundExchange::open(self.round, own_move, config, now))
    }

    /// Apply a completed exchange and decide whether the match goes on.
    ///
    /// Fails without touching the score if the exchange is incomplete or
    /// belongs to another round, so a round's points can only count once.
    pub fn complete_round<I>(&mut self, exchange: &RoundExchange<I>) -> Result<MatchStatus, GameError>
    where
        I: Copy + Sub<Output = Duration>,
    {
        if self.outcome.is_some() {
            return Err(GameError::MatchFinished);
        }
        if exchange.round() != self.round {
            return Err(GameError::RoundMismatch { expected: self.round, actual: exchange.round() });
        }
        let resolution = match exchange.resolution() {
            Some(resolution) if exchange.is_complete() => resolution,
            _ => return Err(GameError::RoundIncomplete { round: exchange.round() }),
        };

        self.apply_points(resolution.points)
    }

    fn apply_points(&mut self, points: (u8, u8)) -> Result<MatchStatus, GameError> {
        self.score.apply(points);

        let decided = self.score.own >= POINTS_TO_WIN || self.score.opponent >= POINTS_TO_WIN;
        if decided || self.round.get() >= FINAL_ROUND {
            let outcome = self.score.outcome();
            self.outcome = Some(outcome);
            tracing::info!(round = %self.round, score = %self.score, %outcome, "match finished");
            return Ok(MatchStatus::Finished(outcome));
        }

        self.round = self.round.next()?;
        tracing::info!(score = %self.score, next_round = %self.round, "round complete");
        Ok(MatchStatus::Continue { next_round: self.round })
    }
}
