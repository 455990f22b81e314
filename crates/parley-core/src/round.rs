//! Round exchange state machine.
//!
//! One `RoundExchange` lives for exactly one round. It owns the round state
//! (own move, last send time, acknowledged and resolved flags) and is dropped
//! when the round completes, so nothing carries over into the next round.
//!
//! # Protocol
//!
//! ```text
//!   open ──► Transmit(move)
//!             │
//!             ▼
//!   AwaitingBothSignals ──── ValidMove ──► Transmit(ack), Resolved (first time only)
//!             │        ──── ValidAck  ──► acknowledged
//!             │        ──── tick, unacknowledged, > retry_timeout ──► Transmit(move)
//!             ▼
//!   Complete (acknowledged && resolved)
//! ```
//!
//! # Invariants
//!
//! - The outcome is resolved at most once per round
//! - Every valid move frame for this round is acknowledged, duplicates
//!   included, so a lost ack can be replaced
//! - Stale and malformed frames never change state
//! - Resends carry the identical frame (same move, same round)

use std::{ops::Sub, time::Duration};

use parley_proto::{Decoded, Frame, FrameKind, Move, Rejection, RoundNumber, decode};
use serde::Serialize;

use crate::{config::ExchangeConfig, outcome::resolve};

/// Phase of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Waiting for the peer's move, our ack, or both.
    AwaitingBothSignals,
    /// Own move acknowledged and outcome resolved.
    Complete,
}

/// Actions returned by the exchange for the driver to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundAction {
    /// Put this frame on the air.
    Transmit(Frame),

    /// The peer's move arrived and the round outcome is known.
    Resolved(Resolution),
}

/// Outcome of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Move received from the peer.
    pub opponent: Move,
    /// Points as `(own, opponent)`.
    pub points: (u8, u8),
}

/// Per-round traffic counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoundStats {
    /// Move frames sent after the first.
    pub resends: u32,
    /// Ack frames sent.
    pub acks_sent: u32,
    /// Frames dropped for carrying another round.
    pub stale: u32,
    /// Frames dropped for bad length or content.
    pub malformed: u32,
    /// Valid moves or acks received after the first.
    pub duplicates: u32,
}

/// State machine for a single round.
///
/// Pure state machine - returns actions, caller handles I/O.
///
/// # Type Parameters
///
/// - `I`: Instant type, so tests and simulations can supply their own clock
#[derive(Debug, Clone)]
pub struct RoundExchange<I> {
    round: RoundNumber,
    own_move: Move,
    config: ExchangeConfig,
    /// When the own move was last put on the air.
    sent_at: I,
    acknowledged: bool,
    resolution: Option<Resolution>,
    stats: RoundStats,
}

impl<I> RoundExchange<I>
where
    I: Copy + Sub<Output = Duration>,
{
    /// Open a round and transmit the own move.
    pub fn open(
        round: RoundNumber,
        own_move: Move,
        config: ExchangeConfig,
        now: I,
    ) -> (Self, Vec<RoundAction>) {
        let exchange = Self {
            round,
            own_move,
            config,
            sent_at: now,
            acknowledged: false,
            resolution: None,
            stats: RoundStats::default(),
        };

        tracing::debug!(%round, %own_move, "round opened");

        let actions = vec![RoundAction::Transmit(exchange.move_frame())];
        (exchange, actions)
    }

    /// Round this exchange is for.
    pub fn round(&self) -> RoundNumber {
        self.round
    }

    /// Move this side committed to.
    pub fn own_move(&self) -> Move {
        self.own_move
    }

    /// Current phase.
    pub fn phase(&self) -> RoundPhase {
        if self.is_complete() { RoundPhase::Complete } else { RoundPhase::AwaitingBothSignals }
    }

    /// True once both the ack and the peer's move have arrived.
    pub fn is_complete(&self) -> bool {
        self.acknowledged && self.resolution.is_some()
    }

    /// True once the peer acknowledged our move.
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// Outcome, once resolved.
    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    /// Traffic counters for this round.
    pub fn stats(&self) -> RoundStats {
        self.stats
    }

    /// The frame carrying our move.
    pub fn move_frame(&self) -> Frame {
        Frame::for_move(self.own_move, self.round)
    }

    /// Process one received buffer.
    pub fn handle_frame(&mut self, raw: &[u8]) -> Vec<RoundAction> {
        match decode(raw, self.round) {
            Decoded::ValidMove(opponent) => self.handle_move(opponent),
            Decoded::ValidAck => {
                if self.acknowledged {
                    self.stats.duplicates += 1;
                    tracing::debug!(round = %self.round, "duplicate ack dropped");
                } else {
                    self.acknowledged = true;
                    tracing::debug!(round = %self.round, "move acknowledged");
                }
                Vec::new()
            },
            Decoded::Rejected(rejection) => self.handle_rejected(rejection),
        }
    }

    /// Resend the own move if it has gone unacknowledged for too long.
    pub fn handle_tick(&mut self, now: I) -> Vec<RoundAction> {
        if self.acknowledged {
            return Vec::new();
        }

        let elapsed = now - self.sent_at;
        if elapsed <= self.config.retry_timeout {
            return Vec::new();
        }

        self.sent_at = now;
        self.stats.resends += 1;
        tracing::debug!(
            round = %self.round,
            resends = self.stats.resends,
            elapsed_ms = elapsed.as_millis(),
            "no ack, resending move"
        );

        vec![RoundAction::Transmit(self.move_frame())]
    }

    fn handle_move(&mut self, opponent: Move) -> Vec<RoundAction> {
        let mut actions = vec![self.ack(self.round)];

        if let Some(resolution) = self.resolution {
            self.stats.duplicates += 1;
            tracing::debug!(
                round = %self.round,
                %opponent,
                resolved_with = %resolution.opponent,
                "duplicate move acknowledged and dropped"
            );
            return actions;
        }

        let resolution = Resolution { opponent, points: resolve(self.own_move, opponent) };
        self.resolution = Some(resolution);

        tracing::debug!(
            round = %self.round,
            own = %self.own_move,
            %opponent,
            points = ?resolution.points,
            "round resolved"
        );

        actions.push(RoundAction::Resolved(resolution));
        actions
    }

    fn handle_rejected(&mut self, rejection: Rejection) -> Vec<RoundAction> {
        match rejection {
            Rejection::Stale { actual, kind: Some(FrameKind::Move(_)), .. }
                if self.config.reack_previous_round && self.round.previous() == Some(actual) =>
            {
                self.stats.stale += 1;
                tracing::debug!(round = %self.round, %actual, "re-acknowledging previous round move");
                vec![self.ack(actual)]
            },
            Rejection::Stale { .. } => {
                self.stats.stale += 1;
                tracing::debug!(round = %self.round, reason = %rejection, "frame dropped");
                Vec::new()
            },
            Rejection::Malformed(_) => {
                self.stats.malformed += 1;
                tracing::debug!(round = %self.round, reason = %rejection, "frame dropped");
                Vec::new()
            },
        }
    }

    fn ack(&mut self, round: RoundNumber) -> RoundAction {
        self.stats.acks_sent += 1;
        RoundAction::Transmit(Frame::ack(round))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const RETRY: Duration = Duration::from_millis(2000);

    fn round(n: u8) -> RoundNumber {
        RoundNumber::new(n).unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn open(n: u8, own: Move) -> RoundExchange<Duration> {
        RoundExchange::open(round(n), own, ExchangeConfig::default(), Duration::ZERO).0
    }

    fn transmitted(actions: &[RoundAction]) -> Vec<Frame> {
        actions
            .iter()
            .filter_map(|a| match a {
                RoundAction::Transmit(frame) => Some(*frame),
                RoundAction::Resolved(_) => None,
            })
            .collect()
    }

    fn resolutions(actions: &[RoundAction]) -> usize {
        actions.iter().filter(|a| matches!(a, RoundAction::Resolved(_))).count()
    }

    #[test]
    fn open_transmits_own_move() {
        let (exchange, actions) =
            RoundExchange::open(round(1), Move::Rock, ExchangeConfig::default(), Duration::ZERO);

        assert_eq!(actions, vec![RoundAction::Transmit(Frame::for_move(Move::Rock, round(1)))]);
        assert_eq!(exchange.phase(), RoundPhase::AwaitingBothSignals);
        assert!(!exchange.is_acknowledged());
        assert_eq!(exchange.resolution(), None);
    }

    #[test]
    fn move_is_acknowledged_and_resolved() {
        let mut exchange = open(1, Move::Rock);

        let actions = exchange.handle_frame(b"S1");

        assert_eq!(transmitted(&actions), vec![Frame::ack(round(1))]);
        assert_eq!(
            exchange.resolution(),
            Some(Resolution { opponent: Move::Scissors, points: (1, 0) })
        );
        assert!(!exchange.is_complete(), "still waiting for our ack");
    }

    #[test]
    fn completes_with_ack_and_move_in_either_order() {
        let mut exchange = open(2, Move::Paper);
        exchange.handle_frame(b"X2");
        assert!(!exchange.is_complete());
        exchange.handle_frame(b"P2");
        assert_eq!(exchange.phase(), RoundPhase::Complete);

        let mut exchange = open(2, Move::Paper);
        exchange.handle_frame(b"P2");
        assert!(!exchange.is_complete());
        exchange.handle_frame(b"X2");
        assert_eq!(exchange.phase(), RoundPhase::Complete);
    }

    #[test]
    fn duplicate_move_resolves_once() {
        let mut exchange = open(1, Move::Rock);

        let first = exchange.handle_frame(b"S1");
        let second = exchange.handle_frame(b"S1");

        assert_eq!(resolutions(&first), 1);
        assert_eq!(resolutions(&second), 0);
        // the retransmission is still acknowledged
        assert_eq!(transmitted(&second), vec![Frame::ack(round(1))]);
        assert_eq!(exchange.stats().duplicates, 1);
        assert_eq!(exchange.stats().acks_sent, 2);
    }

    #[test]
    fn duplicate_move_keeps_first_resolution() {
        let mut exchange = open(1, Move::Rock);
        exchange.handle_frame(b"S1");
        exchange.handle_frame(b"P1");

        assert_eq!(
            exchange.resolution(),
            Some(Resolution { opponent: Move::Scissors, points: (1, 0) })
        );
    }

    #[test]
    fn duplicate_ack_has_no_effect() {
        let mut exchange = open(1, Move::Rock);
        assert!(exchange.handle_frame(b"X1").is_empty());
        assert!(exchange.handle_frame(b"X1").is_empty());
        assert!(exchange.is_acknowledged());
        assert_eq!(exchange.stats().duplicates, 1);
    }

    #[test]
    fn stale_frames_change_nothing() {
        let mut exchange = open(2, Move::Rock);

        assert!(exchange.handle_frame(b"S1").is_empty());
        assert!(exchange.handle_frame(b"X1").is_empty());
        assert!(exchange.handle_frame(b"X3").is_empty());

        assert!(!exchange.is_acknowledged());
        assert_eq!(exchange.resolution(), None);
        assert_eq!(exchange.stats().stale, 3);
    }

    #[test]
    fn malformed_frames_change_nothing() {
        let mut exchange = open(1, Move::Rock);

        let inputs: [&[u8]; 6] = [b"", b"S", b"S1\n", b"Q1", b"S0", b"\x00\x00"];
        for raw in inputs {
            assert!(exchange.handle_frame(raw).is_empty(), "{raw:?}");
        }

        assert!(!exchange.is_acknowledged());
        assert_eq!(exchange.resolution(), None);
        assert_eq!(exchange.stats().malformed, 6);
    }

    #[test]
    fn resend_only_after_timeout_elapsed() {
        let mut exchange = open(1, Move::Paper);

        assert!(exchange.handle_tick(ms(100)).is_empty());
        assert!(exchange.handle_tick(RETRY).is_empty(), "timeout must be exceeded, not reached");

        let actions = exchange.handle_tick(RETRY + ms(1));
        assert_eq!(transmitted(&actions), vec![exchange.move_frame()]);
        assert_eq!(exchange.move_frame(), Frame::for_move(Move::Paper, round(1)));

        // timestamp refreshed: next resend one full interval later
        assert!(exchange.handle_tick(RETRY + ms(1000)).is_empty());
        assert!(exchange.handle_tick(RETRY * 2 + ms(1)).is_empty());
        assert_eq!(transmitted(&exchange.handle_tick(RETRY * 2 + ms(2))).len(), 1);

        assert_eq!(exchange.stats().resends, 2);
    }

    #[test]
    fn one_resend_per_elapsed_interval() {
        let mut exchange = open(1, Move::Rock);
        let mut resent = Vec::new();

        // poll every 100ms for 10 seconds
        for step in 1..=100 {
            resent.extend(transmitted(&exchange.handle_tick(ms(step * 100))));
        }

        assert_eq!(resent.len(), 4, "resends at 2.1s, 4.2s, 6.3s, 8.4s");
        assert!(resent.iter().all(|f| *f == Frame::for_move(Move::Rock, round(1))));
    }

    #[test]
    fn no_resend_once_acknowledged() {
        let mut exchange = open(1, Move::Rock);
        exchange.handle_frame(b"X1");

        assert!(exchange.handle_tick(RETRY * 10).is_empty());
        assert_eq!(exchange.stats().resends, 0);
    }

    #[test]
    fn resends_continue_while_peer_silent() {
        let mut exchange = open(1, Move::Rock);
        exchange.handle_frame(b"P1");

        let mut now = Duration::ZERO;
        for _ in 0..50 {
            now += RETRY + ms(1);
            assert_eq!(transmitted(&exchange.handle_tick(now)).len(), 1);
        }
        assert_eq!(exchange.phase(), RoundPhase::AwaitingBothSignals);
    }

    #[test]
    fn previous_round_move_reacknowledged_when_enabled() {
        let config = ExchangeConfig { reack_previous_round: true, ..ExchangeConfig::default() };
        let (mut exchange, _) = RoundExchange::open(round(2), Move::Rock, config, Duration::ZERO);

        let actions = exchange.handle_frame(b"P1");
        assert_eq!(transmitted(&actions), vec![Frame::ack(round(1))]);
        assert_eq!(exchange.resolution(), None);

        // acks and older rounds are still just dropped
        assert!(exchange.handle_frame(b"X1").is_empty());
        let (mut exchange, _) = RoundExchange::open(round(3), Move::Rock, config, Duration::ZERO);
        assert!(exchange.handle_frame(b"P1").is_empty());
    }

    #[test]
    fn previous_round_move_dropped_by_default() {
        let mut exchange = open(2, Move::Rock);
        assert!(exchange.handle_frame(b"P1").is_empty());
    }
}
