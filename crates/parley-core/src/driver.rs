//! Poll-and-retry driver.
//!
//! [`Duel`] is the only place that touches the clock and the radio. Each
//! poll iteration takes at most one received buffer, feeds it to the round
//! exchange, checks the resend timer, executes whatever actions came back,
//! and sleeps for the poll interval. The match controller decides when to
//! stop.

use std::collections::VecDeque;

use async_trait::async_trait;
use bytes::Bytes;
use parley_proto::{ChannelKey, Move, ParticipantId, RoundNumber};
use serde::Serialize;

use crate::{
    config::ExchangeConfig,
    env::Environment,
    error::DriverError,
    game::{Match, MatchOutcome, MatchStatus, Score},
    radio::Radio,
    round::{Resolution, RoundAction, RoundExchange, RoundStats},
};

/// Supplies this device's move for each round.
#[async_trait]
pub trait MoveSource: Send {
    /// Pick the move for `round`. Called once per round, before the exchange
    /// opens.
    async fn choose(&mut self, round: RoundNumber, score: Score) -> Result<Move, DriverError>;
}

/// Plays a fixed list of moves in order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedMoves {
    moves: VecDeque<Move>,
}

impl ScriptedMoves {
    /// Moves for rounds 1, 2, 3 in order.
    pub fn new(moves: impl IntoIterator<Item = Move>) -> Self {
        Self { moves: moves.into_iter().collect() }
    }

    /// Moves not yet played.
    pub fn remaining(&self) -> usize {
        self.moves.len()
    }
}

#[async_trait]
impl MoveSource for ScriptedMoves {
    async fn choose(&mut self, round: RoundNumber, _score: Score) -> Result<Move, DriverError> {
        self.moves.pop_front().ok_or_else(|| DriverError::Selection {
            reason: format!("no scripted move left for round {round}"),
        })
    }
}

/// One completed round as seen from this device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundRecord {
    /// Round number.
    pub round: RoundNumber,
    /// Move this device played.
    pub own: Move,
    /// Move received from the peer.
    pub opponent: Move,
    /// Points as `(own, opponent)`.
    pub points: (u8, u8),
    /// Traffic counters for the round.
    pub stats: RoundStats,
}

/// Summary of a finished match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    /// This device.
    pub local: ParticipantId,
    /// The peer.
    pub remote: ParticipantId,
    /// Channel both devices tuned to.
    pub channel: ChannelKey,
    /// Completed rounds in order.
    pub rounds: Vec<RoundRecord>,
    /// Final score.
    pub score: Score,
    /// Final result.
    pub outcome: MatchOutcome,
}

/// One device's side of a match.
///
/// # Type Parameters
///
/// - `E`: Environment providing the clock and sleeping
/// - `R`: Radio the frames go over
pub struct Duel<E, R> {
    env: E,
    radio: R,
    local: ParticipantId,
    remote: ParticipantId,
    channel: ChannelKey,
    config: ExchangeConfig,
}

impl<E, R> Duel<E, R>
where
    E: Environment,
    R: Radio,
{
    /// Prepare a match between `local` and `remote`.
    pub fn new(
        env: E,
        radio: R,
        local: ParticipantId,
        remote: ParticipantId,
        config: ExchangeConfig,
    ) -> Self {
        let channel = ChannelKey::derive(local, remote);
        Self { env, radio, local, remote, channel, config }
    }

    /// Channel derived from the participant ids.
    pub fn channel(&self) -> ChannelKey {
        self.channel
    }

    /// Play the match to the end.
    ///
    /// Never gives up on an unresponsive peer: a round only ends once our
    /// move is acknowledged and the peer's move has arrived.
    ///
    /// # Errors
    ///
    /// - `DriverError::Radio` if the radio fails with a non-transient error
    /// - `DriverError::Selection` if the move source fails
    pub async fn run<M>(mut self, moves: &mut M) -> Result<MatchReport, DriverError>
    where
        M: MoveSource + ?Sized,
    {
        self.radio.tune(self.channel.address())?;
        tracing::info!(
            local = %self.local,
            remote = %self.remote,
            channel = %self.channel,
            address = format_args!("{:#010x}", self.channel.address()),
            "tuned to channel"
        );

        let mut game = Match::new();
        let mut rounds = Vec::new();

        loop {
            let own_move = moves.choose(game.round(), game.score()).await?;
            let (mut exchange, actions) = game.open_round(own_move, self.config, self.env.now())?;
            let mut resolved = self.execute(actions).await?;

            loop {
                resolved = resolved.or(self.poll_once(&mut exchange).await?);
                if exchange.is_complete() {
                    break;
                }
                self.env.sleep(self.config.poll_interval).await;
            }

            let status = game.complete_round(&exchange)?;
            let finished = match status {
                MatchStatus::Finished(outcome) => {
                    self.linger(&mut exchange).await?;
                    Some(outcome)
                },
                MatchStatus::Continue { .. } => None,
            };

            rounds.extend(resolved.map(|resolution| RoundRecord {
                round: exchange.round(),
                own: exchange.own_move(),
                opponent: resolution.opponent,
                points: resolution.points,
                stats: exchange.stats(),
            }));

            if let Some(outcome) = finished {
                return Ok(MatchReport {
                    local: self.local,
                    remote: self.remote,
                    channel: self.channel,
                    rounds,
                    score: game.score(),
                    outcome,
                });
            }
        }
    }

    /// Take at most one buffer, then check the resend timer.
    ///
    /// Returns the round's resolution if it happened in this iteration.
    async fn poll_once(
        &mut self,
        exchange: &mut RoundExchange<E::Instant>,
    ) -> Result<Option<Resolution>, DriverError> {
        let mut resolved = None;
        if let Some(raw) = self.receive()? {
            let actions = exchange.handle_frame(&raw);
            resolved = self.execute(actions).await?;
        }

        let actions = exchange.handle_tick(self.env.now());
        Ok(resolved.or(self.execute(actions).await?))
    }

    /// Keep acknowledging the final round so a peer whose last ack was lost
    /// can finish too.
    async fn linger(&mut self, exchange: &mut RoundExchange<E::Instant>) -> Result<(), DriverError> {
        if self.config.linger.is_zero() {
            return Ok(());
        }

        tracing::debug!(linger_ms = self.config.linger.as_millis(), "lingering after final round");

        let start = self.env.now();
        while self.env.now() - start < self.config.linger {
            if let Some(raw) = self.receive()? {
                let actions = exchange.handle_frame(&raw);
                self.execute(actions).await?;
            }
            self.env.sleep(self.config.poll_interval).await;
        }
        Ok(())
    }

    fn receive(&mut self) -> Result<Option<Bytes>, DriverError> {
        match self.radio.try_receive() {
            Ok(raw) => Ok(raw),
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "receive failed, treating as silence");
                Ok(None)
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Put transmit actions on the air and hand back a resolution, if any.
    async fn execute(&mut self, actions: Vec<RoundAction>) -> Result<Option<Resolution>, DriverError> {
        let mut resolved = None;
        for action in actions {
            match action {
                RoundAction::Transmit(frame) => {
                    tracing::trace!(?frame, "transmit");
                    match self.radio.transmit(frame.as_wire()).await {
                        Ok(()) => {},
                        Err(e) if e.is_transient() => {
                            tracing::warn!(error = %e, ?frame, "transmit failed, treating as lost");
                        },
                        Err(e) => {
                            tracing::error!(error = %e, ?frame, "radio failed");
                            return Err(e.into());
                        },
                    }
                },
                RoundAction::Resolved(resolution) => {
                    tracing::info!(
                        opponent = %resolution.opponent,
                        points = ?resolution.points,
                        "opponent move received"
                    );
                    resolved = Some(resolution);
                },
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use parley_proto::{Decoded, Frame, decode};

    use super::*;
    use crate::radio::RadioError;

    /// Clock that only moves when the driver sleeps.
    #[derive(Clone, Default)]
    struct ManualEnv {
        now: Arc<Mutex<Duration>>,
    }

    impl Environment for ManualEnv {
        type Instant = Duration;

        fn now(&self) -> Duration {
            *self.now.lock().unwrap()
        }

        fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            let now = Arc::clone(&self.now);
            async move {
                *now.lock().unwrap() += duration;
            }
        }
    }

    /// Peer that acks every move it hears and answers with its own move for
    /// the same round.
    struct AnsweringPeer {
        replies: Vec<Move>,
        inbox: VecDeque<Bytes>,
        heard: Vec<Frame>,
    }

    impl AnsweringPeer {
        fn new(replies: impl IntoIterator<Item = Move>) -> Self {
            Self { replies: replies.into_iter().collect(), inbox: VecDeque::new(), heard: Vec::new() }
        }
    }

    #[async_trait]
    impl Radio for AnsweringPeer {
        fn tune(&mut self, _address: u32) -> Result<(), RadioError> {
            Ok(())
        }

        async fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError> {
            let parsed = Frame::parse(frame).unwrap();
            self.heard.push(parsed);

            let round = parsed.round().unwrap();
            if let Decoded::ValidMove(_) = decode(frame, round) {
                let reply = self.replies[usize::from(round.get()) - 1];
                self.inbox.push_back(Bytes::copy_from_slice(Frame::ack(round).as_wire()));
                self.inbox.push_back(Bytes::copy_from_slice(Frame::for_move(reply, round).as_wire()));
            }
            Ok(())
        }

        fn try_receive(&mut self) -> Result<Option<Bytes>, RadioError> {
            Ok(self.inbox.pop_front())
        }
    }

    fn id(s: &str) -> ParticipantId {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn scripted_moves_play_in_order() {
        let mut moves = ScriptedMoves::new([Move::Rock, Move::Paper]);
        let score = Score::default();

        assert_eq!(moves.choose(RoundNumber::FIRST, score).await.unwrap(), Move::Rock);
        assert_eq!(moves.choose(RoundNumber::FIRST, score).await.unwrap(), Move::Paper);
        assert_eq!(moves.remaining(), 0);

        let err = moves.choose(RoundNumber::MAX, score).await.unwrap_err();
        assert_eq!(err.to_string(), "move selection failed: no scripted move left for round 9");
    }

    #[tokio::test]
    async fn rounds_are_recorded_from_resolutions() {
        let peer = AnsweringPeer::new([Move::Scissors, Move::Paper, Move::Rock]);
        let duel = Duel::new(ManualEnv::default(), peer, id("04"), id("1f"), ExchangeConfig::default());
        let mut moves = ScriptedMoves::new([Move::Rock, Move::Paper, Move::Scissors]);

        let report = duel.run(&mut moves).await.unwrap();

        assert_eq!(report.outcome, MatchOutcome::Draw);
        assert_eq!(report.rounds.len(), 3);
        let played: Vec<_> =
            report.rounds.iter().map(|r| (r.round.get(), r.own, r.opponent, r.points)).collect();
        assert_eq!(played, vec![
            (1, Move::Rock, Move::Scissors, (1, 0)),
            (2, Move::Paper, Move::Paper, (0, 0)),
            (3, Move::Scissors, Move::Rock, (0, 1)),
        ]);
        assert!(report.rounds.iter().all(|r| r.stats.acks_sent == 1 && r.stats.resends == 0));
    }

    #[tokio::test]
    async fn empty_script_stops_the_match() {
        let peer = AnsweringPeer::new([Move::Rock; 3]);
        let duel = Duel::new(ManualEnv::default(), peer, id("04"), id("1f"), ExchangeConfig::default());
        let mut moves = ScriptedMoves::new([Move::Paper]);

        let err = duel.run(&mut moves).await.unwrap_err();
        assert!(matches!(err, DriverError::Selection { .. }));
    }
}
