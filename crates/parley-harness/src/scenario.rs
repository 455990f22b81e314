//! Scenario runner.
//!
//! A scenario is a set of players sharing one [`Ether`], each driven by its
//! own [`Duel`] on its own simulated host, plus optional noise stations that
//! put arbitrary bytes on the air. Running it yields every player's
//! [`MatchReport`] and the full transmission log.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use parley_core::{Duel, ExchangeConfig, MatchReport, Radio, ScriptedMoves};
use parley_proto::{Move, ParticipantId};

use crate::{
    ether::{Ether, EtherConfig, Transmission},
    sim_env::SimEnv,
};

#[derive(Debug, Clone)]
struct Player {
    name: String,
    id: ParticipantId,
    opponent: ParticipantId,
    moves: Vec<Move>,
}

#[derive(Debug, Clone)]
struct Noise {
    name: String,
    address: u32,
    frames: Vec<Vec<u8>>,
    interval: Duration,
}

/// Result of a completed scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Reports keyed by player name.
    pub reports: BTreeMap<String, MatchReport>,
    /// Everything transmitted on the medium, in order.
    pub transmissions: Vec<Transmission>,
}

impl ScenarioResult {
    /// Report of one player.
    pub fn report(&self, name: &str) -> Option<&MatchReport> {
        self.reports.get(name)
    }
}

/// Builder for a simulated match.
#[derive(Debug, Clone)]
pub struct Scenario {
    ether: EtherConfig,
    exchange: ExchangeConfig,
    duration: Duration,
    players: Vec<Player>,
    noise: Vec<Noise>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    /// Perfect medium, default exchange timing, ten virtual minutes.
    pub fn new() -> Self {
        Self {
            ether: EtherConfig::perfect(),
            exchange: ExchangeConfig::default(),
            duration: Duration::from_secs(600),
            players: Vec::new(),
            noise: Vec::new(),
        }
    }

    /// Fault model of the medium.
    pub fn with_ether(mut self, ether: EtherConfig) -> Self {
        self.ether = ether;
        self
    }

    /// Exchange configuration used by every player.
    pub fn with_exchange(mut self, exchange: ExchangeConfig) -> Self {
        self.exchange = exchange;
        self
    }

    /// Virtual time limit. The run fails if any player is still playing.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add a player.
    pub fn player(
        mut self,
        name: &str,
        id: ParticipantId,
        opponent: ParticipantId,
        moves: impl IntoIterator<Item = Move>,
    ) -> Self {
        self.players.push(Player {
            name: name.to_string(),
            id,
            opponent,
            moves: moves.into_iter().collect(),
        });
        self
    }

    /// Add a station that transmits `frames` on `address`, one every
    /// `interval`, and then goes quiet.
    pub fn noise(
        mut self,
        name: &str,
        address: u32,
        frames: impl IntoIterator<Item = Vec<u8>>,
        interval: Duration,
    ) -> Self {
        self.noise.push(Noise {
            name: name.to_string(),
            address,
            frames: frames.into_iter().collect(),
            interval,
        });
        self
    }

    /// Run the scenario to completion.
    pub fn run(self) -> turmoil::Result<ScenarioResult> {
        let mut sim = turmoil::Builder::new().simulation_duration(self.duration).build();
        let ether = Ether::new(self.ether);
        let reports = Arc::new(Mutex::new(BTreeMap::new()));

        // Register every station before any host starts so station order,
        // and with it the RNG draw order, does not depend on scheduling.
        for noise in self.noise {
            let mut radio = ether.radio(noise.name.clone());
            sim.client(noise.name, async move {
                radio.tune(noise.address)?;
                for frame in noise.frames {
                    radio.transmit(&frame).await?;
                    tokio::time::sleep(noise.interval).await;
                }
                Ok(())
            });
        }

        for player in self.players {
            let radio = ether.radio(player.name.clone());
            let exchange = self.exchange;
            let reports = Arc::clone(&reports);

            sim.client(player.name.clone(), async move {
                let mut moves = ScriptedMoves::new(player.moves);
                let duel = Duel::new(SimEnv::new(), radio, player.id, player.opponent, exchange);
                let report = duel.run(&mut moves).await?;

                reports.lock().unwrap_or_else(PoisonError::into_inner).insert(player.name, report);
                Ok(())
            });
        }

        sim.run()?;

        let reports = std::mem::take(&mut *reports.lock().unwrap_or_else(PoisonError::into_inner));
        Ok(ScenarioResult { reports, transmissions: ether.transmissions() })
    }
}
