//! Shared broadcast medium.
//!
//! Every [`SimRadio`](crate::SimRadio) created from the same [`Ether`] hears
//! every other radio tuned to the same address. Loss, duplication and
//! reordering are decided per receiver from one seeded RNG, so the whole
//! medium is deterministic given the seed and the order of transmissions.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use bytes::Bytes;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Fault model of the medium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EtherConfig {
    /// Probability that a receiver misses a frame.
    pub loss_rate: f64,
    /// Probability that a receiver gets a frame twice.
    pub duplicate_rate: f64,
    /// Probability that a frame overtakes everything already queued at a
    /// receiver.
    pub reorder_rate: f64,
    /// RNG seed.
    pub seed: u64,
}

impl EtherConfig {
    /// Every frame reaches every receiver exactly once, in order.
    pub const fn perfect() -> Self {
        Self { loss_rate: 0.0, duplicate_rate: 0.0, reorder_rate: 0.0, seed: 0 }
    }

    /// Drops frames at `loss_rate`.
    pub const fn lossy(loss_rate: f64, seed: u64) -> Self {
        Self { loss_rate, duplicate_rate: 0.0, reorder_rate: 0.0, seed }
    }

    /// Set the duplication rate.
    pub const fn with_duplicates(mut self, duplicate_rate: f64) -> Self {
        self.duplicate_rate = duplicate_rate;
        self
    }

    /// Set the reordering rate.
    pub const fn with_reordering(mut self, reorder_rate: f64) -> Self {
        self.reorder_rate = reorder_rate;
        self
    }
}

impl Default for EtherConfig {
    fn default() -> Self {
        Self::perfect()
    }
}

/// One frame put on the air, as recorded by the medium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmission {
    /// Label of the sending radio.
    pub station: String,
    /// Address the sender was tuned to.
    pub address: u32,
    /// Frame bytes.
    pub frame: Bytes,
    /// Copies queued at receivers, duplicates included.
    pub delivered: usize,
}

#[derive(Debug)]
struct Station {
    label: String,
    address: Option<u32>,
    inbox: VecDeque<Bytes>,
}

#[derive(Debug)]
struct EtherState {
    config: EtherConfig,
    rng: ChaCha8Rng,
    stations: Vec<Station>,
    log: Vec<Transmission>,
}

/// Handle to a shared medium. Clones refer to the same medium.
#[derive(Debug, Clone)]
pub struct Ether {
    state: Arc<Mutex<EtherState>>,
}

impl Ether {
    /// Create an empty medium.
    pub fn new(config: EtherConfig) -> Self {
        let state = EtherState {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            stations: Vec::new(),
            log: Vec::new(),
        };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    /// Register a new station and return its radio.
    pub fn radio(&self, label: impl Into<String>) -> crate::SimRadio {
        let station = {
            let mut state = self.lock();
            state.stations.push(Station {
                label: label.into(),
                address: None,
                inbox: VecDeque::new(),
            });
            state.stations.len() - 1
        };
        crate::SimRadio::new(self.clone(), station)
    }

    /// Every transmission so far, in order.
    pub fn transmissions(&self) -> Vec<Transmission> {
        self.lock().log.clone()
    }

    pub(crate) fn tune(&self, station: usize, address: u32) {
        if let Some(s) = self.lock().stations.get_mut(station) {
            s.address = Some(address);
            s.inbox.clear();
        }
    }

    pub(crate) fn address(&self, station: usize) -> Option<u32> {
        self.lock().stations.get(station).and_then(|s| s.address)
    }

    /// Queue `frame` at every other station tuned to `address`.
    pub(crate) fn broadcast(&self, from: usize, address: u32, frame: &[u8]) {
        let mut state = self.lock();
        let EtherState { config, rng, stations, log } = &mut *state;
        let frame = Bytes::copy_from_slice(frame);
        let mut delivered = 0;

        for (index, station) in stations.iter_mut().enumerate() {
            if index == from || station.address != Some(address) {
                continue;
            }
            if rng.r#gen::<f64>() < config.loss_rate {
                continue;
            }

            let copies = if rng.r#gen::<f64>() < config.duplicate_rate { 2 } else { 1 };
            for _ in 0..copies {
                if rng.r#gen::<f64>() < config.reorder_rate {
                    station.inbox.push_front(frame.clone());
                } else {
                    station.inbox.push_back(frame.clone());
                }
            }
            delivered += copies;
        }

        let label = stations.get(from).map(|s| s.label.clone()).unwrap_or_default();
        log.push(Transmission { station: label, address, frame, delivered });
    }

    pub(crate) fn take(&self, station: usize) -> Option<Bytes> {
        self.lock().stations.get_mut(station).and_then(|s| s.inbox.pop_front())
    }

    fn lock(&self) -> MutexGuard<'_, EtherState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
