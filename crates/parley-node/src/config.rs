//! Node configuration.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use parley_core::{ExchangeConfig, FINAL_ROUND};
use parley_proto::{Move, ParticipantId};

use crate::error::NodeError;

/// Default UDP bind address.
pub const DEFAULT_BIND: &str = "0.0.0.0:7700";

/// Everything the node needs to play one match.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// This device's id.
    pub local: ParticipantId,
    /// The opponent's id.
    pub remote: ParticipantId,
    /// Address the radio socket binds to.
    pub bind: SocketAddr,
    /// Where transmitted frames are sent.
    pub peer: SocketAddr,
    /// Scripted moves. Empty means ask on standard input.
    pub moves: Vec<Move>,
    /// Exchange timing.
    pub exchange: ExchangeConfig,
    /// Write the match report here as JSON.
    pub report: Option<PathBuf>,
}

impl NodeConfig {
    /// Reject settings the exchange cannot run with.
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.exchange.poll_interval.is_zero() {
            return Err(NodeError::Config { reason: "poll interval must be non-zero".to_string() });
        }
        if self.exchange.retry_timeout < self.exchange.poll_interval {
            return Err(NodeError::Config {
                reason: format!(
                    "retry timeout {:?} is shorter than poll interval {:?}",
                    self.exchange.retry_timeout, self.exchange.poll_interval
                ),
            });
        }
        if self.moves.len() > usize::from(FINAL_ROUND) {
            return Err(NodeError::Config {
                reason: format!("at most {FINAL_ROUND} moves, got {}", self.moves.len()),
            });
        }
        if self.local == self.remote {
            tracing::warn!(id = %self.local, "local and remote ids are equal");
        }
        Ok(())
    }

    /// Exchange timing from command line milliseconds.
    pub fn exchange_from_millis(
        retry_timeout_ms: u64,
        poll_interval_ms: u64,
        reack_previous_round: bool,
        linger_ms: u64,
    ) -> ExchangeConfig {
        ExchangeConfig {
            retry_timeout: Duration::from_millis(retry_timeout_ms),
            poll_interval: Duration::from_millis(poll_interval_ms),
            reack_previous_round,
            linger: Duration::from_millis(linger_ms),
        }
    }
}
