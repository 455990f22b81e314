//! Parley device node.
//!
//! Plays one match against a peer node, with UDP standing in for the radio.
//!
//! ## Architecture
//!
//! ```text
//! parley-node
//!   ├─ SystemEnv      (production Environment impl)
//!   ├─ UdpRadio       (Radio over UDP, channel address prefix)
//!   ├─ StdinMoves     (interactive MoveSource)
//!   └─ run            (Duel + optional JSON report)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod line_moves;
mod system_env;
mod udp_radio;

use std::path::Path;

pub use config::{DEFAULT_BIND, NodeConfig};
pub use error::NodeError;
pub use line_moves::{LineMoves, StdinMoves};
use parley_core::{Duel, MatchReport, MoveSource, ScriptedMoves};
pub use system_env::SystemEnv;
pub use udp_radio::{ADDRESS_PREFIX, UdpRadio};

/// Bind the radio, play the match and write the report if asked to.
pub async fn run(config: NodeConfig) -> Result<MatchReport, NodeError> {
    config.validate()?;

    let mut radio = UdpRadio::bind(config.bind).await?;
    radio.connect(config.peer);

    let mut source: Box<dyn MoveSource> = if config.moves.is_empty() {
        Box::new(StdinMoves::stdin())
    } else {
        Box::new(ScriptedMoves::new(config.moves.iter().copied()))
    };

    let duel = Duel::new(SystemEnv::new(), radio, config.local, config.remote, config.exchange);
    tracing::info!(channel = %duel.channel(), peer = %config.peer, "match starting");

    let report = duel.run(source.as_mut()).await?;

    tracing::info!(score = %report.score, outcome = %report.outcome, "match over");
    for record in &report.rounds {
        tracing::info!(
            round = %record.round,
            own = %record.own,
            opponent = %record.opponent,
            points = ?record.points,
            resends = record.stats.resends,
            "round summary"
        );
    }

    if let Some(path) = &config.report {
        write_report(path, &report).await?;
    }

    Ok(report)
}

/// Write a match report as pretty-printed JSON.
pub async fn write_report(path: &Path, report: &MatchReport) -> Result<(), NodeError> {
    let json = serde_json::to_vec_pretty(report)?;
    tokio::fs::write(path, json).await?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}
