//! Parley node binary.
//!
//! # Usage
//!
//! ```bash
//! # Device 04 against device 1f, moves typed on stdin
//! parley --id 04 --opponent 1f --bind 0.0.0.0:7700 --peer 192.168.1.20:7700
//!
//! # Scripted moves, JSON report
//! parley --id 1f --opponent 04 --peer 192.168.1.10:7700 --moves s,p,r --report match.json
//! ```

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use parley_core::config::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_RETRY_TIMEOUT_MS};
use parley_node::{DEFAULT_BIND, NodeConfig};
use parley_proto::{ChannelKey, Move, ParticipantId};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Parley rock-paper-scissors node
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "Best-of-three rock-paper-scissors over an unreliable radio link")]
#[command(version)]
struct Args {
    /// This device's two-hex-digit id
    #[arg(long)]
    id: ParticipantId,

    /// The opponent's two-hex-digit id
    #[arg(long)]
    opponent: ParticipantId,

    /// Address to bind the radio socket to
    #[arg(short, long, default_value = DEFAULT_BIND)]
    bind: SocketAddr,

    /// Address of the opponent's radio socket
    #[arg(short, long)]
    peer: SocketAddr,

    /// Comma-separated scripted moves (r,p,s); asks on stdin when omitted
    #[arg(short, long, value_delimiter = ',')]
    moves: Vec<Move>,

    /// Resend an unacknowledged move after this many milliseconds
    #[arg(long, default_value_t = DEFAULT_RETRY_TIMEOUT_MS)]
    retry_timeout_ms: u64,

    /// Milliseconds between radio polls
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    poll_interval_ms: u64,

    /// Acknowledge moves retransmitted from the previous round
    #[arg(long)]
    reack_stale: bool,

    /// Keep acknowledging the final round this long after the match ends
    #[arg(long, default_value_t = 0)]
    linger_ms: u64,

    /// Write the match report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!(
        id = %args.id,
        opponent = %args.opponent,
        channel = %ChannelKey::derive(args.id, args.opponent),
        "Parley node starting"
    );

    let config = NodeConfig {
        local: args.id,
        remote: args.opponent,
        bind: args.bind,
        peer: args.peer,
        moves: args.moves,
        exchange: NodeConfig::exchange_from_millis(
            args.retry_timeout_ms,
            args.poll_interval_ms,
            args.reack_stale,
            args.linger_ms,
        ),
        report: args.report,
    };

    parley_node::run(config).await?;

    Ok(())
}
