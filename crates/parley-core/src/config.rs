//! Exchange timing and recovery configuration.

use std::time::Duration;

/// Default resend interval for an unacknowledged move, in milliseconds.
pub const DEFAULT_RETRY_TIMEOUT_MS: u64 = 2000;

/// Default sleep between poll iterations, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default resend interval for an unacknowledged move.
pub const DEFAULT_RETRY_TIMEOUT: Duration = Duration::from_millis(DEFAULT_RETRY_TIMEOUT_MS);

/// Default sleep between poll iterations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);

/// Configuration shared by every round of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Resend the own move when no ack arrived for longer than this.
    pub retry_timeout: Duration,

    /// Sleep between poll iterations. Bounds how late a resend can be.
    pub poll_interval: Duration,

    /// Acknowledge stale move frames tagged with the previous round.
    ///
    /// Changes no round state. A peer whose last ack was lost can then leave
    /// the previous round instead of resending forever.
    pub reack_previous_round: bool,

    /// Keep acknowledging final-round moves this long after the match ends.
    pub linger: Duration,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            retry_timeout: DEFAULT_RETRY_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            reack_previous_round: false,
            linger: Duration::ZERO,
        }
    }
}
