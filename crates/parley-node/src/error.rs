//! Node error types.

use parley_core::{DriverError, RadioError};
use thiserror::Error;

/// Errors that stop the node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Invalid command line configuration.
    #[error("configuration error: {reason}")]
    Config {
        /// What is wrong.
        reason: String,
    },

    /// Radio could not be set up.
    #[error("radio error: {0}")]
    Radio(#[from] RadioError),

    /// The match stopped.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// Report could not be encoded.
    #[error("report encoding error: {0}")]
    Report(#[from] serde_json::Error),

    /// Report could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
