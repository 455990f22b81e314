//! Driver error types.

use thiserror::Error;

use crate::{game::GameError, radio::RadioError};

/// Errors that stop a match.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The radio failed.
    #[error("radio: {0}")]
    Radio(#[from] RadioError),

    /// The match controller refused a round.
    #[error("game: {0}")]
    Game(#[from] GameError),

    /// No move could be chosen for a round.
    #[error("move selection failed: {reason}")]
    Selection {
        /// Description of the failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn wraps_radio_and_game_errors() {
        let err = DriverError::from(RadioError::from(io::Error::from(io::ErrorKind::BrokenPipe)));
        assert!(matches!(err, DriverError::Radio(RadioError::Io(_))));

        let err = DriverError::from(GameError::MatchFinished);
        assert!(err.to_string().starts_with("game: "));
    }

    #[test]
    fn error_display() {
        let err = DriverError::Selection { reason: "stdin closed".to_string() };
        assert_eq!(err.to_string(), "move selection failed: stdin closed");
    }
}
