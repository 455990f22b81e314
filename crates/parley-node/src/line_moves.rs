//! Interactive move selection.

use async_trait::async_trait;
use parley_core::{DriverError, MoveSource, Score};
use parley_proto::{Move, RoundNumber};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Reads one move per line from the terminal.
pub type StdinMoves = LineMoves<BufReader<Stdin>>;

impl StdinMoves {
    /// Read moves from standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

/// Reads moves line by line, asking again on anything that is not a move.
///
/// Accepts `r`, `p`, `s` or the full names, in any case.
#[derive(Debug)]
pub struct LineMoves<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> LineMoves<R> {
    /// Read moves from `reader`.
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines() }
    }
}

#[async_trait]
impl<R> MoveSource for LineMoves<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn choose(&mut self, round: RoundNumber, score: Score) -> Result<Move, DriverError> {
        loop {
            tracing::info!(%round, %score, "choose your move: r(ock), p(aper) or s(cissors)");

            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| DriverError::Selection { reason: e.to_string() })?
                .ok_or_else(|| DriverError::Selection { reason: "input closed".to_string() })?;

            match line.parse::<Move>() {
                Ok(choice) => return Ok(choice),
                Err(e) => tracing::warn!(error = %e, "try again"),
            }
        }
    }
}
