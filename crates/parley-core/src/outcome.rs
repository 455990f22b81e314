//! Outcome resolution.

use parley_proto::Move;

/// Points for `(own, opponent)` from one round.
///
/// Rock beats scissors, scissors beats paper, paper beats rock. Identical
/// moves draw. Always one of `(0, 0)`, `(1, 0)` or `(0, 1)`.
pub const fn resolve(own: Move, opponent: Move) -> (u8, u8) {
    if own as u8 == opponent as u8 {
        (0, 0)
    } else if own.beats() as u8 == opponent as u8 {
        (1, 0)
    } else {
        (0, 1)
    }
}
