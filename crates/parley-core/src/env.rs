//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples the exchange loop from the system clock.
//! The simulation harness plugs in turmoil's virtual clock, the node binary
//! plugs in tokio's real one, and the protocol logic is the same in both.
//!
//! # Invariants
//!
//! - Monotonicity: `env.now()` must never go backwards
//! - Isolation: Implementations must not share global state

use std::{fmt::Debug, future::Future, ops::Sub, time::Duration};

/// Abstract environment providing time and sleeping.
///
/// Protocol state machines never call this directly. They take an instant
/// as an argument, and only the driver reads the clock or sleeps.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Point in time produced by [`Environment::now`].
    ///
    /// Subtracting two instants yields the elapsed duration, saturating at
    /// zero.
    type Instant: Copy + Ord + Debug + Send + Sync + Sub<Output = Duration>;

    /// Returns the current time.
    ///
    /// # Invariants
    ///
    /// - Monotonicity: Subsequent calls must return times >= previous calls.
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// The only suspension point of the poll loop. Not cancellable.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}
