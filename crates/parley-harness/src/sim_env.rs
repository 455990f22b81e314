//! Simulated environment on turmoil's virtual clock.

use std::{future::Future, time::Duration};

use parley_core::Environment;

/// Environment for code running inside a turmoil simulation.
///
/// Turmoil runs every host on a paused tokio clock and advances it itself,
/// so `tokio::time` already reads virtual time here.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimEnv;

impl SimEnv {
    /// Create a simulated environment.
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SimEnv {
    type Instant = tokio::time::Instant;

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_advances_virtual_time() {
        let mut sim = turmoil::Builder::new().build();

        sim.client("sleeper", async {
            let env = SimEnv::new();
            let start = env.now();
            env.sleep(Duration::from_secs(5)).await;
            assert!(env.now() - start >= Duration::from_secs(5));
            Ok(())
        });

        assert!(sim.run().is_ok());
    }
}
