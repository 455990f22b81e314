//! Radio on the simulated medium.

use async_trait::async_trait;
use bytes::Bytes;
use parley_core::{Radio, RadioError};

use crate::ether::Ether;

/// A station on an [`Ether`].
///
/// Created with [`Ether::radio`]. Hears nothing until tuned.
#[derive(Debug, Clone)]
pub struct SimRadio {
    ether: Ether,
    station: usize,
}

impl SimRadio {
    pub(crate) fn new(ether: Ether, station: usize) -> Self {
        Self { ether, station }
    }

    /// Index of this station on its medium.
    pub fn station(&self) -> usize {
        self.station
    }
}

#[async_trait]
impl Radio for SimRadio {
    fn tune(&mut self, address: u32) -> Result<(), RadioError> {
        self.ether.tune(self.station, address);
        Ok(())
    }

    async fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        let address = self.ether.address(self.station).ok_or(RadioError::NotTuned)?;
        self.ether.broadcast(self.station, address, frame);
        Ok(())
    }

    fn try_receive(&mut self) -> Result<Option<Bytes>, RadioError> {
        if self.ether.address(self.station).is_none() {
            return Err(RadioError::NotTuned);
        }
        Ok(self.ether.take(self.station))
    }
}
