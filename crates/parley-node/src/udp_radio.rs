//! Radio emulated over UDP.
//!
//! Each datagram is the channel address followed by the frame:
//!
//! ```text
//! [address: u32 LE][frame: 2 bytes]
//! ```
//!
//! A radio only hears its own channel, so datagrams for any other address
//! are dropped on receipt. Nothing else about the frame is checked here.

use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use parley_core::{Radio, RadioError};
use tokio::net::UdpSocket;

/// Bytes of channel address in front of every frame.
pub const ADDRESS_PREFIX: usize = 4;

/// Buffer size for incoming datagrams. Frames are tiny, anything close to
/// this is garbage anyway.
const RECV_BUFFER_SIZE: usize = 512;

/// UDP socket standing in for the device radio.
#[derive(Debug)]
pub struct UdpRadio {
    socket: UdpSocket,
    local_addr: SocketAddr,
    peer: Option<SocketAddr>,
    address: Option<u32>,
    recv_buf: Vec<u8>,
}

impl UdpRadio {
    /// Bind to the specified address.
    pub async fn bind(addr: SocketAddr) -> Result<Self, RadioError> {
        let socket = UdpSocket::bind(addr).await?;
        let local_addr = socket.local_addr()?;

        tracing::info!(%local_addr, "radio bound");

        Ok(Self {
            socket,
            local_addr,
            peer: None,
            address: None,
            recv_buf: vec![0u8; RECV_BUFFER_SIZE],
        })
    }

    /// Set where transmitted frames go.
    pub fn connect(&mut self, peer: SocketAddr) {
        tracing::info!(%peer, "radio peer set");
        self.peer = Some(peer);
    }

    /// Address this socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait]
impl Radio for UdpRadio {
    fn tune(&mut self, address: u32) -> Result<(), RadioError> {
        self.address = Some(address);
        Ok(())
    }

    async fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        let address = self.address.ok_or(RadioError::NotTuned)?;
        let peer = self
            .peer
            .ok_or_else(|| RadioError::Other { reason: "no peer address set".to_string() })?;

        let mut datagram = BytesMut::with_capacity(ADDRESS_PREFIX + frame.len());
        datagram.put_u32_le(address);
        datagram.put_slice(frame);

        self.socket.send_to(&datagram, peer).await?;
        Ok(())
    }

    fn try_receive(&mut self) -> Result<Option<Bytes>, RadioError> {
        let address = self.address.ok_or(RadioError::NotTuned)?;

        loop {
            let (len, from) = match self.socket.try_recv_from(&mut self.recv_buf) {
                Ok(received) => received,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            let datagram = &self.recv_buf[..len];
            match datagram.split_first_chunk::<ADDRESS_PREFIX>() {
                Some((prefix, frame)) if u32::from_le_bytes(*prefix) == address => {
                    return Ok(Some(Bytes::copy_from_slice(frame)));
                },
                _ => {
                    tracing::trace!(%from, len, "datagram for another channel dropped");
                },
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    async fn pair() -> (UdpRadio, UdpRadio) {
        let any: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let mut a = UdpRadio::bind(any).await.unwrap();
        let mut b = UdpRadio::bind(any).await.unwrap();
        a.connect(b.local_addr());
        b.connect(a.local_addr());
        (a, b)
    }

    /// Poll until something arrives or a second has passed.
    async fn receive(radio: &mut UdpRadio) -> Option<Bytes> {
        for _ in 0..200 {
            if let Some(frame) = radio.try_receive().unwrap() {
                return Some(frame);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        None
    }

    #[tokio::test]
    async fn same_channel_hears_frames() {
        let (mut a, mut b) = pair().await;
        a.tune(0x6631_3430).unwrap();
        b.tune(0x6631_3430).unwrap();

        a.transmit(b"R1").await.unwrap();

        assert_eq!(receive(&mut b).await.as_deref(), Some(&b"R1"[..]));
    }

    #[tokio::test]
    async fn other_channel_is_dropped() {
        let (mut a, mut b) = pair().await;
        a.tune(1).unwrap();
        b.tune(2).unwrap();

        a.transmit(b"R1").await.unwrap();
        // same channel again so the test has something to wait for
        a.tune(2).unwrap();
        a.transmit(b"P1").await.unwrap();

        assert_eq!(receive(&mut b).await.as_deref(), Some(&b"P1"[..]));
        assert_eq!(b.try_receive().unwrap(), None);
    }

    #[tokio::test]
    async fn runt_datagrams_are_dropped() {
        let (a, mut b) = pair().await;
        b.tune(7).unwrap();

        a.socket.send_to(&[7, 0], b.local_addr()).await.unwrap();
        a.socket.send_to(&[7, 0, 0, 0, b'X', b'1'], b.local_addr()).await.unwrap();

        assert_eq!(receive(&mut b).await.as_deref(), Some(&b"X1"[..]));
    }

    #[tokio::test]
    async fn untuned_radio_refuses_io() {
        let (mut a, _b) = pair().await;

        assert!(matches!(a.transmit(b"R1").await, Err(RadioError::NotTuned)));
        assert!(matches!(a.try_receive(), Err(RadioError::NotTuned)));
    }

    #[tokio::test]
    async fn unconnected_radio_cannot_transmit() {
        let mut radio = UdpRadio::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        radio.tune(7).unwrap();

        assert!(matches!(radio.transmit(b"R1").await, Err(RadioError::Other { .. })));
    }
}
