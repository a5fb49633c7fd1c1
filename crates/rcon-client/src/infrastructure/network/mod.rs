//! UDP transport for the RCon client.
//!
//! `UdpTransport` owns a tokio [`UdpSocket`] connected to the server, so the
//! kernel filters out datagrams from any other peer. Each `receive` waits at
//! most the given timeout for one datagram of up to [`MAX_PACKET_SIZE`] bytes.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use rcon_core::protocol::MAX_PACKET_SIZE;
use rcon_core::{Received, Transport, TransportError};
use tokio::net::{lookup_host, UdpSocket};
use tokio::time;
use tracing::{debug, info};

/// A UDP socket connected to one RCon server.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpTransport {
    /// Resolves `host:port`, binds an ephemeral local port of the same
    /// address family and connects the socket to the first address found.
    ///
    /// # Errors
    ///
    /// [`TransportError::Resolve`] if the name resolves to nothing,
    /// [`TransportError::Io`] if resolution, bind or connect fail.
    pub async fn connect(host: &str, port: u16) -> Result<Self, TransportError> {
        let target = format!("{host}:{port}");
        let found = lookup_host(target.as_str()).await?.next();
        let peer = found.ok_or(TransportError::Resolve { target })?;
        Self::connect_addr(peer).await
    }

    /// Connects to an already resolved address.
    ///
    /// # Errors
    ///
    /// [`TransportError::Io`] if bind or connect fail.
    pub async fn connect_addr(peer: SocketAddr) -> Result<Self, TransportError> {
        let local: SocketAddr = if peer.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(peer).await?;
        info!(%peer, local = %socket.local_addr()?, "UDP socket connected");
        Ok(Self { socket, peer })
    }

    /// The server address this socket is connected to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// The local address the socket is bound to.
    ///
    /// # Errors
    ///
    /// Propagates the OS error from `getsockname`.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&mut self, packet: &[u8]) -> Result<(), TransportError> {
        let written = self.socket.send(packet).await?;
        if written != packet.len() {
            return Err(TransportError::PartialWrite {
                written,
                expected: packet.len(),
            });
        }
        Ok(())
    }

    async fn receive(&mut self, timeout: Duration) -> Result<Received, TransportError> {
        let mut buf = vec![0u8; MAX_PACKET_SIZE];
        match time::timeout(timeout, self.socket.recv(&mut buf)).await {
            Ok(Ok(n)) => {
                buf.truncate(n);
                Ok(Received::Packet(buf))
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                debug!(peer = %self.peer, ?timeout, "receive timed out");
                Ok(Received::Timeout)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
