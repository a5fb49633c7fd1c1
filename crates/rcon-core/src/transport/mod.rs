//! The datagram transport seam.
//!
//! The session driver only needs two things from the network: send one
//! datagram, and wait a bounded time for the next one. Keeping that behind a
//! trait lets this crate stay free of sockets; the UDP implementation lives in
//! the `rcon-client` crate and tests use [`mock::ScriptedTransport`].

pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a [`Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// An I/O error occurred on the socket.
    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket accepted fewer bytes than the datagram holds.
    #[error("partial write: {written} of {expected} bytes sent")]
    PartialWrite { written: usize, expected: usize },

    /// The remote address could not be resolved.
    #[error("could not resolve {target}")]
    Resolve { target: String },

    /// The transport has no more data and never will.
    #[error("transport closed")]
    Closed,
}

/// Outcome of a bounded receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// One complete datagram.
    Packet(Vec<u8>),
    /// Nothing arrived within the timeout.
    Timeout,
}

/// A connected datagram channel to the RCon server.
#[async_trait]
pub trait Transport: Send {
    /// Sends one datagram.
    ///
    /// # Errors
    ///
    /// Fails with [`TransportError`] on a failed or partial write.
    async fn send(&mut self, packet: &[u8]) -> Result<(), TransportError>;

    /// Waits up to `timeout` for one datagram.
    ///
    /// # Errors
    ///
    /// Fails with [`TransportError`] if the socket reports an error.
    async fn receive(&mut self, timeout: Duration) -> Result<Received, TransportError>;
}
