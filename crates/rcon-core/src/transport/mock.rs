//! Scripted transport for unit and integration testing.
//!
//! Replies are queued up front and handed out one per `receive` call; once
//! the queue is empty every `receive` reports a timeout. Every datagram the
//! client sends is recorded so tests can decode and inspect it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::{Received, Transport, TransportError};
use crate::protocol::{encode_message, RconMessage};

/// In-memory [`Transport`] driven by a fixed script of inbound datagrams.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    inbound: VecDeque<Received>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_sends: bool,
}

impl ScriptedTransport {
    /// Creates a transport with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an encoded message as the next inbound datagram.
    pub fn push_message(&mut self, msg: &RconMessage) -> &mut Self {
        self.inbound.push_back(Received::Packet(encode_message(msg)));
        self
    }

    /// Queues raw bytes as the next inbound datagram.
    pub fn push_raw(&mut self, bytes: Vec<u8>) -> &mut Self {
        self.inbound.push_back(Received::Packet(bytes));
        self
    }

    /// Queues an explicit timeout.
    pub fn push_timeout(&mut self) -> &mut Self {
        self.inbound.push_back(Received::Timeout);
        self
    }

    /// Makes every subsequent `send` fail with [`TransportError::Closed`].
    pub fn fail_sends(&mut self) -> &mut Self {
        self.fail_sends = true;
        self
    }

    /// Shared handle to the log of sent datagrams; stays valid after the
    /// transport has been moved into a client.
    pub fn sent_log(&self) -> Arc<Mutex<Vec<Vec<u8>>>> {
        Arc::clone(&self.sent)
    }

    /// Number of inbound datagrams not yet consumed.
    pub fn remaining(&self) -> usize {
        self.inbound.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&mut self, packet: &[u8]) -> Result<(), TransportError> {
        if self.fail_sends {
            return Err(TransportError::Closed);
        }
        // A test that panicked while holding the log must not hide later sends.
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(packet.to_vec());
        Ok(())
    }

    async fn receive(&mut self, _timeout: Duration) -> Result<Received, TransportError> {
        Ok(self.inbound.pop_front().unwrap_or(Received::Timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_transport_replays_queue_then_times_out() {
        // Arrange
        let mut transport = ScriptedTransport::new();
        transport.push_raw(vec![1, 2, 3]);

        // Act
        let first = transport.receive(Duration::from_millis(1)).await.unwrap();
        let second = transport.receive(Duration::from_millis(1)).await.unwrap();

        // Assert
        assert_eq!(first, Received::Packet(vec![1, 2, 3]));
        assert_eq!(second, Received::Timeout);
    }

    #[tokio::test]
    async fn test_scripted_transport_records_sends() {
        let mut transport = ScriptedTransport::new();
        let log = transport.sent_log();

        transport.send(&[9, 9]).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec![vec![9u8, 9]]);
    }

    #[tokio::test]
    async fn test_scripted_transport_records_sends_after_log_lock_poisoned() {
        // Arrange – poison the log by panicking while it is locked
        let mut transport = ScriptedTransport::new();
        let log = transport.sent_log();
        let poisoner = Arc::clone(&log);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the sent log");
        })
        .join();
        assert!(log.is_poisoned());

        // Act
        let result = transport.send(&[7]).await;

        // Assert
        assert!(result.is_ok());
        let sent = log.lock().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(*sent, vec![vec![7u8]]);
    }

    #[tokio::test]
    async fn test_scripted_transport_can_fail_sends() {
        let mut transport = ScriptedTransport::new();
        transport.fail_sends();
        assert!(matches!(
            transport.send(&[0]).await,
            Err(TransportError::Closed)
        ));
    }
}
