//! Drives a [`Session`] over a [`Transport`].
//!
//! `RconClient` is the caller-facing API: it encodes whatever the session
//! wants to send, waits a bounded time for each reply, decodes it and feeds
//! it back to the session. Exactly one request is in flight at a time.
//!
//! Nothing here retries. A timeout, a corrupt packet or an out-of-place
//! message ends the operation with an [`RconError`]; whether to reconnect is
//! up to the caller.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, trace};

use crate::protocol::{decode_message, encode_message, hex_dump, ProtocolError, RconMessage};
use crate::session::{Session, SessionAction, SessionError};
use crate::transport::{Received, Transport, TransportError};

/// How long to wait for each inbound datagram unless configured otherwise.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_millis(500);

/// Everything that can end a `login` or `execute` call.
#[derive(Debug, Error)]
pub enum RconError {
    /// A received datagram failed framing, checksum or type checks.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A valid message was illegal in the session's current state, or the
    /// login was rejected.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// No datagram arrived within the receive timeout.
    #[error("no reply from server within {0:?}")]
    Timeout(Duration),

    /// The underlying socket failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl RconError {
    /// Whether the server rejected the password.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, RconError::Session(SessionError::AuthenticationFailed))
    }
}

/// An RCon connection: transport, session state and receive timeout.
pub struct RconClient<T: Transport> {
    transport: T,
    session: Session,
    receive_timeout: Duration,
}

impl<T: Transport> RconClient<T> {
    /// Wraps an already connected transport with a fresh session.
    pub fn new(transport: T) -> Self {
        Self::with_session(transport, Session::new())
    }

    /// Wraps a transport with a caller-supplied session.
    pub fn with_session(transport: T, session: Session) -> Self {
        Self {
            transport,
            session,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
        }
    }

    /// Sets the per-datagram receive timeout.
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Read-only view of the session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Gives the transport back, e.g. to close it.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Authenticates with the shared secret.
    ///
    /// Server notices that arrive before the login result are acknowledged
    /// and dropped.
    ///
    /// # Errors
    ///
    /// [`RconError::Session`] with [`SessionError::AuthenticationFailed`] when
    /// the password is rejected, or any other [`RconError`].
    pub async fn login(&mut self, password: &str) -> Result<(), RconError> {
        let result = self.run_login(password).await;
        if result.is_err() {
            self.session.abort();
        }
        result
    }

    /// Runs one command and returns its complete response.
    ///
    /// Server notices received while waiting are passed to `on_notice` and
    /// acknowledged before the response is returned.
    ///
    /// # Errors
    ///
    /// Any [`RconError`]; none are retried.
    pub async fn execute<F>(&mut self, command: &str, on_notice: F) -> Result<String, RconError>
    where
        F: FnMut(&str),
    {
        let result = self.run_command(command, on_notice).await;
        if result.is_err() {
            self.session.abort();
        }
        result
    }

    async fn run_login(&mut self, password: &str) -> Result<(), RconError> {
        let login = self.session.begin_login(password)?;
        self.send(&login).await?;

        loop {
            let msg = self.receive().await?;
            match self.session.handle(msg)? {
                SessionAction::LoggedIn => {
                    info!("logged in");
                    return Ok(());
                }
                SessionAction::Notice { text, ack } => {
                    debug!("notice before login result: {text}");
                    self.send(&ack).await?;
                }
                // The session only yields these while a command is pending.
                SessionAction::Pending | SessionAction::Response(_) => {}
            }
        }
    }

    async fn run_command<F>(&mut self, command: &str, mut on_notice: F) -> Result<String, RconError>
    where
        F: FnMut(&str),
    {
        let cmd = self.session.begin_command(command)?;
        self.send(&cmd).await?;

        loop {
            let msg = self.receive().await?;
            match self.session.handle(msg)? {
                SessionAction::Response(text) => return Ok(text),
                SessionAction::Notice { text, ack } => {
                    on_notice(&text);
                    self.send(&ack).await?;
                }
                SessionAction::Pending | SessionAction::LoggedIn => {}
            }
        }
    }

    async fn send(&mut self, msg: &RconMessage) -> Result<(), RconError> {
        let bytes = encode_message(msg);
        debug!(kind = %msg.kind(), sequence = ?msg.sequence(), len = bytes.len(), "send");
        trace!("\n{}", hex_dump(&bytes));
        self.transport.send(&bytes).await?;
        Ok(())
    }

    async fn receive(&mut self) -> Result<RconMessage, RconError> {
        match self.transport.receive(self.receive_timeout).await? {
            Received::Packet(bytes) => {
                trace!("\n{}", hex_dump(&bytes));
                let msg = decode_message(&bytes)?;
                debug!(kind = %msg.kind(), sequence = ?msg.sequence(), len = bytes.len(), "receive");
                Ok(msg)
            }
            Received::Timeout => Err(RconError::Timeout(self.receive_timeout)),
        }
    }
}
