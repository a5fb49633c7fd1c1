//! Session state machine for one RCon connection.
//!
//! The machine performs no I/O. The caller asks it for the next outbound
//! message ([`Session::begin_login`], [`Session::begin_command`]), sends it,
//! and feeds every decoded inbound message to [`Session::handle`], which
//! returns what to do next.
//!
//! ```text
//!  Unauthenticated ──begin_login──▶ AwaitingLogin ──LoginResult(≠0)──▶ Idle
//!                                        │                             │  ▲
//!                                LoginResult(0)                begin_command │
//!                                        ▼                             ▼  │
//!                                      Failed ◀──any error── AwaitingCommandReply
//! ```
//!
//! `ServerNotice` may arrive while a login or command reply is pending. It is
//! handed back as [`SessionAction::Notice`] together with the acknowledgement
//! to send, and leaves both the state and any partial reassembly untouched.
//!
//! # What is a state machine? (for beginners)
//!
//! A *state machine* is a value that is always in exactly one of a fixed set
//! of states, and moves between them only in response to specific inputs.
//! Here the states are the variants of [`SessionState`], and the inputs are
//! the caller's requests (`begin_login`, `begin_command`) plus every message
//! the server sends.
//!
//! Writing the protocol this way makes illegal situations easy to spot.  For
//! example, a `CommandResult` while we are still waiting for the login result
//! makes no sense, so the `(AwaitingLogin, CommandResult)` combination simply
//! has no arm in [`Session::handle`] other than the catch-all error.  The
//! compiler's exhaustive `match` checking guarantees every state/message pair
//! is handled somewhere.
//!
//! # Why does the session do no I/O?
//!
//! The machine never touches a socket or a clock.  It only says "send this"
//! or "keep receiving" through [`SessionAction`].  That split means:
//!
//! - **Unit tests are plain function calls** – feed a message, check the
//!   returned action and the new state.  No network or async runtime is
//!   needed.
//! - **Timeouts live in the driver** – [`crate::client::RconClient`] owns the
//!   receive timeout and calls [`Session::abort`] when it expires, so the
//!   session ends up `Failed` exactly as if the server had misbehaved.
//!
//! # Multi-part replies
//!
//! A reply too large for one UDP datagram arrives as several
//! `CommandResultPart` fragments, each carrying its index and the total
//! count.  UDP may deliver them in any order, so they are stored by index in
//! a [`reassembly::Reassembly`] buffer and concatenated only once every slot
//! is filled.
//!
//! # Example
//!
//! ```rust
//! use rcon_core::{RconMessage, Session, SessionAction, SessionState};
//!
//! let mut session = Session::new();
//! session.begin_login("secret").unwrap();
//! assert_eq!(
//!     session.handle(RconMessage::LoginResult { result: 1 }).unwrap(),
//!     SessionAction::LoggedIn
//! );
//!
//! session.begin_command("say -1 hi").unwrap();
//! let part = |part_index, text: &str| RconMessage::CommandResultPart {
//!     total_parts: 2,
//!     part_index,
//!     text: text.to_string(),
//! };
//! assert_eq!(session.handle(part(1, "world")).unwrap(), SessionAction::Pending);
//! assert_eq!(
//!     session.handle(part(0, "hello ")).unwrap(),
//!     SessionAction::Response("hello world".to_string())
//! );
//! assert_eq!(session.state(), SessionState::Idle);
//! ```

pub mod reassembly;

use thiserror::Error;
use tracing::{debug, warn};

use crate::protocol::{MessageKind, RconMessage, SequenceCounter};
use reassembly::Reassembly;

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No login has been sent yet.
    Unauthenticated,
    /// `Login` sent, waiting for `LoginResult`.
    AwaitingLogin,
    /// Logged in, no command in flight.
    Idle,
    /// `Command` with `sequence` sent, waiting for its reply.
    AwaitingCommandReply { sequence: u8 },
    /// An error ended the session.
    Failed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Unauthenticated => f.write_str("unauthenticated"),
            SessionState::AwaitingLogin => f.write_str("awaiting login result"),
            SessionState::Idle => f.write_str("idle"),
            SessionState::AwaitingCommandReply { sequence } => {
                write!(f, "awaiting reply to command {sequence}")
            }
            SessionState::Failed => f.write_str("failed"),
        }
    }
}

/// What the caller should do after [`Session::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// The server accepted the login.
    LoggedIn,
    /// A server notice arrived; show `text` and send `ack`. Keep receiving.
    Notice { text: String, ack: RconMessage },
    /// A fragment was stored; keep receiving.
    Pending,
    /// The pending command's complete response.
    Response(String),
}

/// Errors raised by the state machine. All of them are terminal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The server answered the login with result 0.
    #[error("login rejected by server: wrong RCon password")]
    AuthenticationFailed,

    /// A well-formed message arrived that is not legal in the current state.
    #[error("unexpected {kind} message while {state}")]
    UnexpectedMessage {
        state: SessionState,
        kind: MessageKind,
    },

    /// A command result answered a different command than the pending one.
    #[error("command result for sequence {received}, expected {expected}")]
    SequenceMismatch { expected: u8, received: u8 },

    /// A multi-part fragment is inconsistent with the response being built.
    #[error("invalid response fragment {part_index}/{total_parts}: {reason}")]
    InvalidFragment {
        total_parts: u8,
        part_index: u8,
        reason: &'static str,
    },

    /// The caller asked for an operation the current state does not allow.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// An earlier error already ended this session.
    #[error("session has already failed")]
    Terminated,
}

/// The per-connection state: current phase, command counter, and any
/// partially reassembled reply.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    sequence: SequenceCounter,
    reassembly: Option<Reassembly>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session whose first command gets sequence number 0.
    pub fn new() -> Self {
        Self::with_sequence(SequenceCounter::new())
    }

    /// Creates a session that numbers commands from `sequence`.
    pub fn with_sequence(sequence: SequenceCounter) -> Self {
        Self {
            state: SessionState::Unauthenticated,
            sequence,
            reassembly: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Sequence number the next command will be stamped with.
    pub fn next_sequence(&self) -> u8 {
        self.sequence.current()
    }

    /// Builds the `Login` message and moves to `AwaitingLogin`.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidState`] unless the session is `Unauthenticated`.
    pub fn begin_login(&mut self, password: &str) -> Result<RconMessage, SessionError> {
        self.require(SessionState::Unauthenticated, "log in")?;
        self.state = SessionState::AwaitingLogin;
        Ok(RconMessage::Login {
            password: password.to_string(),
        })
    }

    /// Stamps `command` with the next sequence number, clears any leftover
    /// fragments and moves to `AwaitingCommandReply`.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidState`] unless the session is `Idle`.
    pub fn begin_command(&mut self, command: &str) -> Result<RconMessage, SessionError> {
        self.require(SessionState::Idle, "send a command")?;
        let sequence = self.sequence.next();
        self.reassembly = None;
        self.state = SessionState::AwaitingCommandReply { sequence };
        Ok(RconMessage::Command {
            sequence,
            command: command.to_string(),
        })
    }

    /// Advances the machine with one decoded inbound message.
    ///
    /// # Errors
    ///
    /// Any [`SessionError`]; the session is `Failed` afterwards.
    pub fn handle(&mut self, message: RconMessage) -> Result<SessionAction, SessionError> {
        if self.state == SessionState::Failed {
            return Err(SessionError::Terminated);
        }
        let result = self.transition(message);
        if let Err(ref e) = result {
            warn!(state = %self.state, "session failed: {e}");
            self.state = SessionState::Failed;
            self.reassembly = None;
        }
        result
    }

    fn transition(&mut self, message: RconMessage) -> Result<SessionAction, SessionError> {
        match (self.state, message) {
            (
                SessionState::AwaitingLogin | SessionState::AwaitingCommandReply { .. },
                RconMessage::ServerNotice { sequence, text },
            ) => {
                debug!(sequence, "server notice");
                Ok(SessionAction::Notice {
                    text,
                    ack: RconMessage::ServerNoticeAck { sequence },
                })
            }

            (SessionState::AwaitingLogin, RconMessage::LoginResult { result }) => {
                if result == 0 {
                    return Err(SessionError::AuthenticationFailed);
                }
                self.state = SessionState::Idle;
                Ok(SessionAction::LoggedIn)
            }

            (
                SessionState::AwaitingCommandReply { sequence: expected },
                RconMessage::CommandResult { sequence, text },
            ) => {
                if sequence != expected {
                    return Err(SessionError::SequenceMismatch {
                        expected,
                        received: sequence,
                    });
                }
                self.finish_command();
                Ok(SessionAction::Response(text))
            }

            (
                SessionState::AwaitingCommandReply { sequence },
                RconMessage::CommandResultPart {
                    total_parts,
                    part_index,
                    text,
                },
            ) => {
                let mut buf = match self.reassembly.take() {
                    Some(buf) => buf,
                    None => Reassembly::new(total_parts)?,
                };
                debug!(sequence, total_parts, part_index, "response fragment");
                match buf.insert(total_parts, part_index, text)? {
                    Some(full) => {
                        self.finish_command();
                        Ok(SessionAction::Response(full))
                    }
                    None => {
                        self.reassembly = Some(buf);
                        Ok(SessionAction::Pending)
                    }
                }
            }

            (state, message) => Err(SessionError::UnexpectedMessage {
                state,
                kind: message.kind(),
            }),
        }
    }

    /// Marks the session failed after an error outside the state machine
    /// (timeout, corrupt packet, socket failure).
    pub fn abort(&mut self) {
        self.state = SessionState::Failed;
        self.reassembly = None;
    }

    fn finish_command(&mut self) {
        self.reassembly = None;
        self.state = SessionState::Idle;
    }

    fn require(
        &mut self,
        expected: SessionState,
        operation: &'static str,
    ) -> Result<(), SessionError> {
        match self.state {
            SessionState::Failed => Err(SessionError::Terminated),
            state if state == expected => Ok(()),
            state => Err(SessionError::InvalidState { operation, state }),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
