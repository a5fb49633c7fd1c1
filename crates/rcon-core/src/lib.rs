//! # rcon-core
//!
//! Protocol library for the BattlEye RCon remote console: log in with a
//! shared password, send console commands, read their replies, and
//! acknowledge the broadcast messages the server pushes in between.
//!
//! This crate has no dependency on sockets or on an async runtime. It is
//! used by the `rcon-client` binary and by its tests.
//!
//! - **`protocol`** – Message types and the binary codec: the `'B' 'E'`
//!   signature, CRC-32 checksum, sentinel byte and type tag, plus the
//!   per-type payload layouts.
//!
//! - **`session`** – The login / command / notice state machine, including
//!   reassembly of replies split across several datagrams.
//!
//! - **`transport`** – The `Transport` trait the session driver talks to,
//!   and a scripted in-memory implementation for tests.
//!
//! - **`client`** – `RconClient`, which runs a session over a transport and
//!   exposes `login` and `execute`.

pub mod client;
pub mod protocol;
pub mod session;
pub mod transport;

pub use client::{RconClient, RconError, DEFAULT_RECEIVE_TIMEOUT};
pub use protocol::codec::{decode_message, decode_request, encode_message, ProtocolError};
pub use protocol::messages::RconMessage;
pub use session::{Session, SessionAction, SessionError, SessionState};
pub use transport::{Received, Transport, TransportError};
