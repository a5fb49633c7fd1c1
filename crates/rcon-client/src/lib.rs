//! rcon-client library entry point.
//!
//! Exposes the modules behind the `rcon` binary so that integration tests in
//! `tests/` and `main.rs` share the same module tree.
//!
//! The client logs in to a game server's RCon port over UDP, then either
//! runs a single command given on the command line or reads commands from
//! standard input until `exit` or `quit`. Server notices that arrive in the
//! meantime are acknowledged and echoed unless quiet mode is on.

/// Application layer: the console use case.
pub mod application;

/// Infrastructure layer: UDP transport and config file loading.
pub mod infrastructure;
