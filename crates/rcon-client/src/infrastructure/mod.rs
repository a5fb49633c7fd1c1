//! Infrastructure layer for the RCon client.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `rcon_core`, but is not imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`network`** – `UdpTransport`, the tokio UDP implementation of
//!   [`rcon_core::Transport`].
//!
//! - **`storage`** – Loads the password and receive timeout from the
//!   client's config file.

pub mod network;
pub mod storage;
