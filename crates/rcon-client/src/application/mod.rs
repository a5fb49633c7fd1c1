//! Application layer use cases for the RCon client.
//!
//! - **`console`** – Runs commands against a logged-in [`rcon_core::RconClient`]
//!   and writes responses and server notices to an output sink. Supports a
//!   single command or an interactive read-eval loop over any line source.

pub mod console;
