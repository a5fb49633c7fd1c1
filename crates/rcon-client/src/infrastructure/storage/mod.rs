//! Persistent settings for the RCon client.

pub mod config;
