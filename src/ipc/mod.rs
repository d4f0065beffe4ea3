//! IPC: JSON-over-Unix-socket protocol, server and client.

pub mod client;
pub mod protocol;
pub mod server;
