//! Connection loops for gamewire.
//!
//! A [`Connection`] wraps one stream with a receive thread that decodes
//! packets into a bounded queue and a send thread that encodes queued
//! packets. [`ConnectionListener`] and the `connect_*` functions produce
//! connections over TCP or Unix domain sockets.

pub mod config;
pub mod connection;
pub mod connector;
pub mod error;
pub mod listener;

pub use config::SessionConfig;
pub use connection::{Connection, PacketSender};
#[cfg(unix)]
pub use connector::{connect_unix, connect_unix_with_config};
pub use connector::{connect_tcp, connect_tcp_with_config};
pub use error::{Result, SessionError};
pub use listener::ConnectionListener;
