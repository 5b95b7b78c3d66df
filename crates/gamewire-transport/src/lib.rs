//! Byte-stream transports for gamewire.
//!
//! - TCP for game clients
//! - Unix domain sockets for local tooling
//!
//! Both produce a [`WireStream`], the type every higher layer reads frames
//! from and writes frames to.

pub mod error;
pub mod stream;
pub mod tcp;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use stream::{PeerAddr, WireStream};
pub use tcp::TcpTransport;

#[cfg(unix)]
pub use uds::UnixDomainSocket;
