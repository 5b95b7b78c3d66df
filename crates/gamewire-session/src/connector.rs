use std::net::ToSocketAddrs;
#[cfg(unix)]
use std::path::Path;

use gamewire_registry::RegistryHandle;
use gamewire_transport::TcpTransport;
#[cfg(unix)]
use gamewire_transport::UnixDomainSocket;
use gamewire_transport::WireStream;

use crate::config::SessionConfig;
use crate::connection::Connection;
use crate::error::Result;

/// Connect to a TCP listener as a client.
pub fn connect_tcp(
    addr: impl ToSocketAddrs + std::fmt::Debug,
    registry: RegistryHandle,
) -> Result<Connection> {
    connect_tcp_with_config(addr, registry, SessionConfig::default())
}

/// Connect over TCP with explicit configuration.
pub fn connect_tcp_with_config(
    addr: impl ToSocketAddrs + std::fmt::Debug,
    registry: RegistryHandle,
    config: SessionConfig,
) -> Result<Connection> {
    let stream = TcpTransport::connect(addr)?;
    start(stream, registry, config)
}

/// Connect to a Unix domain socket listener as a client.
#[cfg(unix)]
pub fn connect_unix(path: impl AsRef<Path>, registry: RegistryHandle) -> Result<Connection> {
    connect_unix_with_config(path, registry, SessionConfig::default())
}

/// Connect over a Unix domain socket with explicit configuration.
#[cfg(unix)]
pub fn connect_unix_with_config(
    path: impl AsRef<Path>,
    registry: RegistryHandle,
    config: SessionConfig,
) -> Result<Connection> {
    let stream = UnixDomainSocket::connect(path)?;
    start(stream, registry, config)
}

// Client connections are named after the server they talk to.
fn start(stream: WireStream, registry: RegistryHandle, config: SessionConfig) -> Result<Connection> {
    let id = match stream.peer_addr() {
        Ok(addr) => format!("{}:{addr}", stream.transport_name()),
        Err(_) => stream.transport_name().to_string(),
    };
    Connection::new(id, stream, registry, config)
}
