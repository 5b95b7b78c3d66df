use std::net::{SocketAddr, ToSocketAddrs};
#[cfg(unix)]
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use gamewire_registry::RegistryHandle;
use gamewire_transport::TcpTransport;
#[cfg(unix)]
use gamewire_transport::UnixDomainSocket;
use gamewire_transport::WireStream;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::connection::Connection;
use crate::error::Result;

enum Acceptor {
    Tcp(TcpTransport),
    #[cfg(unix)]
    Unix(UnixDomainSocket),
}

/// Listens for and accepts connections.
pub struct ConnectionListener {
    acceptor: Acceptor,
    registry: RegistryHandle,
    config: SessionConfig,
    next_conn_id: AtomicU64,
}

impl ConnectionListener {
    /// Listen on a TCP address. Port 0 picks a free port.
    pub fn bind_tcp(
        addr: impl ToSocketAddrs + std::fmt::Debug,
        registry: RegistryHandle,
    ) -> Result<Self> {
        let transport = TcpTransport::bind(addr)?;
        info!(addr = %transport.local_addr(), "listening on tcp");
        Ok(Self::from_acceptor(Acceptor::Tcp(transport), registry))
    }

    /// Listen on a Unix domain socket path.
    #[cfg(unix)]
    pub fn bind_unix(path: impl AsRef<Path>, registry: RegistryHandle) -> Result<Self> {
        let socket = UnixDomainSocket::bind(path)?;
        info!(path = %socket.path().display(), "listening on unix socket");
        Ok(Self::from_acceptor(Acceptor::Unix(socket), registry))
    }

    fn from_acceptor(acceptor: Acceptor, registry: RegistryHandle) -> Self {
        Self {
            acceptor,
            registry,
            config: SessionConfig::default(),
            next_conn_id: AtomicU64::new(1),
        }
    }

    /// Override the config handed to accepted connections.
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Swap the registry handed to accepted connections.
    pub fn with_registry(mut self, registry: RegistryHandle) -> Self {
        self.registry = registry;
        self
    }

    /// Accept next connection and assign an auto-generated id.
    pub fn accept(&self) -> Result<Connection> {
        let id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        self.accept_with_id(&format!("conn-{id}"))
    }

    /// Accept next connection under an explicit id.
    pub fn accept_with_id(&self, conn_id: &str) -> Result<Connection> {
        let stream = self.accept_stream()?;
        debug!(conn = conn_id, "accepted connection");
        Connection::new(
            conn_id,
            stream,
            RegistryHandle::clone(&self.registry),
            self.config.clone(),
        )
    }

    fn accept_stream(&self) -> Result<WireStream> {
        let stream = match &self.acceptor {
            Acceptor::Tcp(transport) => transport.accept()?,
            #[cfg(unix)]
            Acceptor::Unix(socket) => socket.accept()?,
        };
        Ok(stream)
    }

    /// Bound TCP address, if listening on TCP.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.acceptor {
            Acceptor::Tcp(transport) => Some(transport.local_addr()),
            #[cfg(unix)]
            Acceptor::Unix(_) => None,
        }
    }

    /// Bound socket path, if listening on a Unix domain socket.
    #[cfg(unix)]
    pub fn path(&self) -> Option<&Path> {
        match &self.acceptor {
            Acceptor::Tcp(_) => None,
            Acceptor::Unix(socket) => Some(socket.path()),
        }
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use gamewire_packet::catalog::{self, P_TEST};
    use gamewire_packet::Packet;

    use super::*;
    use crate::connector::connect_tcp;

    fn registry() -> RegistryHandle {
        catalog::handle().expect("catalog should register")
    }

    #[test]
    fn accepts_multiple_sequential_connections() {
        let listener = ConnectionListener::bind_tcp("127.0.0.1:0", registry())
            .expect("listener should bind");
        let addr = listener.local_addr().expect("tcp listener has an address");

        let server = thread::spawn(move || {
            let first = listener.accept().expect("first accept should succeed");
            let second = listener.accept().expect("second accept should succeed");
            assert_eq!(first.id(), "conn-1");
            assert_eq!(second.id(), "conn-2");
            assert!(first.peer_addr().is_some());
        });

        let _c1 = connect_tcp(addr, registry()).expect("first client should connect");
        let _c2 = connect_tcp(addr, registry()).expect("second client should connect");
        server.join().expect("server thread should finish");
    }

    #[test]
    fn accept_with_id_and_echo() {
        let listener = ConnectionListener::bind_tcp("127.0.0.1:0", registry())
            .expect("listener should bind")
            .with_config(SessionConfig {
                inbound_capacity: 4,
                ..SessionConfig::default()
            });
        assert_eq!(listener.config().inbound_capacity, 4);
        let addr = listener.local_addr().expect("tcp listener has an address");

        let server = thread::spawn(move || {
            let conn = listener
                .accept_with_id("player-7")
                .expect("listener should accept");
            assert_eq!(conn.id(), "player-7");
            let packet = conn
                .recv_timeout(Duration::from_secs(5))
                .expect("packet should arrive");
            conn.send(packet).expect("echo should queue");
        });

        let client = connect_tcp(addr, registry()).expect("client should connect");
        client
            .send(Packet::new(P_TEST, 31i64))
            .expect("send should queue");
        let echoed = client
            .recv_timeout(Duration::from_secs(5))
            .expect("echo should arrive");
        assert_eq!(echoed, Packet::new(P_TEST, 31i64));
        server.join().expect("server thread should finish");
    }

    #[cfg(unix)]
    #[test]
    fn unix_listener_reports_path() {
        let dir = std::env::temp_dir().join(format!(
            "gamewire-listen-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        let sock_path = dir.join("listener.sock");

        let listener =
            ConnectionListener::bind_unix(&sock_path, registry()).expect("listener should bind");
        assert_eq!(listener.path(), Some(sock_path.as_path()));
        assert!(listener.local_addr().is_none());

        drop(listener);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
