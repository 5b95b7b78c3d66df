use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::WireStream;

/// TCP listener for game clients.
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen. Port `0` picks a free port; see [`TcpTransport::local_addr`].
    pub fn bind(addr: impl ToSocketAddrs + std::fmt::Debug) -> Result<Self> {
        let listener = TcpListener::bind(&addr).map_err(|e| TransportError::Bind {
            addr: format!("{addr:?}"),
            source: e,
        })?;
        let local_addr = listener.local_addr()?;

        info!(%local_addr, "listening on tcp");
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<WireStream> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        stream.set_nodelay(true)?;
        debug!(%peer, "accepted tcp connection");
        Ok(stream.into())
    }

    /// Connect to a listening TCP address (blocking).
    pub fn connect(addr: impl ToSocketAddrs + std::fmt::Debug) -> Result<WireStream> {
        let stream = TcpStream::connect(&addr).map_err(|e| TransportError::Connect {
            addr: format!("{addr:?}"),
            source: e,
        })?;
        stream.set_nodelay(true)?;
        debug!(?addr, "connected over tcp");
        Ok(stream.into())
    }

    /// Connect with an upper bound on the handshake time.
    pub fn connect_timeout(addr: &SocketAddr, timeout: Duration) -> Result<WireStream> {
        let stream =
            TcpStream::connect_timeout(addr, timeout).map_err(|e| TransportError::Connect {
                addr: addr.to_string(),
                source: e,
            })?;
        stream.set_nodelay(true)?;
        debug!(%addr, "connected over tcp");
        Ok(stream.into())
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "tcp"
    }
}
