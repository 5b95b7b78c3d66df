use std::fmt;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use crate::error::Result;

/// A connected byte stream: TCP for game clients, a Unix domain socket for
/// local tooling.
pub struct WireStream {
    inner: WireStreamInner,
}

enum WireStreamInner {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

/// Where the other end of a [`WireStream`] is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerAddr {
    Tcp(std::net::SocketAddr),
    /// Unix peers are usually unnamed.
    Unix(Option<std::path::PathBuf>),
}

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerAddr::Tcp(addr) => write!(f, "{addr}"),
            PeerAddr::Unix(Some(path)) => write!(f, "unix:{}", path.display()),
            PeerAddr::Unix(None) => f.write_str("unix:unnamed"),
        }
    }
}

impl Read for WireStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            WireStreamInner::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for WireStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            WireStreamInner::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            WireStreamInner::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl From<TcpStream> for WireStream {
    fn from(stream: TcpStream) -> Self {
        Self {
            inner: WireStreamInner::Tcp(stream),
        }
    }
}

#[cfg(unix)]
impl From<std::os::unix::net::UnixStream> for WireStream {
    fn from(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: WireStreamInner::Unix(stream),
        }
    }
}

impl WireStream {
    /// A connected pair of Unix sockets. Handy for tests and in-process peers.
    #[cfg(unix)]
    pub fn pair() -> Result<(Self, Self)> {
        let (left, right) = std::os::unix::net::UnixStream::pair()?;
        Ok((left.into(), right.into()))
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            WireStreamInner::Tcp(stream) => stream.set_read_timeout(timeout)?,
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.set_read_timeout(timeout)?,
        }
        Ok(())
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            WireStreamInner::Tcp(stream) => stream.set_write_timeout(timeout)?,
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.set_write_timeout(timeout)?,
        }
        Ok(())
    }

    /// Disable Nagle on TCP streams. No-op for Unix sockets.
    pub fn set_nodelay(&self, nodelay: bool) -> Result<()> {
        if let WireStreamInner::Tcp(stream) = &self.inner {
            stream.set_nodelay(nodelay)?;
        }
        Ok(())
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = match &self.inner {
            WireStreamInner::Tcp(stream) => Self::from(stream.try_clone()?),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => Self::from(stream.try_clone()?),
        };
        Ok(cloned)
    }

    /// Shut down both directions. Blocked reads on any clone return EOF.
    ///
    /// A stream whose peer already went away reports `NotConnected`; that
    /// counts as success.
    pub fn shutdown(&self) -> Result<()> {
        let result = match &self.inner {
            WireStreamInner::Tcp(stream) => stream.shutdown(Shutdown::Both),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.shutdown(Shutdown::Both),
        };
        match result {
            Err(err) if err.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            other => Ok(other?),
        }
    }

    pub fn peer_addr(&self) -> Result<PeerAddr> {
        match &self.inner {
            WireStreamInner::Tcp(stream) => Ok(PeerAddr::Tcp(stream.peer_addr()?)),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => {
                let addr = stream.peer_addr()?;
                Ok(PeerAddr::Unix(addr.as_pathname().map(|p| p.to_path_buf())))
            }
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            WireStreamInner::Tcp(_) => "tcp",
            #[cfg(unix)]
            WireStreamInner::Unix(_) => "unix-domain-socket",
        }
    }
}

impl fmt::Debug for WireStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireStream")
            .field("type", &self.transport_name())
            .finish()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    #[test]
    fn pair_round_trips_bytes() {
        let (mut left, mut right) = WireStream::pair().unwrap();
        left.write_all(b"ping").unwrap();

        let mut buf = [0u8; 4];
        right.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");
        assert_eq!(left.transport_name(), "unix-domain-socket");
    }

    #[test]
    fn shutdown_unblocks_clone() {
        let (left, _right) = WireStream::pair().unwrap();
        let mut reader = left.try_clone().unwrap();

        let handle = std::thread::spawn(move || {
            let mut buf = [0u8; 1];
            reader.read(&mut buf).unwrap()
        });
        std::thread::sleep(std::time::Duration::from_millis(20));
        left.shutdown().unwrap();

        assert_eq!(handle.join().unwrap(), 0);
        // Second shutdown is harmless.
        left.shutdown().unwrap();
    }

    #[test]
    fn unix_pair_peer_is_unnamed() {
        let (left, _right) = WireStream::pair().unwrap();
        let addr = left.peer_addr().unwrap();
        assert_eq!(addr, PeerAddr::Unix(None));
        assert_eq!(addr.to_string(), "unix:unnamed");
    }

    #[test]
    fn timeouts_apply() {
        let (left, _right) = WireStream::pair().unwrap();
        left.set_read_timeout(Some(std::time::Duration::from_millis(5)))
            .unwrap();
        left.set_write_timeout(None).unwrap();
        left.set_nodelay(true).unwrap();

        let mut left = left;
        let mut buf = [0u8; 1];
        let err = left.read(&mut buf).unwrap_err();
        assert!(matches!(
            err.kind(),
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
        ));
    }
}
