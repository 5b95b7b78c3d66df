use std::io::{ErrorKind, Read};

use bytes::Bytes;
use gamewire_transport::WireStream;
use tracing::trace;

use crate::codec::{check_length, read_length, Frame, FrameConfig, LENGTH_PREFIX_SIZE};
use crate::error::{FrameError, Result};

/// Reads complete frames from any `Read` stream.
///
/// Each frame is read in two steps: exactly four length bytes, then exactly
/// `length` body bytes. Nothing past the current frame is consumed, so a
/// reader can be dropped between frames and a fresh one picks up where it
/// left off.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when the stream ends
    /// before the first length byte, and `Err(FrameError::Truncated { .. })`
    /// when it ends anywhere later in the frame.
    pub fn read_frame(&mut self) -> Result<Frame> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        match self.fill(&mut prefix)? {
            0 => return Err(FrameError::ConnectionClosed),
            n if n < LENGTH_PREFIX_SIZE => {
                return Err(FrameError::Truncated {
                    needed: LENGTH_PREFIX_SIZE,
                    received: n,
                })
            }
            _ => {}
        }

        let length = read_length(&prefix);
        check_length(length, self.config.max_payload_size)?;

        let mut body = vec![0u8; length];
        let received = self.fill(&mut body)?;
        if received < length {
            return Err(FrameError::Truncated {
                needed: length,
                received,
            });
        }

        let id = body[0];
        let payload = Bytes::from(body).slice(1..);
        trace!(id, len = payload.len(), "frame read");
        Ok(Frame { id, payload })
    }

    /// Read until `buf` is full or the stream ends. Returns bytes read.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(filled)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl FrameReader<WireStream> {
    /// Create a frame reader for a `WireStream` and apply the read timeout
    /// from config.
    pub fn with_config_stream(inner: WireStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(|err| FrameError::Io(err.into_io()))?;
        Ok(Self::with_config(inner, config))
    }
}
