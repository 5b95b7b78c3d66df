use std::io::Write;

use bytes::BytesMut;
use gamewire_transport::WireStream;
use tracing::trace;

use crate::codec::{encode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

/// Writes complete frames to any `Write` stream.
///
/// The length prefix, id and payload are assembled in one scratch buffer,
/// handed to the stream with a single `write_all`, then flushed. A peer that
/// stops accepting bytes mid-frame shows up as [`FrameError::Io`] with kind
/// `WriteZero`; a write timeout shows up as `WouldBlock` or `TimedOut`.
pub struct FrameWriter<T> {
    inner: T,
    scratch: BytesMut,
    max_payload_size: usize,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            scratch: BytesMut::new(),
            max_payload_size: config.max_payload_size,
        }
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.id, frame.payload.as_ref())
    }

    /// Frame `payload` under packet `id` and write it out.
    ///
    /// Oversized payloads are rejected before any byte reaches the stream.
    pub fn send(&mut self, id: u8, payload: &[u8]) -> Result<()> {
        if payload.len() > self.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload_size,
            });
        }

        self.scratch.clear();
        encode_frame(id, payload, &mut self.scratch)?;
        self.inner.write_all(&self.scratch)?;
        self.inner.flush()?;
        trace!(id, len = payload.len(), "frame written");
        Ok(())
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl FrameWriter<WireStream> {
    /// Wrap a `WireStream`, applying the configured write timeout to it.
    pub fn with_config_stream(inner: WireStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(|err| FrameError::Io(err.into_io()))?;
        Ok(Self::with_config(inner, config))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, ErrorKind, Write};

    use super::*;
    use crate::reader::FrameReader;

    /// Records what the stream held each time it was flushed.
    #[derive(Default)]
    struct Recorder {
        data: Vec<u8>,
        flushed_at: Vec<usize>,
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushed_at.push(self.data.len());
            Ok(())
        }
    }

    /// Accepts `room` bytes, then refuses everything.
    struct Choked {
        room: usize,
        data: Vec<u8>,
    }

    impl Write for Choked {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.room - self.data.len());
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Stalled;

    impl Write for Stalled {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(ErrorKind::WouldBlock))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn length_counts_id_and_payload() {
        let mut writer = FrameWriter::new(Vec::new());
        writer.send(0, &[0x08]).expect("frame should write");
        writer.send(9, b"").expect("empty payload should write");
        writer.send(7, &[0xaa; 300]).expect("frame should write");

        let wire = writer.into_inner();
        assert_eq!(&wire[..6], &[0, 0, 0, 2, 0, 0x08]);
        assert_eq!(&wire[6..11], &[0, 0, 0, 1, 9]);
        assert_eq!(&wire[11..16], &[0, 0, 0x01, 0x2d, 7]);
        assert_eq!(wire.len(), 16 + 300);
    }

    #[test]
    fn each_frame_is_complete_when_flushed() {
        let mut writer = FrameWriter::new(Recorder::default());
        writer.send(1, b"one").expect("frame should write");
        writer
            .write_frame(&Frame::new(2, "three"))
            .expect("frame should write");

        let recorder = writer.into_inner();
        assert_eq!(recorder.flushed_at, vec![8, 8 + 10]);
    }

    #[test]
    fn ids_survive_back_to_back_frames() {
        let mut writer = FrameWriter::new(Vec::new());
        for id in [0u8, 1, 2, 254, 255] {
            writer.send(id, &[id]).expect("frame should write");
        }

        let mut reader = FrameReader::new(io::Cursor::new(writer.into_inner()));
        for id in [0u8, 1, 2, 254, 255] {
            let frame = reader.read_frame().expect("frame should read back");
            assert_eq!(frame, Frame::new(id, vec![id]));
        }
    }

    #[test]
    fn oversized_payload_writes_nothing() {
        let config = FrameConfig {
            max_payload_size: 4,
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config(Recorder::default(), config);

        let err = writer.send(1, b"oversized").unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 9, max: 4 }));
        let recorder = writer.into_inner();
        assert!(recorder.data.is_empty());
        assert!(recorder.flushed_at.is_empty());
    }

    #[test]
    fn peer_refusing_bytes_mid_frame_is_write_zero() {
        let mut writer = FrameWriter::new(Choked {
            room: 3,
            data: Vec::new(),
        });
        let err = writer.send(1, b"abc").unwrap_err();
        assert!(matches!(err, FrameError::Io(ref e) if e.kind() == ErrorKind::WriteZero));
        assert_eq!(writer.get_ref().data, vec![0, 0, 0]);
    }

    #[test]
    fn stalled_stream_surfaces_as_io() {
        let mut writer = FrameWriter::new(Stalled);
        let err = writer.send(6, b"late").unwrap_err();
        assert!(matches!(err, FrameError::Io(ref e) if e.kind() == ErrorKind::WouldBlock));
    }

    #[cfg(unix)]
    #[test]
    fn stream_writer_delivers_to_peer() {
        let (left, right) = WireStream::pair().expect("socket pair should open");
        let config = FrameConfig {
            write_timeout: Some(std::time::Duration::from_secs(1)),
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config_stream(left, config)
            .expect("write timeout should apply");
        writer.send(3, b"z").expect("frame should write");

        let mut reader = FrameReader::new(right);
        assert_eq!(
            reader.read_frame().expect("frame should arrive"),
            Frame::new(3, "z")
        );
    }
}
