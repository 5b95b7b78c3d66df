use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Size of the big-endian length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Length prefix (4) + packet id (1) = 5 bytes.
pub const HEADER_SIZE: usize = LENGTH_PREFIX_SIZE + 1;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// One framed packet: the id byte and its encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub id: u8,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            id,
            payload: payload.into(),
        }
    }

    /// The value of the length prefix: id byte plus payload.
    pub fn length_field(&self) -> usize {
        1 + self.payload.len()
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// ```text
/// ┌────────────────┬──────────┬──────────────────────┐
/// │ Length (4B BE) │ Id (1B)  │ Payload (Length - 1) │
/// └────────────────┴──────────┴──────────────────────┘
/// ```
///
/// The length counts the id byte plus the payload, never the prefix itself.
pub fn encode_frame(id: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let max = u32::MAX as usize - 1;
    if payload.len() > max {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u32(1 + payload.len() as u32);
    dst.put_u8(id);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < LENGTH_PREFIX_SIZE {
        return Ok(None);
    }

    let length = read_length(&src[..LENGTH_PREFIX_SIZE]);
    let payload_len = check_length(length, max_payload)?;

    let total = LENGTH_PREFIX_SIZE + length;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None);
    }

    src.advance(LENGTH_PREFIX_SIZE);
    let id = src.get_u8();
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame { id, payload }))
}

pub(crate) fn read_length(prefix: &[u8]) -> usize {
    let mut bytes = [0u8; LENGTH_PREFIX_SIZE];
    bytes.copy_from_slice(&prefix[..LENGTH_PREFIX_SIZE]);
    u32::from_be_bytes(bytes) as usize
}

/// Validate a length prefix and return the payload length it implies.
pub(crate) fn check_length(length: usize, max_payload: usize) -> Result<usize> {
    if length == 0 {
        return Err(FrameError::EmptyFrame);
    }
    let payload_len = length - 1;
    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }
    Ok(payload_len)
}

/// Configuration for the frame codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_writes_big_endian_length_then_id() {
        let mut buf = BytesMut::new();
        encode_frame(0, &[0x08], &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0x00, 0x00, 0x00, 0x02, 0x00, 0x08]);

        let mut buf = BytesMut::new();
        encode_frame(7, &[0u8; 300], &mut buf).unwrap();
        assert_eq!(&buf[..5], &[0x00, 0x00, 0x01, 0x2d, 0x07]);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        let payload = b"\x82\xa1a\x01\xa1b\x02";

        encode_frame(1, payload, &mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE + payload.len());

        let frame = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();

        assert_eq!(frame.id, 1);
        assert_eq!(frame.payload.as_ref(), payload);
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_incomplete_prefix() {
        let mut buf = BytesMut::from(&[0x00, 0x00, 0x00][..]);
        assert!(decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .is_none());
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn decode_incomplete_payload() {
        let mut buf = BytesMut::new();
        encode_frame(1, b"hello", &mut buf).unwrap();
        buf.truncate(HEADER_SIZE + 2);

        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap();
        assert!(result.is_none());
        assert_eq!(buf.len(), HEADER_SIZE + 2);
    }

    #[test]
    fn decode_zero_length_is_empty_frame() {
        let mut buf = BytesMut::from(&[0x00, 0x00, 0x00, 0x00][..]);
        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD);
        assert!(matches!(result, Err(FrameError::EmptyFrame)));
    }

    #[test]
    fn decode_payload_too_large() {
        let mut buf = BytesMut::new();
        buf.put_u32(32 * 1024 * 1024);
        buf.put_u8(1);

        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD);
        assert!(matches!(
            result,
            Err(FrameError::PayloadTooLarge { max: DEFAULT_MAX_PAYLOAD, .. })
        ));
    }

    #[test]
    fn multiple_frames() {
        let mut buf = BytesMut::new();
        encode_frame(1, b"first", &mut buf).unwrap();
        encode_frame(2, b"second", &mut buf).unwrap();

        let f1 = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(f1, Frame::new(1, &b"first"[..]));

        let f2 = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(f2, Frame::new(2, &b"second"[..]));

        assert!(buf.is_empty());
    }

    #[test]
    fn id_only_frame() {
        let mut buf = BytesMut::new();
        encode_frame(9, b"", &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0, 0, 0, 1, 9]);

        let frame = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(frame.id, 9);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn frame_sizes() {
        let frame = Frame::new(1, Bytes::from_static(b"test"));
        assert_eq!(frame.length_field(), 5);
        assert_eq!(frame.wire_size(), HEADER_SIZE + 4);
    }
}
