//! `tokio_util` codec over the same wire format.
//!
//! Mount [`PacketCodec`] on any `AsyncRead + AsyncWrite` with
//! `tokio_util::codec::Framed`. Registry rules match the blocking
//! [`Encoder`](crate::Encoder) and [`Decoder`](crate::Decoder).

use bytes::BytesMut;
use gamewire_frame::{
    decode_frame, encode_frame, FrameError, DEFAULT_MAX_PAYLOAD, LENGTH_PREFIX_SIZE,
};
use gamewire_registry::RegistryHandle;
use tokio_util::codec;

use crate::decoder::decode_payload;
use crate::encoder::encode_payload;
use crate::error::PacketError;
use crate::packet::Packet;

#[derive(Debug, Clone)]
pub struct PacketCodec {
    registry: RegistryHandle,
    max_payload: usize,
    scratch: BytesMut,
}

impl PacketCodec {
    pub fn new(registry: RegistryHandle) -> Self {
        Self::with_max_payload(registry, DEFAULT_MAX_PAYLOAD)
    }

    pub fn with_max_payload(registry: RegistryHandle, max_payload: usize) -> Self {
        Self {
            registry,
            max_payload,
            scratch: BytesMut::new(),
        }
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn max_payload(&self) -> usize {
        self.max_payload
    }
}

impl codec::Decoder for PacketCodec {
    type Item = Packet;
    type Error = PacketError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>, PacketError> {
        match decode_frame(src, self.max_payload)? {
            Some(frame) => decode_payload(&self.registry, &frame).map(Some),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Packet>, PacketError> {
        match self.decode(src)? {
            Some(packet) => Ok(Some(packet)),
            None if src.is_empty() => Ok(None),
            None => {
                let (needed, received) = if src.len() < LENGTH_PREFIX_SIZE {
                    (LENGTH_PREFIX_SIZE, src.len())
                } else {
                    let length = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;
                    (length, src.len() - LENGTH_PREFIX_SIZE)
                };
                src.clear();
                Err(FrameError::Truncated { needed, received }.into())
            }
        }
    }
}

impl codec::Encoder<Packet> for PacketCodec {
    type Error = PacketError;

    fn encode(&mut self, packet: Packet, dst: &mut BytesMut) -> Result<(), PacketError> {
        self.scratch.clear();
        encode_payload(&self.registry, packet.id, &packet.obj, &mut self.scratch)?;
        if self.scratch.len() > self.max_payload {
            return Err(FrameError::PayloadTooLarge {
                size: self.scratch.len(),
                max: self.max_payload,
            }
            .into());
        }
        encode_frame(packet.id.get(), &self.scratch, dst)?;
        Ok(())
    }
}
