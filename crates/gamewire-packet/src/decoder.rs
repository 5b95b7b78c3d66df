use std::borrow::Borrow;
use std::io::Read;

use gamewire_frame::{Frame, FrameConfig, FrameReader};
use gamewire_registry::{PacketId, RegistryHandle, TypeRegistry};
use tracing::trace;

use crate::error::{PacketError, Result};
use crate::message::Message;
use crate::packet::Packet;

/// Bind a complete frame to the shape registered for its id.
pub fn decode_payload(registry: &TypeRegistry, frame: &Frame) -> Result<Packet> {
    let id = PacketId(frame.id);
    let shape = registry
        .lookup(id)
        .ok_or(PacketError::UnknownPacketId(id))?;
    let obj = registry.decode_with_shape(shape, &frame.payload)?;
    Ok(Packet { id, obj })
}

/// Reads packets from a byte source, one frame per packet.
///
/// Each call reads exactly one frame and keeps no state between calls. An
/// error leaves the source positioned where the failure happened; for
/// payload and unknown-id errors that is the start of the next frame.
pub struct Decoder<R, G = RegistryHandle> {
    reader: FrameReader<R>,
    registry: G,
}

impl<R: Read, G: Borrow<TypeRegistry>> Decoder<R, G> {
    pub fn new(source: R, registry: G) -> Self {
        Self::from_reader(FrameReader::new(source), registry)
    }

    pub fn with_config(source: R, registry: G, config: FrameConfig) -> Self {
        Self::from_reader(FrameReader::with_config(source, config), registry)
    }

    /// Build on an already configured frame reader.
    pub fn from_reader(reader: FrameReader<R>, registry: G) -> Self {
        Self { reader, registry }
    }

    /// Read and decode the next packet (blocking).
    pub fn decode(&mut self) -> Result<Packet> {
        let frame = self.reader.read_frame()?;
        trace!(id = frame.id, len = frame.payload.len(), "frame received");
        decode_payload(self.registry.borrow(), &frame)
    }

    /// Decode into `packet`, which is only written on success.
    pub fn decode_into(&mut self, packet: &mut Packet) -> Result<()> {
        *packet = self.decode()?;
        Ok(())
    }

    /// Decode the next packet as `M`.
    pub fn decode_message<M: Message>(&mut self) -> Result<M> {
        self.decode()?.into_message()
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.registry.borrow()
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut R {
        self.reader.get_mut()
    }

    /// Consume the decoder and return the source.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}
