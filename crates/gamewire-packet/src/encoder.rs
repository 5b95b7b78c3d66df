use std::borrow::Borrow;
use std::io::Write;

use bytes::BytesMut;
use gamewire_frame::{FrameConfig, FrameWriter};
use gamewire_registry::{PacketId, RegistryHandle, TypeRegistry};
use gamewire_value::{encode_value, Value};
use tracing::trace;

use crate::error::{PacketError, Result};
use crate::message::Message;
use crate::packet::Packet;

/// Check `value` against the shape registered for `id` and append its
/// encoding to `dst`. On error `dst` is left untouched.
pub fn encode_payload(
    registry: &TypeRegistry,
    id: PacketId,
    value: &Value,
    dst: &mut BytesMut,
) -> Result<()> {
    match registry.lookup(id) {
        Some(shape) => shape
            .check(value)
            .map_err(|reason| PacketError::ShapeMismatch { id, reason })?,
        None if registry.config().fail_on_unregistered_encode => {
            return Err(PacketError::Unregistered(id));
        }
        None => trace!(id = id.get(), "encoding unregistered packet unchecked"),
    }
    encode_value(value, dst);
    Ok(())
}

/// Writes packets to a byte sink, one frame per packet.
///
/// `G` is anything that can lend the registry: a [`RegistryHandle`] for
/// long-lived connections, or `&TypeRegistry` for one-shot writes.
pub struct Encoder<W, G = RegistryHandle> {
    writer: FrameWriter<W>,
    registry: G,
    payload: BytesMut,
}

impl<W: Write, G: Borrow<TypeRegistry>> Encoder<W, G> {
    pub fn new(sink: W, registry: G) -> Self {
        Self::from_writer(FrameWriter::new(sink), registry)
    }

    pub fn with_config(sink: W, registry: G, config: FrameConfig) -> Self {
        Self::from_writer(FrameWriter::with_config(sink, config), registry)
    }

    /// Build on an already configured frame writer.
    pub fn from_writer(writer: FrameWriter<W>, registry: G) -> Self {
        Self {
            writer,
            registry,
            payload: BytesMut::new(),
        }
    }

    /// Encode `value` under `id` and write the frame.
    ///
    /// A value that does not match the registered shape fails with
    /// [`PacketError::ShapeMismatch`] and nothing reaches the sink.
    pub fn encode(&mut self, id: impl Into<PacketId>, value: &Value) -> Result<()> {
        let id = id.into();
        self.payload.clear();
        encode_payload(self.registry.borrow(), id, value, &mut self.payload)?;
        self.writer.send(id.get(), &self.payload)?;
        trace!(id = id.get(), len = self.payload.len(), "packet encoded");
        Ok(())
    }

    pub fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        self.encode(packet.id, &packet.obj)
    }

    /// Encode a typed message under its own id.
    pub fn send<M: Message>(&mut self, message: M) -> Result<()> {
        let value: Value = message.into();
        self.encode(M::ID, &value)
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.registry.borrow()
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Mutably borrow the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        self.writer.get_mut()
    }

    /// Consume the encoder and return the sink.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io::Cursor;

    use gamewire_frame::FrameError;
    use gamewire_registry::{Kind, RegistryConfig, Shape};
    use gamewire_value::Record;

    use super::*;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(0, Shape::primitive(Kind::I64)).unwrap();
        registry
            .register(
                1,
                Shape::record(
                    "Login",
                    [
                        ("username", Shape::primitive(Kind::Str)),
                        ("password", Shape::primitive(Kind::Str)),
                    ],
                ),
            )
            .unwrap();
        registry
    }

    fn wire(encoder: Encoder<Cursor<Vec<u8>>, &TypeRegistry>) -> Vec<u8> {
        encoder.into_inner().into_inner()
    }

    #[test]
    fn encodes_integer_as_fixint_frame() {
        let registry = registry();
        let mut encoder = Encoder::new(Cursor::new(Vec::new()), &registry);
        encoder.encode(0, &Value::I64(8)).unwrap();

        assert_eq!(wire(encoder), vec![0, 0, 0, 2, 0, 0x08]);
    }

    #[test]
    fn shape_mismatch_writes_nothing() {
        let registry = registry();
        let mut encoder = Encoder::new(Cursor::new(Vec::new()), &registry);

        let err = encoder.encode(0, &Value::from("eight")).unwrap_err();
        assert!(matches!(
            err,
            PacketError::ShapeMismatch {
                id: PacketId(0),
                ..
            }
        ));

        let wrong_record = Value::Record(Record::new("Login").with_field("username", "a"));
        assert!(encoder.encode(1, &wrong_record).is_err());
        assert!(wire(encoder).is_empty());
    }

    #[test]
    fn unregistered_ids_pass_through_unless_configured() {
        let registry = registry();
        let mut encoder = Encoder::new(Cursor::new(Vec::new()), &registry);
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), Value::Nil);
        encoder.encode(42, &Value::Map(map.clone())).unwrap();
        assert_eq!(wire(encoder), vec![0, 0, 0, 4, 42, 0x81, 0xa1, b'k', 0xc0]);

        let strict = TypeRegistry::with_config(RegistryConfig {
            fail_on_unregistered_encode: true,
            ..RegistryConfig::default()
        });
        let mut encoder = Encoder::new(Cursor::new(Vec::new()), &strict);
        assert!(matches!(
            encoder.encode(42, &Value::Map(map)),
            Err(PacketError::Unregistered(PacketId(42)))
        ));
    }

    #[test]
    fn oversized_payload_is_a_frame_error() {
        let registry = registry();
        let config = FrameConfig {
            max_payload_size: 4,
            ..FrameConfig::default()
        };
        let mut encoder = Encoder::with_config(Cursor::new(Vec::new()), &registry, config);
        let err = encoder.encode(7, &Value::from("too long")).unwrap_err();
        assert!(matches!(
            err,
            PacketError::Frame(FrameError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn encoder_works_over_shared_handle() {
        let handle = registry().into_handle();
        let mut encoder = Encoder::new(Vec::new(), std::sync::Arc::clone(&handle));
        encoder
            .write_packet(&Packet::new(0, Value::I64(-1)))
            .unwrap();
        assert_eq!(encoder.get_ref().as_slice(), &[0, 0, 0, 2, 0, 0xff]);
        assert_eq!(encoder.registry().len(), 2);
    }
}
