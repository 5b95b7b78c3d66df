//! One-shot helpers for callers that handle a single packet at a time.
//!
//! Each call builds a transient [`Encoder`] or [`Decoder`] for exactly one
//! frame. The frame reader never reads past the frame it returns, so
//! successive [`read`] calls on the same stream see successive packets.

use std::io::{Read, Write};

use gamewire_registry::{PacketId, TypeRegistry};
use gamewire_value::Value;

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::packet::Packet;

/// Frame and write one value.
pub fn write<W: Write>(
    sink: W,
    id: impl Into<PacketId>,
    value: &Value,
    registry: &TypeRegistry,
) -> Result<()> {
    Encoder::new(sink, registry).encode(id, value)
}

/// Read and decode one packet.
pub fn read<R: Read>(source: R, registry: &TypeRegistry) -> Result<Packet> {
    Decoder::new(source, registry).decode()
}
