use gamewire_registry::{PacketId, Shape, TypeRegistry};
use gamewire_value::{Value, ValueError};

/// An application type that travels as one packet.
///
/// The conversions carry the data; `ID` and [`Message::shape`] tell the
/// registry how to bind it.
pub trait Message: Into<Value> + TryFrom<Value, Error = ValueError> {
    const ID: PacketId;
    /// Display name used in the registry and in logs.
    const NAME: &'static str;

    fn shape() -> Shape;
}

/// Register `M` under its id, name and shape.
pub fn register<M: Message>(
    registry: &mut TypeRegistry,
) -> gamewire_registry::Result<Option<Shape>> {
    registry.register_named(M::ID, M::NAME, M::shape())
}
