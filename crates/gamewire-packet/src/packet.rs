use gamewire_registry::PacketId;
use gamewire_value::Value;

use crate::error::{PacketError, Result};
use crate::message::Message;

/// A decoded packet: the id from the frame and the value bound to its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub id: PacketId,
    pub obj: Value,
}

impl Packet {
    pub fn new(id: impl Into<PacketId>, obj: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            obj: obj.into(),
        }
    }

    /// Wrap a typed message under its own id.
    pub fn from_message<M: Message>(message: M) -> Self {
        Self {
            id: M::ID,
            obj: message.into(),
        }
    }

    /// Convert into a typed message, checking the id first.
    pub fn into_message<M: Message>(self) -> Result<M> {
        if self.id != M::ID {
            return Err(PacketError::UnexpectedPacket {
                expected: M::ID,
                found: self.id,
            });
        }
        Ok(M::try_from(self.obj)?)
    }
}
