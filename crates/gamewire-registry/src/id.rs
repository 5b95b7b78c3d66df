use std::fmt;

use serde::{Deserialize, Serialize};

/// One-byte key identifying a payload shape on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PacketId(pub u8);

impl PacketId {
    /// Highest representable id, the default sentinel.
    pub const MAX: PacketId = PacketId(u8::MAX);

    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<u8> for PacketId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

impl From<PacketId> for u8 {
    fn from(id: PacketId) -> Self {
        id.0
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
