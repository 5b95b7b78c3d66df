//! Length-framed, registry-typed packet codec for game servers.
//!
//! Every packet travels as a 4-byte big-endian length, a 1-byte packet id
//! and a compact binary encoding of the payload value. The packet id is the
//! only type information on the wire; a shared registry maps it to the
//! shape the payload is rebuilt into.
//!
//! # Crate Structure
//!
//! - [`value`] - Dynamic values and their binary encoding
//! - [`registry`] - Packet-id to shape registry, manifests, JSON bridge
//! - [`frame`] - Length-prefixed framing over `Read`/`Write`
//! - [`packet`] - Encoder/Decoder, one-shot `read`/`write`, game catalog
//! - [`transport`] - TCP and Unix domain socket streams
//! - [`session`] - Per-connection receive/send loops (behind `session` feature)

/// Re-export value types.
pub mod value {
    pub use gamewire_value::*;
}

/// Re-export registry types.
pub mod registry {
    pub use gamewire_registry::*;
}

/// Re-export frame types.
pub mod frame {
    pub use gamewire_frame::*;
}

/// Re-export packet types.
pub mod packet {
    pub use gamewire_packet::*;
}

/// Re-export transport types.
pub mod transport {
    pub use gamewire_transport::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use gamewire_session::*;
}

pub use gamewire_packet::io::{read, write};
pub use gamewire_packet::{Decoder, Encoder, Packet, PacketError};
pub use gamewire_registry::{PacketId, RegistryHandle, Shape, TypeRegistry};
pub use gamewire_value::Value;
