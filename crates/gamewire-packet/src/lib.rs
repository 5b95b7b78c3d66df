//! Registry-driven packet encoding for gamewire.
//!
//! A packet is one frame whose payload is the binary encoding of a value
//! bound to the shape registered for the frame's id:
//!
//! ```text
//! Frame   := LEN (u32 BE) | ID (u8) | PAYLOAD (LEN - 1 bytes)
//! PAYLOAD := encoding of the value bound to registry[ID]
//! ```
//!
//! [`Encoder`] checks outgoing values against the registry before anything
//! is written; [`Decoder`] reads exactly one frame per call and binds its
//! payload to the registered shape. [`io::read`] and [`io::write`] wrap them
//! for one-shot use, and [`catalog`] holds the game's own packets.

pub mod catalog;
#[cfg(feature = "async")]
pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod io;
pub mod message;
pub mod packet;

#[cfg(feature = "async")]
pub use codec::PacketCodec;
pub use decoder::{decode_payload, Decoder};
pub use encoder::{encode_payload, Encoder};
pub use error::{PacketError, Result};
pub use message::{register, Message};
pub use packet::Packet;
