//! Length-prefixed, id-tagged framing.
//!
//! Every packet on the wire is:
//! - a 4-byte big-endian length covering the id byte and the payload
//! - a 1-byte packet id
//! - `length - 1` payload bytes
//!
//! There is no magic number or checksum; the stream relies on the transport
//! for integrity. Callers always get complete frames.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD, HEADER_SIZE,
    LENGTH_PREFIX_SIZE,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
