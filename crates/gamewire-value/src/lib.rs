//! Self-describing binary value encoding.
//!
//! Every value starts with a tag byte that carries its kind and, for small
//! values, the payload itself (fixint, fixstr, fixarray, fixmap). Larger
//! values use an explicit tag followed by a big-endian length or number.
//! The tag table is MessagePack compatible.
//!
//! Containers decode structurally from the tag alone. Records need a shape
//! from the registry; this crate only exposes the cursor ([`ValueReader`])
//! the registry drives when it binds a record.

pub mod decode;
pub mod encode;
pub mod error;
pub mod value;

pub use decode::{decode_exact, decode_value, Header, ValueReader, MAX_DEPTH};
pub use encode::{encode_value, to_bytes};
pub use error::{Result, ValueError};
pub use value::{Record, Value};
