//! Packet-id to payload-shape registry.
//!
//! The packet id is the only type information on the wire. The registry maps
//! each id to a [`Shape`] that tells the decoder how to rebuild the payload:
//! which integer width to produce, how many elements an array holds, and how
//! to bind a map onto a named record.
//!
//! Build the registry once at startup, then share it as a [`RegistryHandle`].

pub mod config;
pub mod error;
pub mod id;
pub mod json;
pub mod manifest;
pub mod registry;
pub mod shape;

pub use config::RegistryConfig;
pub use error::{RegistryError, Result, ShapeMismatch};
pub use id::PacketId;
pub use manifest::{Manifest, ManifestEntry};
pub use registry::{Entry, RegistryHandle, TypeRegistry};
pub use shape::{Field, Kind, RecordShape, Shape};
