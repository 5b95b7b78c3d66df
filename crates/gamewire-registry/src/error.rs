use crate::id::PacketId;

/// Errors raised by registry construction and lookup.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The id is the registry's sentinel and cannot carry a shape.
    #[error("packet id {0} is reserved")]
    ReservedId(PacketId),

    /// No shape is registered for the id.
    #[error("unknown packet id {0}")]
    UnknownPacketId(PacketId),

    /// A manifest file could not be read.
    #[error("failed to load manifest: {0}")]
    ManifestLoad(String),

    /// A manifest is not valid JSON or does not describe shapes.
    #[error("invalid manifest: {0}")]
    InvalidManifest(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// A value does not structurally match a shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("at {path}: expected {expected}, found {found}")]
pub struct ShapeMismatch {
    /// Location inside the value, e.g. `$.pos[1]`.
    pub path: String,
    pub expected: String,
    pub found: String,
}
