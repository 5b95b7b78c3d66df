use crate::id::PacketId;

/// Controls registry and binding behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Reserved upper bound of the id range. Never registered, never listed.
    pub sentinel: PacketId,
    /// When true, record decoding rejects keys that are not declared fields.
    pub strict_records: bool,
    /// When true, encoding a value under an unregistered id fails instead of
    /// passing the value through unchecked.
    pub fail_on_unregistered_encode: bool,
    /// Maximum bytes read from a manifest file.
    pub max_manifest_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            sentinel: PacketId::MAX,
            strict_records: false,
            fail_on_unregistered_encode: false,
            max_manifest_size: 256 * 1024,
        }
    }
}
