use std::collections::BTreeMap;
use std::sync::Arc;

use gamewire_value::{Value, ValueError, ValueReader};
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::id::PacketId;
use crate::shape::Shape;

/// Registered name and shape for one packet id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub shape: Shape,
}

/// A registry frozen for concurrent lookups.
pub type RegistryHandle = Arc<TypeRegistry>;

/// Packet-id keyed registry of payload shapes.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    entries: BTreeMap<PacketId, Entry>,
    config: RegistryConfig,
}

impl TypeRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            entries: BTreeMap::new(),
            config,
        }
    }

    /// Register a shape, naming it after the record or `packet-<id>`.
    ///
    /// Returns the shape previously registered under `id`, if any.
    pub fn register(&mut self, id: impl Into<PacketId>, shape: Shape) -> Result<Option<Shape>> {
        let id = id.into();
        let name = shape
            .record_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("packet-{id}"));
        self.register_named(id, name, shape)
    }

    /// Register a shape under an explicit display name.
    pub fn register_named(
        &mut self,
        id: impl Into<PacketId>,
        name: impl Into<String>,
        shape: Shape,
    ) -> Result<Option<Shape>> {
        let id = id.into();
        if id == self.config.sentinel {
            return Err(RegistryError::ReservedId(id));
        }

        let name = name.into();
        debug!(id = id.get(), name = %name, shape = %shape.describe(), "registering packet shape");
        let previous = self.entries.insert(id, Entry { name, shape });
        if let Some(previous) = &previous {
            warn!(
                id = id.get(),
                previous = %previous.name,
                "packet id registered twice, replacing earlier shape"
            );
        }
        Ok(previous.map(|entry| entry.shape))
    }

    /// Remove a registration.
    pub fn remove(&mut self, id: impl Into<PacketId>) -> Option<Entry> {
        self.entries.remove(&id.into())
    }

    pub fn lookup(&self, id: impl Into<PacketId>) -> Option<&Shape> {
        self.entries.get(&id.into()).map(|entry| &entry.shape)
    }

    pub fn entry(&self, id: impl Into<PacketId>) -> Option<&Entry> {
        self.entries.get(&id.into())
    }

    pub fn name_of(&self, id: impl Into<PacketId>) -> Option<&str> {
        self.entries.get(&id.into()).map(|entry| entry.name.as_str())
    }

    pub fn contains(&self, id: impl Into<PacketId>) -> bool {
        self.entries.contains_key(&id.into())
    }

    /// Look up a shape, failing for unregistered ids.
    pub fn require(&self, id: impl Into<PacketId>) -> Result<&Shape> {
        let id = id.into();
        self.lookup(id).ok_or(RegistryError::UnknownPacketId(id))
    }

    /// Registered entries in ascending id order. The sentinel never appears.
    pub fn all(&self) -> impl Iterator<Item = (PacketId, &Entry)> + '_ {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> Vec<PacketId> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Decode a complete payload against `shape` with this registry's
    /// binding rules. The payload must hold exactly one value.
    pub fn decode_with_shape(
        &self,
        shape: &Shape,
        payload: &[u8],
    ) -> std::result::Result<Value, ValueError> {
        let mut reader = ValueReader::new(payload);
        let value = shape.decode_with(&mut reader, self.config.strict_records)?;
        reader.finish()?;
        Ok(value)
    }

    /// Freeze the registry for sharing.
    pub fn into_handle(self) -> RegistryHandle {
        Arc::new(self)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
