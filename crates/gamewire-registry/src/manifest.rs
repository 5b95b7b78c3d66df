//! JSON manifests describing a registry.
//!
//! ```json
//! {
//!   "sentinel": 3,
//!   "packets": [
//!     { "id": 0, "shape": { "primitive": "i64" } },
//!     { "id": 2, "name": "player_info", "shape": { "mapping": "any" } }
//!   ]
//! }
//! ```

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::id::PacketId;
use crate::registry::TypeRegistry;
use crate::shape::Shape;

/// Serialized form of a registry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Overrides [`RegistryConfig::sentinel`] when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentinel: Option<PacketId>,
    #[serde(default)]
    pub packets: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: PacketId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub shape: Shape,
}

impl TypeRegistry {
    /// Build a registry from manifest JSON.
    pub fn from_manifest_str(json: &str) -> Result<Self> {
        Self::from_manifest_str_with_config(json, RegistryConfig::default())
    }

    pub fn from_manifest_str_with_config(json: &str, config: RegistryConfig) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)?;
        Self::from_manifest(manifest, config)
    }

    /// Load a manifest file.
    pub fn from_manifest_file(path: &Path) -> Result<Self> {
        Self::from_manifest_file_with_config(path, RegistryConfig::default())
    }

    /// Load a manifest file with explicit config.
    pub fn from_manifest_file_with_config(path: &Path, config: RegistryConfig) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|err| RegistryError::ManifestLoad(format!("{}: {err}", path.display())))?;
        let metadata = file
            .metadata()
            .map_err(|err| RegistryError::ManifestLoad(err.to_string()))?;
        if !metadata.is_file() {
            return Err(RegistryError::ManifestLoad(format!(
                "not a regular file: {}",
                path.display()
            )));
        }

        let max_bytes = config.max_manifest_size;
        if metadata.len() > max_bytes as u64 {
            return Err(RegistryError::ManifestLoad(format!(
                "manifest too large ({} bytes): {}",
                metadata.len(),
                path.display()
            )));
        }

        let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
        let mut content = String::new();
        file.take(read_limit)
            .read_to_string(&mut content)
            .map_err(|err| {
                RegistryError::ManifestLoad(format!(
                    "failed reading manifest {}: {err}",
                    path.display()
                ))
            })?;
        if content.len() > max_bytes {
            return Err(RegistryError::ManifestLoad(format!(
                "manifest too large while reading: {}",
                path.display()
            )));
        }

        let registry = Self::from_manifest_str_with_config(&content, config)?;
        info!(
            path = %path.display(),
            packets = registry.len(),
            "loaded packet manifest"
        );
        Ok(registry)
    }

    /// Build a registry from a parsed manifest.
    pub fn from_manifest(manifest: Manifest, mut config: RegistryConfig) -> Result<Self> {
        if let Some(sentinel) = manifest.sentinel {
            config.sentinel = sentinel;
        }

        let mut registry = Self::with_config(config);
        for entry in manifest.packets {
            match entry.name {
                Some(name) => registry.register_named(entry.id, name, entry.shape)?,
                None => registry.register(entry.id, entry.shape)?,
            };
        }
        Ok(registry)
    }

    /// Describe this registry as a manifest.
    pub fn to_manifest(&self) -> Manifest {
        Manifest {
            sentinel: Some(self.config().sentinel),
            packets: self
                .all()
                .map(|(id, entry)| ManifestEntry {
                    id,
                    name: Some(entry.name.clone()),
                    shape: entry.shape.clone(),
                })
                .collect(),
        }
    }
}
