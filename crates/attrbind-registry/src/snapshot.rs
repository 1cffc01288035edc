//! Versioned persistence of [`StoreTables`].
//!
//! Layout: `[4 bytes magic "ABST"][bincode(VersionedSnapshot)]`.
//!
//! Every published schema has a variant in [`VersionedSnapshot`]. Reading
//! accepts any of them and upgrades to the current shape; writing always
//! produces the newest variant.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use attrbind_core::{AttributeName, MethodDescriptor, SnapshotError, TypeRef};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::keys::AccessorKey;
use crate::module_graph::ModuleGraph;
use crate::store::StoreTables;

/// Magic bytes at the start of every snapshot.
pub const SNAPSHOT_MAGIC: &[u8; 4] = b"ABST";

/// Default file name suffix appended to the module name.
pub const DEFAULT_SNAPSHOT_SUFFIX: &str = "-setter_store.bin";

/// First published schema. It predates multi-attribute adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotV1 {
    pub adapter_methods: BTreeMap<AttributeName, BTreeMap<AccessorKey, MethodDescriptor>>,
    pub renamed_methods: BTreeMap<AttributeName, BTreeMap<TypeRef, MethodDescriptor>>,
    pub conversion_methods: BTreeMap<TypeRef, BTreeMap<TypeRef, MethodDescriptor>>,
    pub untaggable_types: BTreeMap<TypeRef, TypeRef>,
}

/// Every snapshot schema, in publication order.
///
/// Variants are never reordered or removed; new schemas are appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionedSnapshot {
    V1(SnapshotV1),
    V2(StoreTables),
}

impl VersionedSnapshot {
    /// Schema number of this snapshot.
    pub fn version(&self) -> u32 {
        match self {
            VersionedSnapshot::V1(_) => 1,
            VersionedSnapshot::V2(_) => 2,
        }
    }

    /// Convert to the current table shape.
    pub fn upgrade(self) -> StoreTables {
        match self {
            VersionedSnapshot::V1(v1) => StoreTables {
                adapter_methods: v1.adapter_methods,
                renamed_methods: v1.renamed_methods,
                conversion_methods: v1.conversion_methods,
                multi_value_adapters: BTreeMap::new(),
                untaggable_types: v1.untaggable_types,
            },
            VersionedSnapshot::V2(tables) => tables,
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode `tables` as a current-version snapshot.
pub fn encode(tables: &StoreTables) -> Result<Vec<u8>, SnapshotError> {
    let payload = bincode::serialize(&VersionedSnapshot::V2(tables.clone()))
        .map_err(|e| SnapshotError::Encode(e.to_string()))?;
    let mut buf = Vec::with_capacity(SNAPSHOT_MAGIC.len() + payload.len());
    buf.extend_from_slice(SNAPSHOT_MAGIC);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Decode a snapshot of any known version without upgrading it.
pub fn decode_versioned(data: &[u8]) -> Result<VersionedSnapshot, SnapshotError> {
    let payload = data
        .strip_prefix(SNAPSHOT_MAGIC.as_slice())
        .ok_or(SnapshotError::BadMagic)?;
    bincode::deserialize(payload).map_err(|e| SnapshotError::Decode(e.to_string()))
}

/// Decode a snapshot of any known version and upgrade it.
pub fn decode(data: &[u8]) -> Result<StoreTables, SnapshotError> {
    let snapshot = decode_versioned(data)?;
    debug!(version = snapshot.version(), "decoded setter store snapshot");
    Ok(snapshot.upgrade())
}

// ============================================================================
// Files
// ============================================================================

/// Read the snapshot at `path`. `Ok(None)` if there is no file.
pub fn read_snapshot(path: &Path) -> Result<Option<StoreTables>, SnapshotError> {
    match fs::read(path) {
        Ok(data) => decode(&data).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write `tables` to `path`, creating parent directories.
///
/// The bytes go to a sibling temporary file first and are renamed into place,
/// so readers never observe a partial snapshot.
pub fn write_snapshot(path: &Path, tables: &StoreTables) -> Result<(), SnapshotError> {
    let bytes = encode(tables)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;

    debug!(path = %path.display(), bytes = bytes.len(), "wrote setter store snapshot");
    Ok(())
}

/// Read the snapshot at `path`, treating a missing or unreadable file as empty.
///
/// Unreadable snapshots are logged.
pub fn load_or_empty(path: &Path) -> StoreTables {
    match read_snapshot(path) {
        Ok(Some(tables)) => tables,
        Ok(None) => StoreTables::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable setter store snapshot");
            StoreTables::new()
        }
    }
}

/// Where module snapshots live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotLayout {
    output_dir: PathBuf,
    suffix: String,
}

impl SnapshotLayout {
    pub fn new(output_dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            suffix: suffix.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<output_dir>/<module><suffix>`
    pub fn path_for(&self, module: &str) -> PathBuf {
        self.output_dir.join(format!("{module}{}", self.suffix))
    }

    /// Load and merge every snapshot visible to `module`.
    ///
    /// Snapshots are merged in [`ModuleGraph::load_order`], so the first
    /// loaded mapping for a key wins.
    pub fn load_merged(&self, graph: &ModuleGraph, module: &str) -> StoreTables {
        let mut merged = StoreTables::new();
        let mut loaded = 0usize;
        for name in graph.load_order(module) {
            let tables = load_or_empty(&self.path_for(&name));
            if !tables.is_empty() {
                loaded += 1;
            }
            merged.merge(tables);
        }
        info!(module, snapshots = loaded, entries = merged.entry_count(), "loaded setter stores");
        merged
    }
}

impl Default for SnapshotLayout {
    fn default() -> Self {
        Self::new(".", DEFAULT_SNAPSHOT_SUFFIX)
    }
}
