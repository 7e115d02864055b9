//! The two export caches
//!
//! Pure mapping semantics: insert-or-overwrite, lookup, containment,
//! iteration for diagnostics. No eviction and no capacity bound; both caches
//! are scoped to one export session and entries are never removed (deletion
//! of stale entities is handled by starting a fresh session).

use std::collections::HashMap;

use crate::export::exported::{ExportedObject, MeshEntry};
use crate::export::keys::{InstanceKey, MeshKey};

/// Geometry cache: mesh key → converted-mesh entry
///
/// Owns deduplication of shared geometry. An absent key means the geometry
/// was never converted; a present [`MeshEntry::Empty`] means conversion ran
/// and produced nothing, which must not be retried every pass.
#[derive(Debug, Default)]
pub struct MeshCache {
    entries: HashMap<MeshKey, MeshEntry>,
}

impl MeshCache {
    /// Create an empty mesh cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry
    pub fn get(&self, key: &MeshKey) -> Option<&MeshEntry> {
        self.entries.get(key)
    }

    /// Insert or overwrite an entry
    pub fn insert(&mut self, key: MeshKey, entry: MeshEntry) {
        self.entries.insert(key, entry);
    }

    /// Whether the key has been converted before (empty results included)
    pub fn contains(&self, key: &MeshKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate all entries (diagnostics)
    pub fn iter(&self) -> impl Iterator<Item = (&MeshKey, &MeshEntry)> {
        self.entries.iter()
    }

    /// Number of cached geometry entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Object cache: instance key → exported object
#[derive(Debug, Default)]
pub struct ObjectCache {
    entries: HashMap<InstanceKey, ExportedObject>,
}

impl ObjectCache {
    /// Create an empty object cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry
    pub fn get(&self, key: &InstanceKey) -> Option<&ExportedObject> {
        self.entries.get(key)
    }

    /// Mutable lookup, used by the transform-only update path
    pub fn get_mut(&mut self, key: &InstanceKey) -> Option<&mut ExportedObject> {
        self.entries.get_mut(key)
    }

    /// Insert or overwrite an entry
    pub fn insert(&mut self, key: InstanceKey, object: ExportedObject) {
        self.entries.insert(key, object);
    }

    /// Whether a placement has been exported before
    pub fn contains(&self, key: &InstanceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate all entries (diagnostics)
    pub fn iter(&self) -> impl Iterator<Item = (&InstanceKey, &ExportedObject)> {
        self.entries.iter()
    }

    /// Number of cached objects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
