use std::collections::{BTreeSet, HashMap};
use std::io::{Cursor, Read};
use std::sync::RwLock;

use bytes::Bytes;
use dsv_types::ContentPath;

use crate::blob::StoredBlob;
use crate::error::{StoreError, StoreResult};
use crate::traits::ContentStore;

/// In-memory, HashMap-based content store.
///
/// Intended for tests and embedding. All blobs are held in memory behind a
/// `RwLock` for safe concurrent access. Paths live in the `/map/` namespace.
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<ContentPath, StoredBlob>>,
    pinned: RwLock<BTreeSet<ContentPath>>,
}

impl InMemoryContentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            pinned: RwLock::new(BTreeSet::new()),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Return a sorted list of all paths in the store.
    pub fn all_paths(&self) -> Vec<ContentPath> {
        let map = self.blobs.read().expect("lock poisoned");
        let mut paths: Vec<ContentPath> = map.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// The label a blob was first stored under.
    pub fn label(&self, path: &ContentPath) -> Option<String> {
        let map = self.blobs.read().expect("lock poisoned");
        map.get(path).map(|blob| blob.name.clone())
    }

    /// Returns `true` if `path` has been pinned.
    pub fn is_pinned(&self, path: &ContentPath) -> bool {
        self.pinned.read().expect("lock poisoned").contains(path)
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for InMemoryContentStore {
    fn put(&self, name: &str, data: Bytes) -> StoreResult<ContentPath> {
        let blob = StoredBlob::new(name, data);
        let path = blob.compute_path(ContentPath::MAP_NAMESPACE);
        let mut map = self.blobs.write().expect("lock poisoned");
        // Same path always maps to the same bytes, so an existing entry wins.
        let size = blob.size();
        let inserted = !map.contains_key(&path);
        map.entry(path.clone()).or_insert(blob);
        tracing::trace!(path = %path.short(), name, size, inserted, "blob put");
        Ok(path)
    }

    fn get(&self, path: &ContentPath) -> StoreResult<Box<dyn Read + Send>> {
        let map = self.blobs.read().expect("lock poisoned");
        let blob = map
            .get(path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        Ok(Box::new(Cursor::new(blob.data.clone())))
    }

    fn has(&self, path: &ContentPath) -> StoreResult<bool> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.contains_key(path))
    }

    fn pin(&self, path: &ContentPath, _recursive: bool) -> StoreResult<()> {
        if !self.has(path)? {
            return Err(StoreError::NotFound(path.clone()));
        }
        self.pinned
            .write()
            .expect("lock poisoned")
            .insert(path.clone());
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryContentStore")
            .field("blob_count", &count)
            .finish()
    }
}
