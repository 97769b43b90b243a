use std::io::Read;

use bytes::Bytes;
use dsv_types::ContentPath;

use crate::error::StoreResult;

/// Content-addressed blob store.
///
/// All implementations must satisfy these invariants:
/// - `put` is content-deterministic: the same bytes always produce the same
///   path, and a second `put` of existing bytes stores nothing new.
/// - Blobs are immutable once written.
/// - `get` on a path that was never written fails with
///   [`StoreError::NotFound`](crate::StoreError::NotFound).
/// - Implementations are safe to share across threads.
pub trait ContentStore: Send + Sync {
    /// Store `data` under a descriptive label and return its content path.
    fn put(&self, name: &str, data: Bytes) -> StoreResult<ContentPath>;

    /// Open a reader over the blob at `path`.
    fn get(&self, path: &ContentPath) -> StoreResult<Box<dyn Read + Send>>;

    /// Check whether a blob exists at `path`.
    fn has(&self, path: &ContentPath) -> StoreResult<bool>;

    /// Ask the store to retain `path` (and, if `recursive`, anything it
    /// references) across garbage collection.
    ///
    /// Default implementation is a no-op for stores without retention policy.
    fn pin(&self, _path: &ContentPath, _recursive: bool) -> StoreResult<()> {
        Ok(())
    }

    /// Read the entire blob at `path` into memory.
    ///
    /// Intended for small component documents; bodies should be consumed
    /// through [`ContentStore::get`].
    fn get_bytes(&self, path: &ContentPath) -> StoreResult<Vec<u8>> {
        let mut reader = self.get(path)?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(buf)
    }
}
