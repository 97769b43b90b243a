use bytes::Bytes;
use dsv_crypto::ContentHasher;
use dsv_types::ContentPath;

/// A stored blob: the label it was put under plus its bytes.
///
/// The label is informational (e.g. `meta.json`, `body.csv`) and plays no
/// part in addressing: two blobs with the same bytes share one path no matter
/// how they were labelled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlob {
    /// Label supplied by the writer.
    pub name: String,
    /// The blob contents.
    pub data: Bytes,
}

impl StoredBlob {
    /// Create a new blob from a label and its bytes.
    pub fn new(name: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Size of the blob in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Compute the content address of this blob within `namespace`.
    pub fn compute_path(&self, namespace: &str) -> ContentPath {
        ContentPath::from_digest(namespace, &ContentHasher::BLOB.hash(&self.data))
    }
}
