/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"dsv-blob-v1"`) that is prepended
/// to every hash computation, so a blob digest can never be confused with a
/// body checksum over the same bytes.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for stored blobs (content addresses).
    pub const BLOB: Self = Self {
        domain: "dsv-blob-v1",
    };
    /// Hasher for dataset body checksums.
    pub const BODY: Self = Self {
        domain: "dsv-body-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = self.streaming();
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Hash raw bytes and return the lowercase hex digest.
    pub fn hash_hex(&self, data: &[u8]) -> String {
        hex::encode(self.hash(data))
    }

    /// A streaming hasher already seeded with this domain tag.
    ///
    /// Feeding it `data` in any number of chunks yields the same digest as
    /// [`ContentHasher::hash`] over the concatenation.
    pub fn streaming(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher
    }
}
