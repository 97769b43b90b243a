use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Address of an immutable blob in a content store.
///
/// Paths minted by a store have the shape `/<namespace>/<hex digest>`, where
/// the digest is derived from the blob's bytes: identical content always maps
/// to the same path. Paths read back from manifests are kept verbatim, so a
/// dangling reference such as `/bad/path` is representable and surfaces as a
/// not-found error at resolution time rather than at parse time.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentPath(String);

impl ContentPath {
    /// Namespace used by the in-memory store.
    pub const MAP_NAMESPACE: &'static str = "map";

    /// Build a path from a namespace and a 32-byte content digest.
    pub fn from_digest(namespace: &str, digest: &[u8; 32]) -> Self {
        Self(format!("/{namespace}/{}", hex::encode(digest)))
    }

    /// Parse a path. It must be non-empty and absolute.
    pub fn parse(s: impl Into<String>) -> Result<Self, TypeError> {
        let s = s.into();
        if s.len() < 2 || !s.starts_with('/') || s.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidPath(s));
        }
        Ok(Self(s))
    }

    /// The full path string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The namespace segment (`map` in `/map/ab12…`).
    pub fn namespace(&self) -> &str {
        self.0[1..].split('/').next().unwrap_or_default()
    }

    /// The final path segment, which for minted paths is the hex digest.
    pub fn digest_hex(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Short form for logs: namespace plus the first 8 digest characters.
    pub fn short(&self) -> String {
        let digest = self.digest_hex();
        let prefix = digest
            .char_indices()
            .nth(8)
            .map_or(digest, |(end, _)| &digest[..end]);
        format!("/{}/{}", self.namespace(), prefix)
    }
}

impl fmt::Debug for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentPath({})", self.short())
    }
}

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ContentPath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ContentPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ContentPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}
