use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire tag of a root dataset manifest.
pub const DATASET_TAG: &str = "ds:0";

/// The component facets of a dataset that are stored as documents.
///
/// The body is not listed: it is addressed through `bodyPath` and never
/// encoded as a component document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Commit,
    Meta,
    Structure,
    Transform,
    Viz,
    Readme,
}

impl ComponentKind {
    /// Version tag written into the `qri` key of encoded documents.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Commit => "cm:0",
            Self::Meta => "md:0",
            Self::Structure => "st:0",
            Self::Transform => "tf:0",
            Self::Viz => "vz:0",
            Self::Readme => "rm:0",
        }
    }

    /// Manifest key and display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Meta => "meta",
            Self::Structure => "structure",
            Self::Transform => "transform",
            Self::Viz => "viz",
            Self::Readme => "readme",
        }
    }

    /// Label used when the component document is put into a store.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Commit => "commit.json",
            Self::Meta => "meta.json",
            Self::Structure => "structure.json",
            Self::Transform => "transform.json",
            Self::Viz => "viz.json",
            Self::Readme => "readme.json",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_distinct() {
        let kinds = [
            ComponentKind::Commit,
            ComponentKind::Meta,
            ComponentKind::Structure,
            ComponentKind::Transform,
            ComponentKind::Viz,
            ComponentKind::Readme,
        ];
        let tags: std::collections::BTreeSet<_> = kinds.iter().map(|k| k.tag()).collect();
        assert_eq!(tags.len(), kinds.len());
        assert!(!tags.contains(DATASET_TAG));
    }

    #[test]
    fn display_is_name() {
        assert_eq!(ComponentKind::Meta.to_string(), "meta");
        assert_eq!(ComponentKind::Readme.file_name(), "readme.json");
    }
}
