use crate::kind::ComponentKind;

/// Errors from encoding, decoding and reading dataset documents.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A component document carries the tag of a different component kind.
    #[error("{kind} document has tag {found:?}, expected {expected:?}")]
    TagMismatch {
        kind: ComponentKind,
        expected: &'static str,
        found: String,
    },

    /// A component is neither a full object nor a path reference.
    #[error("invalid {kind} component: {reason}")]
    InvalidComponent { kind: ComponentKind, reason: String },

    #[error("manifest has tag {0:?}, expected \"ds:0\"")]
    ManifestTag(String),

    #[error("structure format is required")]
    MissingFormat,

    #[error("unsupported data format: {0}")]
    UnsupportedFormat(String),

    /// A json body whose top-level value is not an array.
    #[error("json body must be an array of rows")]
    NotAnArray,

    #[error("unexpected content after json body")]
    TrailingContent,

    #[error("unexpected end of body while reading row {0}")]
    UnexpectedEnd(usize),

    /// A row that cannot be written in the requested format.
    #[error("row {index} cannot be encoded: {reason}")]
    RowEncoding { index: usize, reason: String },
}

/// Result alias for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;
