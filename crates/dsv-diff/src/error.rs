//! Error types for the diff crate.

/// Errors that can occur while preparing or rendering a diff.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// Neither side of the comparison was supplied.
    #[error("nothing to diff")]
    NothingToDiff,

    /// Serialization of the rendered output failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
