use dsv_crypto::SignError;
use dsv_dataset::{ComponentKind, DatasetError};
use dsv_store::StoreError;
use dsv_types::ContentPath;
use thiserror::Error;

use crate::describe::DescribeError;

/// Failure to turn a component reference into its value.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Decode(#[from] DatasetError),
}

/// Errors from writing, loading and creating dataset versions.
#[derive(Debug, Error)]
pub enum DsfsError {
    #[error("cannot save empty dataset")]
    EmptyDataset,

    #[error("error loading dataset: error getting file bytes: {0}")]
    ManifestBytes(#[source] StoreError),

    #[error("error loading dataset: error decoding manifest: {0}")]
    ManifestDecode(#[source] DatasetError),

    /// A referenced component could not be fetched or decoded.
    #[error("{}{source}", load_context(*.kind))]
    Component {
        kind: ComponentKind,
        #[source]
        source: ResolveError,
    },

    #[error("private key is required to create a dataset")]
    SignerRequired,

    #[error("commit is required")]
    CommitRequired,

    #[error("structure is required")]
    StructureRequired,

    #[error("bodyfile or previous bodyfile needed")]
    BodyRequired,

    #[error("dataset has no body path")]
    NoBodyPath,

    #[error("strict mode: dataset body did not validate against its schema")]
    StrictValidation { err_count: u64 },

    #[error("error saving: no changes")]
    NoChanges,

    #[error("script at {0} is not valid utf-8")]
    InvalidScript(ContentPath),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("signing failed: {0}")]
    Sign(#[from] SignError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DsfsError {
    /// Wrap a resolution failure with the identity of its component.
    pub fn component(kind: ComponentKind, source: impl Into<ResolveError>) -> Self {
        Self::Component {
            kind,
            source: source.into(),
        }
    }
}

impl From<DescribeError> for DsfsError {
    fn from(err: DescribeError) -> Self {
        match err {
            DescribeError::NoChanges => Self::NoChanges,
            DescribeError::Body(e) => Self::Dataset(e),
        }
    }
}

fn load_context(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::Commit => "error loading dataset commit: error loading commit file: ",
        ComponentKind::Meta => "error loading dataset metadata: error loading metadata file: ",
        ComponentKind::Structure => {
            "error loading dataset structure: error loading structure file: "
        }
        ComponentKind::Transform => {
            "error loading dataset transform: error loading transform raw data: "
        }
        ComponentKind::Viz => "error loading dataset viz: error loading viz file: ",
        ComponentKind::Readme => "error loading dataset readme: error loading readme file: ",
    }
}

/// Result alias for dataset filesystem operations.
pub type DsfsResult<T> = Result<T, DsfsError>;
