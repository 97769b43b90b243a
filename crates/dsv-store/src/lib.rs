//! Content-addressed blob storage for DSV.
//!
//! Every dataset component, script and body is persisted as an immutable blob
//! addressed by a [`ContentPath`](dsv_types::ContentPath) derived from its
//! bytes. This crate defines the [`ContentStore`] capability consumed by the
//! dataset layer and ships an in-memory backend.
//!
//! # Storage Backends
//!
//! - [`InMemoryContentStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Blobs are immutable once written (content-addressing guarantees this).
//! 2. `put` is idempotent: identical bytes return the identical path.
//! 3. Concurrent `put`/`get` from multiple callers is safe.
//! 4. The store never interprets blob contents.
//! 5. A missing path is reported as [`StoreError::NotFound`], never as an empty read.

pub mod blob;
pub mod error;
pub mod memory;
pub mod traits;

pub use blob::StoredBlob;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryContentStore;
pub use traits::ContentStore;
