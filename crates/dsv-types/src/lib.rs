//! Foundation types for DSV (dataset versioning).
//!
//! This crate provides the identifier types shared by every other DSV crate.
//!
//! # Key Types
//!
//! - [`ContentPath`]: Address of an immutable blob in a content store
//! - [`ProfileId`]: Stable author identity derived from a public key

pub mod error;
pub mod path;
pub mod profile;

pub use error::TypeError;
pub use path::ContentPath;
pub use profile::ProfileId;
