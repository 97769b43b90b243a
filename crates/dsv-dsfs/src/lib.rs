//! Dataset filesystem for DSV.
//!
//! Splits a [`Dataset`](dsv_dataset::Dataset) into content-addressed blobs,
//! reassembles it from a root manifest, describes what changed between two
//! versions, and runs the create pipeline that ties these together.
//!
//! # Operations
//!
//! - [`write`] -- persist components, scripts and body, then the manifest
//! - [`load`] -- read a manifest and resolve its component references
//! - [`Describer`] -- short and long commit descriptions of a change
//! - [`create`] -- validate, compute stats, describe, sign and write a version

pub mod clock;
pub mod config;
pub mod create;
pub mod describe;
pub mod error;
pub mod load;
pub mod resolve;
pub mod stats;
pub mod write;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CreateConfig;
pub use create::create;
pub use describe::{describe, BodyChangePolicy, DescribeError, Describer, Description};
pub use error::{DsfsError, DsfsResult, ResolveError};
pub use load::{load, load_script, open_body};
pub use resolve::{resolve, resolve_dataset};
pub use stats::{compute_stats, BodyStats};
pub use write::write;
