//! Structural diff engine for DSV.
//!
//! Compares two tree values (json-like maps, sequences and scalars) and
//! produces an ordered [`ChangeSet`] with size statistics. Bodies are compared
//! row by row through [`diff_rows`], which never holds more than one row per
//! side.
//!
//! # Key Types
//!
//! - [`ChangeSet`] / [`Change`] -- path-addressed insert/update/delete records
//! - [`DiffStat`] -- node counts and weights of both sides
//! - [`BodyDiff`] / [`RowChange`] -- positional row-level comparison of two bodies
//! - [`OutputFormat`] -- text or json rendering of a top-level diff
//!
//! # Weights
//!
//! A scalar weighs the length of its text (strings without quotes). A map or
//! sequence weighs one plus the sum of its children. Change ratios compare the
//! weight of what changed against the weight of the larger side.

pub mod error;
pub mod render;
pub mod rows;
pub mod tree;

pub use error::{DiffError, DiffResult};
pub use render::{render, OutputFormat};
pub use rows::{diff_rows, BodyDiff, RowChange};
pub use tree::{
    cumulative_weight, diff, node_count, weight, Change, ChangeKind, ChangeSet, DiffStat,
    PathSegment,
};
