//! Dataset model and component codec for DSV.
//!
//! A [`Dataset`] is a root aggregate of up to six components (commit, meta,
//! structure, transform, viz, readme) plus a body of rows. Each component is
//! a [`Component`]: either the full value inline, or a reference to a blob in
//! a content store. The [`codec`] module produces the canonical bytes that
//! make content addressing deduplicate identical components.
//!
//! # Key Types
//!
//! - [`Dataset`] -- root aggregate, serialized as the manifest
//! - [`Component`] -- `Reference(path) | Inline(value)` per component kind
//! - [`ComponentKind`] -- wire tag and display name of each component
//! - [`Body`] -- in-memory body rows or raw encoded body bytes
//! - [`BodyRows`] -- streaming row reader over csv or json body bytes
//! - [`SchemaValidator`] -- per-row schema checks used for `errCount`

pub mod body;
pub mod codec;
pub mod component;
pub mod dataset;
pub mod depth;
pub mod error;
pub mod kind;
pub mod model;
pub mod rows;
pub mod validate;

pub use body::{Body, BodyFile};
pub use component::{Component, ComponentValue};
pub use dataset::Dataset;
pub use depth::depth;
pub use error::{DatasetError, DatasetResult};
pub use kind::{ComponentKind, DATASET_TAG};
pub use model::{Commit, DataFormat, License, Meta, Readme, Scripted, Structure, Transform, Viz};
pub use rows::BodyRows;
pub use validate::{JsonSchemaValidator, SchemaValidator, ValidationError};
