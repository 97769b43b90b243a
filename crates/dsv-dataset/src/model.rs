//! Component value types.
//!
//! Every component serializes with camelCase keys and omits empty fields, so
//! a value's canonical encoding only carries what was actually set.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use dsv_types::{ContentPath, ProfileId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec;
use crate::component::ComponentValue;
use crate::error::{DatasetError, DatasetResult};
use crate::kind::ComponentKind;

fn is_zero(n: &u64) -> bool {
    *n == 0
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Version record: who changed the dataset, when, and a description of what
/// changed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<ProfileId>,
    /// Hex text of the signature over [`Commit::signing_bytes`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Commit {
    /// Create a commit seeded with a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Canonical bytes a signer signs: the encoded commit without its
    /// signature.
    pub fn signing_bytes(&self) -> DatasetResult<Vec<u8>> {
        let unsigned = Self {
            signature: None,
            ..self.clone()
        };
        codec::encode(&unsigned)
    }
}

impl ComponentValue for Commit {
    const KIND: ComponentKind = ComponentKind::Commit;
}

// ---------------------------------------------------------------------------
// Meta
// ---------------------------------------------------------------------------

/// License reference attached to dataset metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Descriptive metadata. Unknown keys are preserved verbatim in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "homeURL", default, skip_serializing_if = "Option::is_none")]
    pub home_url: Option<String>,
    #[serde(rename = "accessURL", default, skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,
    #[serde(rename = "downloadURL", default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub language: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub theme: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Meta {
    /// Metadata with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

impl ComponentValue for Meta {
    const KIND: ComponentKind = ComponentKind::Meta;
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

/// Encoding of body bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Csv,
    Json,
}

impl DataFormat {
    /// File extension, also used in body blob labels.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Infer a format from a file name such as `body.csv`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        ext.to_ascii_lowercase().parse().ok()
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for DataFormat {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(DatasetError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Shape of the body plus statistics computed from it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<DataFormat>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub format_config: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Number of body rows.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub entries: u64,
    /// Number of rows that failed schema validation.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub err_count: u64,
    /// Hex BLAKE3 digest of the body bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Body size in bytes.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub length: u64,
    /// Nesting depth of the body.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub depth: u64,
}

impl Structure {
    /// A structure with only a format set.
    pub fn with_format(format: DataFormat) -> Self {
        Self {
            format: Some(format),
            ..Self::default()
        }
    }

    /// The body format, or [`DatasetError::MissingFormat`].
    pub fn data_format(&self) -> DatasetResult<DataFormat> {
        self.format.ok_or(DatasetError::MissingFormat)
    }

    /// Whether the first csv record is a header row.
    pub fn header_row(&self) -> bool {
        self.format_config
            .get("headerRow")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Schema applied to each row: the `items` of the body schema.
    pub fn row_schema(&self) -> Option<&Value> {
        self.schema.as_ref()?.get("items")
    }

    /// Declared column `type` and `title` for tabular bodies, by position.
    pub fn columns(&self) -> Vec<(Option<&str>, Option<&str>)> {
        self.row_schema()
            .and_then(|row| row.get("items"))
            .and_then(Value::as_array)
            .map(|cols| {
                cols.iter()
                    .map(|col| {
                        (
                            col.get("type").and_then(Value::as_str),
                            col.get("title").and_then(Value::as_str),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Copy of this structure with the computed statistics cleared.
    pub fn without_stats(&self) -> Self {
        Self {
            entries: 0,
            err_count: 0,
            checksum: None,
            length: 0,
            depth: 0,
            ..self.clone()
        }
    }
}

impl ComponentValue for Structure {
    const KIND: ComponentKind = ComponentKind::Structure;
}

// ---------------------------------------------------------------------------
// Scripted components
// ---------------------------------------------------------------------------

/// Components that may embed a script, stored as its own blob on write.
pub trait Scripted {
    /// Label for the script blob.
    const SCRIPT_LABEL: &'static str;

    fn script_bytes(&self) -> Option<&str>;
    fn script_path(&self) -> Option<&ContentPath>;
    fn take_script_bytes(&mut self) -> Option<String>;
    fn set_script_bytes(&mut self, script: String);
    fn set_script_path(&mut self, path: Option<ContentPath>);
}

macro_rules! impl_scripted {
    ($ty:ty, $label:literal) => {
        impl Scripted for $ty {
            const SCRIPT_LABEL: &'static str = $label;

            fn script_bytes(&self) -> Option<&str> {
                self.script_bytes.as_deref()
            }

            fn script_path(&self) -> Option<&ContentPath> {
                self.script_path.as_ref()
            }

            fn take_script_bytes(&mut self) -> Option<String> {
                self.script_bytes.take()
            }

            fn set_script_bytes(&mut self, script: String) {
                self.script_bytes = Some(script);
            }

            fn set_script_path(&mut self, path: Option<ContentPath>) {
                self.script_path = path;
            }
        }
    };
}

/// Script that produced (or re-produces) the body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax_version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_path: Option<ContentPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_bytes: Option<String>,
}

impl ComponentValue for Transform {
    const KIND: ComponentKind = ComponentKind::Transform;
}

impl_scripted!(Transform, "transform_script");

/// Visualization template and its rendered output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viz {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_path: Option<ContentPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered_path: Option<ContentPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_bytes: Option<String>,
}

impl ComponentValue for Viz {
    const KIND: ComponentKind = ComponentKind::Viz;
}

impl_scripted!(Viz, "viz_script");

/// Human-readable documentation, usually markdown.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Readme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_path: Option<ContentPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_bytes: Option<String>,
}

impl Readme {
    /// A readme with inline markdown content.
    pub fn markdown(content: impl Into<String>) -> Self {
        Self {
            format: Some("md".into()),
            script_bytes: Some(content.into()),
            ..Self::default()
        }
    }
}

impl ComponentValue for Readme {
    const KIND: ComponentKind = ComponentKind::Readme;
}

impl_scripted!(Readme, "readme_script");
