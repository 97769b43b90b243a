use dsv_types::ContentPath;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::codec;
use crate::error::{DatasetError, DatasetResult};
use crate::kind::ComponentKind;

/// A value type that can be stored as a dataset component.
pub trait ComponentValue:
    Clone + Default + PartialEq + std::fmt::Debug + Serialize + DeserializeOwned
{
    const KIND: ComponentKind;

    /// Whether no field is populated.
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A dataset component: either a reference to a stored document or the full
/// value.
///
/// On the wire a reference is an object carrying only `path` (and the kind's
/// `qri` tag); a bare path string is also accepted when decoding. Anything
/// else is an inline value.
#[derive(Clone, Debug, PartialEq)]
pub enum Component<T> {
    Reference(ContentPath),
    Inline(T),
}

impl<T: ComponentValue> Component<T> {
    /// Build a reference-only component.
    pub fn reference(path: ContentPath) -> Self {
        Self::Reference(path)
    }

    /// Wrap a full value.
    pub fn inline(value: T) -> Self {
        Self::Inline(value)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    /// An inline component with no populated field.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Reference(_) => false,
            Self::Inline(value) => value.is_empty(),
        }
    }

    /// The referenced path, if this is a reference.
    pub fn path(&self) -> Option<&ContentPath> {
        match self {
            Self::Reference(path) => Some(path),
            Self::Inline(_) => None,
        }
    }

    /// The full value, if this component is inline.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Reference(_) => None,
            Self::Inline(value) => Some(value),
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Reference(_) => None,
            Self::Inline(value) => Some(value),
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Reference(_) => None,
            Self::Inline(value) => Some(value),
        }
    }

    /// Tagged wire form.
    pub fn to_json(&self) -> DatasetResult<Value> {
        match self {
            Self::Reference(path) => {
                let mut map = Map::new();
                map.insert("path".into(), Value::String(path.to_string()));
                map.insert("qri".into(), Value::String(T::KIND.tag().into()));
                Ok(Value::Object(map))
            }
            Self::Inline(value) => codec::to_tagged_value(value),
        }
    }

    /// Parse the wire form.
    pub fn from_json(value: Value) -> DatasetResult<Self> {
        let mut map = match value {
            Value::String(s) => return Self::parse_reference(s),
            Value::Object(map) => map,
            other => {
                return Err(DatasetError::InvalidComponent {
                    kind: T::KIND,
                    reason: format!("expected object or path, got {other}"),
                })
            }
        };
        codec::check_tag(T::KIND, map.remove("qri"))?;
        let path = map.remove("path");
        if map.is_empty() {
            if let Some(Value::String(path)) = path {
                return Self::parse_reference(path);
            }
        }
        Ok(Self::Inline(serde_json::from_value(Value::Object(map))?))
    }

    fn parse_reference(path: String) -> DatasetResult<Self> {
        ContentPath::parse(path)
            .map(Self::Reference)
            .map_err(|e| DatasetError::InvalidComponent {
                kind: T::KIND,
                reason: e.to_string(),
            })
    }
}

impl<T: ComponentValue> From<T> for Component<T> {
    fn from(value: T) -> Self {
        Self::Inline(value)
    }
}

impl<T: ComponentValue> Serialize for Component<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de, T: ComponentValue> Deserialize<'de> for Component<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(value).map_err(serde::de::Error::custom)
    }
}
