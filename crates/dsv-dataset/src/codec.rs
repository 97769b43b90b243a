//! Canonical encoding of component documents and manifests.
//!
//! Encoded documents are compact JSON with object keys sorted at every level
//! and the kind's `qri` tag inserted, so logically equal values always encode
//! to identical bytes.

use serde_json::{Map, Value};

use crate::component::ComponentValue;
use crate::dataset::Dataset;
use crate::error::{DatasetError, DatasetResult};
use crate::kind::{ComponentKind, DATASET_TAG};

/// Encode a component value to canonical bytes.
pub fn encode<T: ComponentValue>(value: &T) -> DatasetResult<Vec<u8>> {
    Ok(serde_json::to_vec(&to_tagged_value(value)?)?)
}

/// Decode a component document. The `qri` tag must match `T` when present;
/// a stray `path` key is ignored.
pub fn decode<T: ComponentValue>(bytes: &[u8]) -> DatasetResult<T> {
    let mut map = match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(map) => map,
        other => {
            return Err(DatasetError::InvalidComponent {
                kind: T::KIND,
                reason: format!("expected object, got {other}"),
            })
        }
    };
    check_tag(T::KIND, map.remove("qri"))?;
    map.remove("path");
    Ok(serde_json::from_value(Value::Object(map))?)
}

/// Encode a root manifest. Components serialize in their wire form.
pub fn encode_manifest(dataset: &Dataset) -> DatasetResult<Vec<u8>> {
    let mut value = serde_json::to_value(dataset)?;
    if let Value::Object(map) = &mut value {
        map.insert("qri".into(), Value::String(DATASET_TAG.into()));
    }
    Ok(serde_json::to_vec(&canonical(value))?)
}

/// Decode a root manifest.
pub fn decode_manifest(bytes: &[u8]) -> DatasetResult<Dataset> {
    let value: Value = serde_json::from_slice(bytes)?;
    if let Some(tag) = value.get("qri").and_then(Value::as_str) {
        if tag != DATASET_TAG {
            return Err(DatasetError::ManifestTag(tag.to_string()));
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Serialize a value and insert its kind tag, with keys in canonical order.
pub fn to_tagged_value<T: ComponentValue>(value: &T) -> DatasetResult<Value> {
    let mut value = serde_json::to_value(value)?;
    if let Value::Object(map) = &mut value {
        map.insert("qri".into(), Value::String(T::KIND.tag().into()));
    }
    Ok(canonical(value))
}

pub(crate) fn check_tag(kind: ComponentKind, tag: Option<Value>) -> DatasetResult<()> {
    match tag {
        None => Ok(()),
        Some(Value::String(tag)) if tag == kind.tag() => Ok(()),
        Some(other) => Err(DatasetError::TagMismatch {
            kind,
            expected: kind.tag(),
            found: match other {
                Value::String(s) => s,
                v => v.to_string(),
            },
        }),
    }
}

/// Rebuild every object with its keys in sorted order.
pub fn canonical(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, child) in entries {
                sorted.insert(key, canonical(child));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonical).collect()),
        scalar => scalar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::model::{Commit, Meta, Readme, Structure};
    use dsv_types::ContentPath;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn encode_is_tagged_and_sorted() {
        let meta = Meta {
            title: Some("t".into()),
            description: Some("d".into()),
            ..Meta::default()
        };
        let bytes = encode(&meta).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"description":"d","qri":"md:0","title":"t"}"#
        );
    }

    #[test]
    fn nested_maps_are_sorted() {
        let st: Structure = serde_json::from_value(json!({
            "format": "csv",
            "formatConfig": {"zeta": 1, "alpha": 2, "headerRow": true}
        }))
        .unwrap();
        let text = String::from_utf8(encode(&st).unwrap()).unwrap();
        assert_eq!(
            text,
            r#"{"format":"csv","formatConfig":{"alpha":2,"headerRow":true,"zeta":1},"qri":"st:0"}"#
        );
    }

    #[test]
    fn decode_inverts_encode() {
        let readme = Readme::markdown("# title\n");
        assert_eq!(decode::<Readme>(&encode(&readme).unwrap()).unwrap(), readme);
    }

    #[test]
    fn decode_rejects_other_kind() {
        let bytes = encode(&Meta::titled("x")).unwrap();
        assert!(matches!(
            decode::<Structure>(&bytes),
            Err(DatasetError::TagMismatch { .. })
        ));
    }

    #[test]
    fn decode_rejects_non_objects() {
        assert!(decode::<Meta>(b"[1,2]").is_err());
        assert!(decode::<Meta>(b"not json").is_err());
    }

    #[test]
    fn manifest_roundtrip() {
        let ds = Dataset {
            peername: "me".into(),
            name: "cities".into(),
            commit: Some(Commit::with_title("initial").into()),
            structure: Some(Structure::with_format(crate::DataFormat::Csv).into()),
            meta: Some(Component::reference(ContentPath::parse("/map/meta").unwrap())),
            body_path: Some(ContentPath::parse("/map/body").unwrap()),
            ..Dataset::default()
        };
        let bytes = encode_manifest(&ds).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["qri"], "ds:0");
        assert_eq!(value["meta"], json!({"path": "/map/meta", "qri": "md:0"}));
        assert_eq!(value["commit"]["qri"], "cm:0");
        assert_eq!(decode_manifest(&bytes).unwrap(), ds);
    }

    #[test]
    fn manifest_with_wrong_tag_is_rejected() {
        assert!(decode_manifest(br#"{"qri":"md:0"}"#).is_err());
    }

    proptest! {
        #[test]
        fn equal_values_encode_identically(
            title in ".{0,24}",
            keywords in proptest::collection::vec("[a-z]{1,8}", 0..5),
        ) {
            let a = Meta { title: Some(title.clone()), keywords: keywords.clone(), ..Meta::default() };
            let b = Meta { keywords, title: Some(title), ..Meta::default() };
            prop_assert_eq!(encode(&a).unwrap(), encode(&b).unwrap());
        }

        #[test]
        fn canonical_is_idempotent(keys in proptest::collection::btree_map("[a-z]{1,6}", 0i64..100, 0..8)) {
            let value = serde_json::to_value(&keys).unwrap();
            let once = canonical(value);
            prop_assert_eq!(canonical(once.clone()), once);
        }
    }
}
