use bytes::Bytes;
use dsv_dataset::{
    codec, Body, Component, ComponentValue, DatasetError, Dataset, Scripted, Structure,
};
use dsv_store::ContentStore;
use dsv_types::ContentPath;
use tracing::{debug, info};

use crate::error::{DsfsError, DsfsResult};

/// Label of the root manifest blob.
pub const MANIFEST_LABEL: &str = "dataset.json";

/// Persist a dataset and return the path of its root manifest.
///
/// Scripts are stored first so their documents can reference them, then
/// meta, transform, viz and readme each become a reference to their own
/// blob. Commit and structure stay inline in the manifest. An in-memory body
/// is encoded in the structure's format and addressed through `bodyPath`.
/// Writing never mutates existing blobs; deduplication is left to the store.
pub fn write(store: &dyn ContentStore, dataset: &Dataset, pin: bool) -> DsfsResult<ContentPath> {
    if dataset.is_empty() {
        return Err(DsfsError::EmptyDataset);
    }

    let mut manifest = Dataset {
        path: None,
        previous_path: dataset.previous_path.clone(),
        peername: dataset.peername.clone(),
        name: dataset.name.clone(),
        commit: dataset.commit.clone(),
        meta: put_component(store, dataset.meta.clone())?,
        structure: dataset.structure.clone(),
        transform: put_scripted(store, dataset.transform.clone())?,
        viz: put_scripted(store, dataset.viz.clone())?,
        readme: put_scripted(store, dataset.readme.clone())?,
        body_path: dataset.body_path.clone(),
        body: None,
    };
    if let Some(body) = &dataset.body {
        manifest.body_path = Some(put_body(store, body, dataset.structure())?);
    }

    let bytes = codec::encode_manifest(&manifest)?;
    let path = store.put(MANIFEST_LABEL, Bytes::from(bytes))?;
    if pin {
        store.pin(&path, true)?;
    }
    info!(
        path = %path,
        name = %manifest.reference_name(),
        pinned = pin,
        "wrote dataset"
    );
    Ok(path)
}

fn put_component<T: ComponentValue>(
    store: &dyn ContentStore,
    component: Option<Component<T>>,
) -> DsfsResult<Option<Component<T>>> {
    match component {
        Some(Component::Inline(value)) if value.is_empty() => Ok(None),
        Some(Component::Inline(value)) => {
            let path = store.put(T::KIND.file_name(), Bytes::from(codec::encode(&value)?))?;
            debug!(component = %T::KIND, path = %path, "stored component");
            Ok(Some(Component::Reference(path)))
        }
        other => Ok(other),
    }
}

fn put_scripted<T: ComponentValue + Scripted>(
    store: &dyn ContentStore,
    mut component: Option<Component<T>>,
) -> DsfsResult<Option<Component<T>>> {
    if let Some(value) = component.as_mut().and_then(Component::value_mut) {
        if let Some(script) = value.take_script_bytes() {
            let path = store.put(T::SCRIPT_LABEL, Bytes::from(script.into_bytes()))?;
            debug!(label = T::SCRIPT_LABEL, path = %path, "stored script");
            value.set_script_path(Some(path));
        }
    }
    put_component(store, component)
}

fn put_body(
    store: &dyn ContentStore,
    body: &Body,
    structure: Option<&Structure>,
) -> DsfsResult<ContentPath> {
    let format = structure
        .and_then(|s| s.format)
        .or_else(|| body.format_hint())
        .ok_or(DatasetError::MissingFormat)?;
    let structure = Structure {
        format: Some(format),
        ..structure.cloned().unwrap_or_default()
    };
    let data = body.encode(&structure)?;
    let label = format!("body.{}", format.extension());
    let size = data.len();
    let path = store.put(&label, data)?;
    debug!(label = %label, path = %path, size, "stored body");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsv_dataset::{Commit, DataFormat, Meta, Readme, Transform, Viz};
    use dsv_store::InMemoryContentStore;
    use serde_json::{json, Value};

    fn full_dataset() -> Dataset {
        Dataset {
            peername: "me".into(),
            name: "cities".into(),
            commit: Some(Commit::with_title("initial commit").into()),
            meta: Some(Meta::titled("example city data").into()),
            structure: Some(Structure::with_format(DataFormat::Json).into()),
            transform: Some(
                Transform {
                    syntax: Some("starlark".into()),
                    script_bytes: Some("def transform(ds):\n  pass\n".into()),
                    ..Transform::default()
                }
                .into(),
            ),
            viz: Some(
                Viz {
                    format: Some("html".into()),
                    script_bytes: Some("<html></html>".into()),
                    ..Viz::default()
                }
                .into(),
            ),
            readme: Some(Readme::markdown("# cities\n").into()),
            body: Some(Body::Rows(vec![json!(["toronto", 40]), json!(["new york", 20])])),
            ..Dataset::default()
        }
    }

    fn manifest(store: &InMemoryContentStore, path: &ContentPath) -> Value {
        serde_json::from_slice(&store.get_bytes(path).unwrap()).unwrap()
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let store = InMemoryContentStore::new();
        let err = write(&store, &Dataset::default(), true).unwrap_err();
        assert_eq!(err.to_string(), "cannot save empty dataset");
        assert!(store.is_empty());
    }

    #[test]
    fn components_become_references() {
        let store = InMemoryContentStore::new();
        let path = write(&store, &full_dataset(), true).unwrap();
        let doc = manifest(&store, &path);

        assert_eq!(doc["qri"], "ds:0");
        assert_eq!(doc["commit"]["title"], "initial commit");
        assert_eq!(doc["structure"]["format"], "json");
        for key in ["meta", "transform", "viz", "readme"] {
            let component = doc[key].as_object().unwrap();
            assert_eq!(component.len(), 2, "{key} should be a reference");
            assert!(component.contains_key("path"));
        }
        assert!(doc["bodyPath"].is_string());
        assert_eq!(doc["peername"], "me");
        assert!(doc.get("path").is_none());

        // manifest, meta, transform, viz, readme, three scripts and the body
        assert_eq!(store.len(), 9);
        assert!(store.is_pinned(&path));
    }

    #[test]
    fn scripts_are_stored_under_labels() {
        let store = InMemoryContentStore::new();
        write(&store, &full_dataset(), false).unwrap();
        let labels: Vec<String> = store
            .all_paths()
            .iter()
            .filter_map(|p| store.label(p))
            .collect();
        for label in ["transform_script", "viz_script", "readme_script", "body.json"] {
            assert!(labels.iter().any(|l| l == label), "missing {label}");
        }
    }

    #[test]
    fn script_documents_point_at_scripts() {
        let store = InMemoryContentStore::new();
        let path = write(&store, &full_dataset(), false).unwrap();
        let doc = manifest(&store, &path);
        let readme_path = ContentPath::parse(doc["readme"]["path"].as_str().unwrap()).unwrap();
        let readme: Readme = codec::decode(&store.get_bytes(&readme_path).unwrap()).unwrap();
        assert!(readme.script_bytes.is_none());
        let script = store.get_bytes(readme.script_path.as_ref().unwrap()).unwrap();
        assert_eq!(script, b"# cities\n");
    }

    #[test]
    fn identical_writes_share_a_path() {
        let store = InMemoryContentStore::new();
        let a = write(&store, &full_dataset(), false).unwrap();
        let count = store.len();
        let b = write(&store, &full_dataset(), false).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), count);
    }

    #[test]
    fn shared_scripts_are_stored_once() {
        let store = InMemoryContentStore::new();
        write(&store, &full_dataset(), false).unwrap();
        let count = store.len();
        let mut renamed = full_dataset();
        renamed.meta = Some(Meta::titled("renamed").into());
        write(&store, &renamed, false).unwrap();
        // only the new meta document and the new manifest
        assert_eq!(store.len(), count + 2);
    }

    #[test]
    fn csv_body_is_encoded_with_structure() {
        let store = InMemoryContentStore::new();
        let ds = Dataset {
            structure: Some(Structure::with_format(DataFormat::Csv).into()),
            body: Some(Body::Rows(vec![json!(["a", 1]), json!(["b", 2])])),
            ..Dataset::default()
        };
        let path = write(&store, &ds, false).unwrap();
        let doc = manifest(&store, &path);
        let body_path = ContentPath::parse(doc["bodyPath"].as_str().unwrap()).unwrap();
        assert_eq!(store.get_bytes(&body_path).unwrap(), b"a,1\nb,2\n");
        assert_eq!(store.label(&body_path).as_deref(), Some("body.csv"));
    }

    #[test]
    fn existing_references_are_kept() {
        let store = InMemoryContentStore::new();
        let meta_path = ContentPath::parse("/map/elsewhere").unwrap();
        let ds = Dataset {
            meta: Some(Component::reference(meta_path.clone())),
            commit: Some(Commit::with_title("t").into()),
            ..Dataset::default()
        };
        let path = write(&store, &ds, false).unwrap();
        assert_eq!(manifest(&store, &path)["meta"]["path"], meta_path.as_str());
        assert_eq!(store.len(), 1);
    }
}
