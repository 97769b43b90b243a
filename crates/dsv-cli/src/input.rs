//! Dataset documents read from disk.
//!
//! A document is a dataset manifest in JSON. It may carry its body inline as
//! a `"body"` array of rows, or name a data file with `"bodyFile"`, resolved
//! relative to the document.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use dsv_dataset::{Body, Dataset};
use serde_json::Value;

pub struct Document {
    /// The document as written, body included.
    pub raw: Value,
    pub dataset: Dataset,
}

pub fn read_document(path: &Path) -> anyhow::Result<Document> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let raw: Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    let Value::Object(mut fields) = raw.clone() else {
        bail!("{}: dataset document must be a JSON object", path.display());
    };

    let body = match (fields.remove("body"), fields.remove("bodyFile")) {
        (Some(_), Some(_)) => bail!("{}: give either body or bodyFile", path.display()),
        (Some(Value::Array(rows)), None) => Some(Body::Rows(rows)),
        (Some(_), None) => bail!("{}: body must be an array of rows", path.display()),
        (None, Some(Value::String(name))) => Some(read_body_file(path, &name)?),
        (None, Some(_)) => bail!("{}: bodyFile must be a file name", path.display()),
        (None, None) => None,
    };

    let mut dataset: Dataset = serde_json::from_value(Value::Object(fields))
        .with_context(|| format!("decoding dataset {}", path.display()))?;
    dataset.body = body;
    Ok(Document { raw, dataset })
}

fn read_body_file(document: &Path, name: &str) -> anyhow::Result<Body> {
    let file = document.parent().unwrap_or(Path::new(".")).join(name);
    let data = fs::read(&file).with_context(|| format!("reading body {}", file.display()))?;
    let label = file
        .file_name()
        .map_or_else(|| name.to_string(), |n| n.to_string_lossy().into_owned());
    Ok(Body::file(label, data))
}

/// The part of a document a diff selector names. The whole document when no
/// selector is given.
pub fn select<'a>(raw: &'a Value, selector: Option<&str>) -> Option<&'a Value> {
    match selector {
        None => Some(raw),
        Some(key) => raw.get(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("dsv-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn inline_rows_become_body() {
        let path = write_temp(
            "inline.json",
            r#"{"meta": {"title": "fruit"}, "body": [["apple", 1]]}"#,
        );
        let doc = read_document(&path).unwrap();
        assert_eq!(doc.dataset.meta().unwrap().title.as_deref(), Some("fruit"));
        assert_eq!(doc.dataset.body, Some(Body::Rows(vec![json!(["apple", 1])])));
        assert_eq!(doc.raw["body"], json!([["apple", 1]]));
    }

    #[test]
    fn body_file_is_read_beside_document() {
        write_temp("rows.csv", "a,1\nb,2\n");
        let path = write_temp("with_file.json", r#"{"bodyFile": "rows.csv"}"#);
        let doc = read_document(&path).unwrap();
        match doc.dataset.body {
            Some(Body::File(file)) => {
                assert_eq!(file.name, "rows.csv");
                assert_eq!(&file.data[..], b"a,1\nb,2\n");
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn rejects_non_object() {
        let path = write_temp("array.json", "[1, 2]");
        assert!(read_document(&path).is_err());
    }

    #[test]
    fn selector_picks_component() {
        let raw = json!({"meta": {"title": "x"}});
        assert_eq!(select(&raw, Some("meta")), Some(&json!({"title": "x"})));
        assert_eq!(select(&raw, Some("viz")), None);
        assert_eq!(select(&raw, None), Some(&raw));
    }
}
