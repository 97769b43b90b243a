use std::io::Cursor;

use bytes::Bytes;
use serde_json::Value;

use crate::error::{DatasetError, DatasetResult};
use crate::model::{DataFormat, Structure};
use crate::rows::BodyRows;

/// Body supplied with a dataset before it is written.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// Already-parsed rows.
    Rows(Vec<Value>),
    /// Raw bytes encoded in the structure's format.
    File(BodyFile),
}

/// A named body file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BodyFile {
    pub name: String,
    pub data: Bytes,
}

impl Body {
    /// A body backed by raw file bytes.
    pub fn file(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::File(BodyFile {
            name: name.into(),
            data: data.into(),
        })
    }

    /// Format implied by the body itself: a file's extension, or json for
    /// parsed rows.
    pub fn format_hint(&self) -> Option<DataFormat> {
        match self {
            Self::Rows(_) => Some(DataFormat::Json),
            Self::File(file) => DataFormat::from_file_name(&file.name),
        }
    }

    /// Encode the body in the structure's format.
    pub fn encode(&self, structure: &Structure) -> DatasetResult<Bytes> {
        match self {
            Self::File(file) => Ok(file.data.clone()),
            Self::Rows(rows) => match structure.data_format()? {
                DataFormat::Json => Ok(Bytes::from(serde_json::to_vec(rows)?)),
                DataFormat::Csv => encode_csv(rows, structure).map(Bytes::from),
            },
        }
    }

    /// Iterate the body's rows.
    pub fn rows(&self, structure: &Structure) -> DatasetResult<BodyRows<Cursor<Bytes>>> {
        match self {
            Self::Rows(rows) => Ok(BodyRows::Values(rows.clone().into_iter())),
            Self::File(file) => BodyRows::open(Cursor::new(file.data.clone()), structure),
        }
    }
}

fn encode_csv(rows: &[Value], structure: &Structure) -> DatasetResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    if structure.header_row() {
        let header = header_record(rows, structure);
        if !header.is_empty() {
            writer.write_record(&header)?;
        }
    }
    for (index, row) in rows.iter().enumerate() {
        let cells = row.as_array().ok_or_else(|| DatasetError::RowEncoding {
            index,
            reason: "csv rows must be arrays".into(),
        })?;
        writer.write_record(cells.iter().map(cell_text))?;
    }
    writer.flush()?;
    writer.into_inner().map_err(|e| {
        let err = e.error();
        DatasetError::Io(std::io::Error::new(err.kind(), err.to_string()))
    })
}

/// Column names for a header row: schema titles where present, `field_N`
/// for the rest, wide enough for the widest row.
fn header_record(rows: &[Value], structure: &Structure) -> Vec<String> {
    let columns = structure.columns();
    let width = rows
        .iter()
        .filter_map(Value::as_array)
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(columns.len());
    (0..width)
        .map(|i| match columns.get(i).and_then(|(_, title)| *title) {
            Some(title) => title.to_string(),
            None => format!("field_{}", i + 1),
        })
        .collect()
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn csv_structure(header: bool) -> Structure {
        Structure {
            format: Some(DataFormat::Csv),
            format_config: [("headerRow".to_string(), json!(header))].into(),
            schema: Some(json!({
                "type": "array",
                "items": {"type": "array", "items": [
                    {"title": "city", "type": "string"},
                    {"title": "pop", "type": "integer"}
                ]}
            })),
            ..Structure::default()
        }
    }

    #[test]
    fn rows_encode_as_csv() {
        let body = Body::Rows(vec![json!(["toronto", 40000000]), json!(["new york", 8500000])]);
        let bytes = body.encode(&csv_structure(false)).unwrap();
        assert_eq!(&bytes[..], b"toronto,40000000\nnew york,8500000\n");
    }

    #[test]
    fn csv_header_from_schema_titles() {
        let body = Body::Rows(vec![json!(["toronto", 1])]);
        let bytes = body.encode(&csv_structure(true)).unwrap();
        assert_eq!(&bytes[..], b"city,pop\ntoronto,1\n");
    }

    #[test]
    fn csv_header_is_generated_without_titles() {
        let structure = Structure {
            format: Some(DataFormat::Csv),
            format_config: [("headerRow".to_string(), json!(true))].into(),
            ..Structure::default()
        };
        let body = Body::Rows(vec![json!(["a", 1]), json!(["b", 2, true])]);
        let bytes = body.encode(&structure).unwrap();
        assert_eq!(&bytes[..], b"field_1,field_2,field_3\na,1\nb,2,true\n");

        let rows: Vec<Value> = BodyRows::open(Cursor::new(bytes), &structure)
            .unwrap()
            .collect::<DatasetResult<_>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn csv_rejects_non_array_rows() {
        let body = Body::Rows(vec![json!({"city": "x"})]);
        let err = body.encode(&csv_structure(false)).unwrap_err();
        assert!(matches!(err, DatasetError::RowEncoding { index: 0, .. }));
    }

    #[test]
    fn rows_encode_as_json() {
        let body = Body::Rows(vec![json!({"a": 1}), json!({"a": 2})]);
        let bytes = body.encode(&Structure::with_format(DataFormat::Json)).unwrap();
        assert_eq!(&bytes[..], br#"[{"a":1},{"a":2}]"#);
    }

    #[test]
    fn rows_need_a_format() {
        let body = Body::Rows(vec![json!([1])]);
        assert!(matches!(
            body.encode(&Structure::default()),
            Err(DatasetError::MissingFormat)
        ));
    }

    #[test]
    fn file_bytes_pass_through() {
        let body = Body::file("body.csv", &b"a,b\n"[..]);
        assert_eq!(body.format_hint(), Some(DataFormat::Csv));
        assert_eq!(&body.encode(&Structure::default()).unwrap()[..], b"a,b\n");
    }

    #[test]
    fn file_rows_are_parsed() {
        let body = Body::file("body.csv", &b"toronto,1\nparis,2\n"[..]);
        let rows: Vec<Value> = body
            .rows(&csv_structure(false))
            .unwrap()
            .collect::<DatasetResult<_>>()
            .unwrap();
        assert_eq!(rows, vec![json!(["toronto", 1]), json!(["paris", 2])]);
    }
}
