//! Streaming row readers over encoded body bytes.
//!
//! Both readers hold at most one row in memory: csv through the `csv` crate's
//! record buffer, json through a scanner that slices one top-level array
//! element at a time out of the byte stream.

use std::io::{BufReader, Bytes, Read};

use serde_json::{Number, Value};

use crate::error::{DatasetError, DatasetResult};
use crate::model::{DataFormat, Structure};

/// Row iterator over a body in any supported format.
pub enum BodyRows<R: Read> {
    /// Rows already held in memory.
    Values(std::vec::IntoIter<Value>),
    Csv(CsvRows<R>),
    Json(JsonRows<R>),
}

impl<R: Read> BodyRows<R> {
    /// Open a reader for bytes encoded in the structure's format.
    pub fn open(reader: R, structure: &Structure) -> DatasetResult<Self> {
        Ok(match structure.data_format()? {
            DataFormat::Csv => Self::Csv(CsvRows::new(reader, structure)),
            DataFormat::Json => Self::Json(JsonRows::new(reader)),
        })
    }
}

impl<R: Read> Iterator for BodyRows<R> {
    type Item = DatasetResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Values(rows) => rows.next().map(Ok),
            Self::Csv(rows) => rows.next(),
            Self::Json(rows) => rows.next(),
        }
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// CSV records as arrays of cells typed by the schema's column types.
///
/// Cells that do not parse as their declared type stay strings, which the
/// schema validator then counts as errors.
pub struct CsvRows<R> {
    reader: csv::Reader<R>,
    record: csv::StringRecord,
    types: Vec<Option<String>>,
    done: bool,
}

impl<R: Read> CsvRows<R> {
    pub fn new(reader: R, structure: &Structure) -> Self {
        let types = structure
            .columns()
            .into_iter()
            .map(|(ty, _)| ty.map(str::to_string))
            .collect();
        let reader = csv::ReaderBuilder::new()
            .has_headers(structure.header_row())
            .flexible(true)
            .from_reader(reader);
        Self {
            reader,
            record: csv::StringRecord::new(),
            types,
            done: false,
        }
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = DatasetResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record(&mut self.record) {
            Ok(true) => {
                let cells = self
                    .record
                    .iter()
                    .enumerate()
                    .map(|(i, raw)| typed_cell(raw, self.types.get(i).and_then(Option::as_deref)))
                    .collect();
                Some(Ok(Value::Array(cells)))
            }
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

fn typed_cell(raw: &str, ty: Option<&str>) -> Value {
    let parsed = match ty {
        Some("integer") => raw.trim().parse::<i64>().ok().map(Value::from),
        Some("number") => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        Some("boolean") => match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    };
    parsed.unwrap_or_else(|| Value::String(raw.to_string()))
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Start,
    Elements,
    Done,
}

/// Elements of a top-level json array, parsed one at a time.
pub struct JsonRows<R> {
    bytes: Bytes<BufReader<R>>,
    pending: Option<u8>,
    state: ScanState,
    buf: Vec<u8>,
    index: usize,
}

impl<R: Read> JsonRows<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
            pending: None,
            state: ScanState::Start,
            buf: Vec::new(),
            index: 0,
        }
    }

    fn next_byte(&mut self) -> DatasetResult<Option<u8>> {
        if let Some(b) = self.pending.take() {
            return Ok(Some(b));
        }
        Ok(self.bytes.next().transpose()?)
    }

    fn next_non_ws(&mut self) -> DatasetResult<Option<u8>> {
        loop {
            match self.next_byte()? {
                Some(b) if b.is_ascii_whitespace() => continue,
                other => return Ok(other),
            }
        }
    }

    /// Consume the opening bracket. Returns `false` for an empty array.
    fn open_array(&mut self) -> DatasetResult<bool> {
        if self.next_non_ws()? != Some(b'[') {
            return Err(DatasetError::NotAnArray);
        }
        match self.next_non_ws()? {
            Some(b']') => {
                self.expect_end()?;
                Ok(false)
            }
            Some(b) => {
                self.pending = Some(b);
                Ok(true)
            }
            None => Err(DatasetError::UnexpectedEnd(0)),
        }
    }

    /// Only whitespace may follow the closing bracket.
    fn expect_end(&mut self) -> DatasetResult<()> {
        match self.next_non_ws()? {
            None => Ok(()),
            Some(_) => Err(DatasetError::TrailingContent),
        }
    }

    /// Slice the next element out of the stream, up to its separator.
    fn scan_element(&mut self) -> DatasetResult<Value> {
        self.buf.clear();
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        loop {
            let b = self
                .next_byte()?
                .ok_or(DatasetError::UnexpectedEnd(self.index))?;
            if in_string {
                self.buf.push(b);
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'[' | b'{' => depth += 1,
                b']' | b'}' if depth > 0 => depth -= 1,
                b',' if depth == 0 => break,
                b']' if depth == 0 => {
                    self.state = ScanState::Done;
                    break;
                }
                _ => {}
            }
            self.buf.push(b);
        }
        let value = serde_json::from_slice(&self.buf)?;
        if self.state == ScanState::Done {
            self.expect_end()?;
        }
        Ok(value)
    }
}

impl<R: Read> Iterator for JsonRows<R> {
    type Item = DatasetResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == ScanState::Start {
            match self.open_array() {
                Ok(true) => self.state = ScanState::Elements,
                Ok(false) => {
                    self.state = ScanState::Done;
                    return None;
                }
                Err(e) => {
                    self.state = ScanState::Done;
                    return Some(Err(e));
                }
            }
        }
        if self.state == ScanState::Done {
            return None;
        }
        let row = self.scan_element();
        if row.is_err() {
            self.state = ScanState::Done;
        }
        self.index += 1;
        Some(row)
    }
}
