//! Body statistics computed in a single forward pass.

use std::io::{self, Read};

use dsv_crypto::ContentHasher;
use dsv_dataset::{depth, BodyRows, SchemaValidator, Structure};
use serde::Serialize;

use crate::error::DsfsResult;

/// Figures recorded into a structure for its body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyStats {
    pub entries: u64,
    pub err_count: u64,
    /// Hex BLAKE3 digest of the body bytes.
    pub checksum: String,
    pub length: u64,
    /// Nesting depth of the body as a whole: one more than its deepest row.
    pub depth: u64,
}

impl BodyStats {
    /// Copy the figures into `structure`.
    pub fn apply(&self, structure: &mut Structure) {
        structure.entries = self.entries;
        structure.err_count = self.err_count;
        structure.checksum = Some(self.checksum.clone());
        structure.length = self.length;
        structure.depth = self.depth;
    }
}

/// Reader that counts and hashes every byte passing through it.
struct HashingReader<R> {
    inner: R,
    hasher: blake3::Hasher,
    length: u64,
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.length += n as u64;
        Ok(n)
    }
}

/// Stream a body once, counting rows, schema failures and bytes while
/// hashing it.
///
/// Only the current row is held in memory. Bytes the row reader leaves
/// unread (trailing whitespace, a csv reader's unconsumed buffer) are still
/// counted and hashed.
pub fn compute_stats<R: Read>(
    reader: R,
    structure: &Structure,
    validator: &dyn SchemaValidator,
) -> DsfsResult<BodyStats> {
    let mut source = HashingReader {
        inner: reader,
        hasher: ContentHasher::BODY.streaming(),
        length: 0,
    };
    let mut stats = BodyStats::default();
    let mut deepest = 0usize;
    {
        let rows = BodyRows::open(&mut source, structure)?;
        for row in rows {
            let row = row?;
            stats.entries += 1;
            if !validator.validate_row(structure, &row).is_empty() {
                stats.err_count += 1;
            }
            deepest = deepest.max(depth(&row));
        }
    }
    io::copy(&mut source, &mut io::sink())?;

    stats.depth = deepest as u64 + 1;
    stats.length = source.length;
    stats.checksum = source.hasher.finalize().to_hex().to_string();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsv_dataset::{DataFormat, JsonSchemaValidator};
    use serde_json::json;

    fn csv_structure() -> Structure {
        Structure {
            format: Some(DataFormat::Csv),
            format_config: [("headerRow".to_string(), json!(true))].into(),
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
    fn csv_stats() {
        let body = b"city,pop\ntoronto,40000000\nnew york,lots\nchicago,300000\n";
        let stats = compute_stats(&body[..], &csv_structure(), &JsonSchemaValidator).unwrap();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.err_count, 1);
        assert_eq!(stats.length, body.len() as u64);
        assert_eq!(stats.depth, 2);
        assert_eq!(stats.checksum, ContentHasher::BODY.hash_hex(body));
    }

    #[test]
    fn json_stats() {
        let body = br#"[{"a": {"b": 1}}, {"a": 2}]   "#;
        let structure = Structure::with_format(DataFormat::Json);
        let stats = compute_stats(&body[..], &structure, &JsonSchemaValidator).unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.err_count, 0);
        assert_eq!(stats.depth, 3);
        assert_eq!(stats.length, body.len() as u64);
        assert_eq!(stats.checksum, ContentHasher::BODY.hash_hex(body));
    }

    #[test]
    fn empty_body_has_depth_one() {
        let structure = Structure::with_format(DataFormat::Json);
        let stats = compute_stats(&b"[]"[..], &structure, &JsonSchemaValidator).unwrap();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.depth, 1);
    }

    #[test]
    fn apply_fills_structure() {
        let mut structure = Structure::with_format(DataFormat::Json);
        let stats = BodyStats {
            entries: 2,
            err_count: 1,
            checksum: "abc".into(),
            length: 10,
            depth: 2,
        };
        stats.apply(&mut structure);
        assert_eq!(structure.entries, 2);
        assert_eq!(structure.checksum.as_deref(), Some("abc"));
        assert_eq!(structure.without_stats(), Structure::with_format(DataFormat::Json));
    }

    #[test]
    fn malformed_body_fails() {
        let structure = Structure::with_format(DataFormat::Json);
        assert!(compute_stats(&b"{\"a\": 1}"[..], &structure, &JsonSchemaValidator).is_err());
    }
}
