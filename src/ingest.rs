//! Ingestion boundary: turning raw input into documents.
//!
//! The engine itself only ever sees valid UTF-8 text. Anything that arrives
//! as bytes is decoded here, and malformed input is rejected before it can
//! reach a staging buffer.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TesseraError};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// One document record as found in JSON input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Caller-supplied document id.
    pub id: String,
    /// Raw document text.
    pub text: String,
}

impl SourceDocument {
    /// Create a new document record.
    pub fn new<I: Into<String>, T: Into<String>>(id: I, text: T) -> Self {
        SourceDocument {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Decode raw bytes into text.
///
/// A leading UTF-8 byte-order mark is dropped. Invalid UTF-8 is an
/// [`Encoding`](TesseraError::Encoding) error naming the first bad offset.
///
/// # Examples
///
/// ```
/// use tessera::ingest::decode_text;
///
/// assert_eq!(decode_text("全文".as_bytes()).unwrap(), "全文");
/// assert!(decode_text(&[0xff, 0xfe]).is_err());
/// ```
pub fn decode_text(bytes: &[u8]) -> Result<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        TesseraError::encoding(format!(
            "invalid UTF-8 at byte {}",
            e.utf8_error().valid_up_to()
        ))
    })
}

/// Read document records from a JSON array or from JSON Lines.
///
/// Input whose first non-blank character is `[` is parsed as one array;
/// anything else is read line by line, skipping blank lines. Errors name
/// the 1-based line that failed.
pub fn read_documents<R: BufRead>(mut reader: R) -> Result<Vec<SourceDocument>> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    let content = decode_text(&raw)?;

    if content.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(&content)?);
    }

    let mut documents = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let document: SourceDocument = serde_json::from_str(line).map_err(|e| {
            TesseraError::invalid_argument(format!(
                "Error parsing document on line {}: {}",
                line_num + 1,
                e
            ))
        })?;
        documents.push(document);
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("开源".as_bytes());
        assert_eq!(decode_text(&bytes).unwrap(), "开源");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let mut bytes = "ab".as_bytes().to_vec();
        bytes.push(0xC3);
        let err = decode_text(&bytes).unwrap_err();
        assert!(matches!(err, TesseraError::Encoding(_)));
        assert!(err.to_string().contains("byte 2"));
    }

    #[test]
    fn test_read_json_lines() {
        let input = "{\"id\": \"id 0\", \"text\": \"全文检索引擎\"}\n\n{\"id\": \"id 1\", \"text\": \"开源工具包\"}\n";
        let docs = read_documents(Cursor::new(input)).unwrap();
        assert_eq!(
            docs,
            vec![
                SourceDocument::new("id 0", "全文检索引擎"),
                SourceDocument::new("id 1", "开源工具包"),
            ]
        );
    }

    #[test]
    fn test_read_json_array() {
        let input = r#"  [{"id": "a", "text": "x"}, {"id": "b", "text": "y"}]"#;
        let docs = read_documents(Cursor::new(input)).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].id, "b");
    }

    #[test]
    fn test_read_reports_line_number() {
        let input = "{\"id\": \"a\", \"text\": \"x\"}\n{\"id\": 3}\n";
        let err = read_documents(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
