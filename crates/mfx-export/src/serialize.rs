//! Delimited-text rendering of an [`OutputMatrix`].
//!
//! The document starts with a UTF-8 byte-order mark. Every cell is wrapped in
//! double quotes with embedded quotes doubled, cells are joined with the
//! configured separator and rows with `\n` (no trailing newline). Cells holding
//! a serialized array are flattened to their elements joined with `|`.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use mfx_model::OutputMatrix;
use tracing::warn;

use crate::error::{ExportError, Result};

/// UTF-8 byte-order mark.
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Joins the elements of array-valued cells.
pub const ARRAY_ELEMENT_SEPARATOR: &str = "|";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSerializer {
    separator: u8,
}

impl Default for TableSerializer {
    fn default() -> Self {
        Self { separator: b',' }
    }
}

impl TableSerializer {
    pub fn new(separator: u8) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> u8 {
        self.separator
    }

    /// Render the header and rows, BOM first.
    pub fn serialize(&self, matrix: &OutputMatrix) -> Result<Vec<u8>> {
        self.serialize_document(matrix).map(|(document, _)| document)
    }

    /// Like [`serialize`](Self::serialize), also reporting whether the body
    /// needed the ISO-8859-1 fallback.
    pub fn serialize_document(&self, matrix: &OutputMatrix) -> Result<(Vec<u8>, bool)> {
        let (body, reencoded) = ensure_utf8(self.body(matrix)?);
        let mut document = Vec::with_capacity(UTF8_BOM.len() + body.len());
        document.extend_from_slice(UTF8_BOM);
        document.extend_from_slice(&body);
        Ok((document, reencoded))
    }

    fn body(&self, matrix: &OutputMatrix) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.separator)
            .quote_style(QuoteStyle::Always)
            .double_quote(true)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(matrix.header.iter().map(|cell| prepare_cell(cell)))?;
        for row in &matrix.rows {
            writer.write_record(row.iter().map(|cell| prepare_cell(cell)))?;
        }
        let mut body = writer
            .into_inner()
            .map_err(|err| ExportError::Io(err.into_error()))?;
        if body.ends_with(b"\n") {
            body.pop();
        }
        Ok(body)
    }
}

/// Flatten a serialized array value; other values are returned unchanged.
pub fn prepare_cell(value: &str) -> String {
    match unserialize_list(value) {
        Some(elements) => elements.join(ARRAY_ELEMENT_SEPARATOR),
        None => value.to_string(),
    }
}

/// Re-encode `bytes` to UTF-8 if they are not valid UTF-8 already.
///
/// Valid UTF-8 runs are kept; each byte of an invalid run is read as
/// ISO-8859-1. Returns the bytes and whether anything was re-encoded.
pub fn ensure_utf8(bytes: Vec<u8>) -> (Vec<u8>, bool) {
    if std::str::from_utf8(&bytes).is_ok() {
        return (bytes, false);
    }
    warn!(len = bytes.len(), "document is not valid UTF-8, re-encoding");
    let mut text = String::with_capacity(bytes.len() + bytes.len() / 2);
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        text.extend(chunk.invalid().iter().map(|&byte| char::from(byte)));
    }
    (text.into_bytes(), true)
}

/// Elements of a PHP-serialized array such as `a:2:{i:0;s:1:"x";i:1;s:1:"y";}`.
///
/// Returns `None` for anything that is not a well-formed flat array.
pub fn unserialize_list(value: &str) -> Option<Vec<String>> {
    let mut cursor = Cursor::new(value.trim());
    cursor.eat("a:")?;
    let count: usize = cursor.number(':')?.parse().ok()?;
    cursor.eat("{")?;
    let mut elements = Vec::with_capacity(count);
    for _ in 0..count {
        cursor.scalar()?;
        elements.push(cursor.scalar()?);
    }
    cursor.eat("}")?;
    cursor.is_done().then_some(elements)
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn is_done(&self) -> bool {
        self.pos == self.input.len()
    }

    fn eat(&mut self, token: &str) -> Option<()> {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            Some(())
        } else {
            None
        }
    }

    /// Text up to `end`, consuming the terminator.
    fn number(&mut self, end: char) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.find(end)?;
        self.pos += len + end.len_utf8();
        Some(&rest[..len])
    }

    /// One `i:`, `d:`, `b:` or `s:` scalar rendered as text.
    fn scalar(&mut self) -> Option<String> {
        let rest = self.rest();
        let kind = rest.get(..2)?;
        self.pos += 2;
        match kind {
            "i:" | "d:" => Some(self.number(';')?.to_string()),
            "b:" => Some(match self.number(';')? {
                "1" => "1".to_string(),
                _ => String::new(),
            }),
            "N;" => Some(String::new()),
            "s:" => {
                let len: usize = self.number(':')?.parse().ok()?;
                self.eat("\"")?;
                let text = self.rest().get(..len)?;
                self.pos += len;
                self.eat("\";")?;
                Some(text.to_string())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unserialize_flat_arrays() {
        assert_eq!(
            unserialize_list(r#"a:2:{i:0;s:3:"red";i:1;s:4:"blue";}"#),
            Some(vec!["red".to_string(), "blue".to_string()])
        );
        assert_eq!(
            unserialize_list(r#"a:2:{s:1:"a";i:5;s:1:"b";b:1;}"#),
            Some(vec!["5".to_string(), "1".to_string()])
        );
        assert_eq!(unserialize_list("a:0:{}"), Some(vec![]));
    }

    #[test]
    fn unserialize_rejects_plain_text() {
        assert_eq!(unserialize_list("hello"), None);
        assert_eq!(unserialize_list("a:2:{i:0;s:3:\"red\";}"), None);
        assert_eq!(unserialize_list(r#"a:1:{i:0;s:9:"short";}"#), None);
    }

    #[test]
    fn multibyte_lengths_are_bytes() {
        assert_eq!(
            unserialize_list(r#"a:1:{i:0;s:5:"café";}"#),
            Some(vec!["café".to_string()])
        );
    }

    #[test]
    fn prepare_cell_joins_arrays_with_pipe() {
        assert_eq!(
            prepare_cell(r#"a:2:{i:0;s:1:"x";i:1;s:1:"y";}"#),
            "x|y"
        );
        assert_eq!(prepare_cell("plain"), "plain");
    }

    #[test]
    fn ensure_utf8_reencodes_latin1() {
        let (bytes, reencoded) = ensure_utf8(b"caf\xe9".to_vec());
        assert!(reencoded);
        assert_eq!(String::from_utf8(bytes).unwrap(), "café");

        let (bytes, reencoded) = ensure_utf8("café".as_bytes().to_vec());
        assert!(!reencoded);
        assert_eq!(bytes, "café".as_bytes());
    }

    #[test]
    fn ensure_utf8_keeps_valid_runs() {
        let mut mixed = "Zoë ".as_bytes().to_vec();
        mixed.push(0xA6);
        mixed.extend_from_slice("Noël".as_bytes());
        let (bytes, reencoded) = ensure_utf8(mixed);
        assert!(reencoded);
        assert_eq!(String::from_utf8(bytes).unwrap(), "Zoë ¦Noël");
    }

    #[test]
    fn non_ascii_separator_keeps_bom_and_cells() {
        let mut matrix = OutputMatrix::new(vec!["Name".to_string(), "City".to_string()]);
        matrix.push_row(vec!["Zoë".to_string(), "Köln".to_string()]);
        let serializer = TableSerializer::new(0xA6);
        assert_eq!(serializer.separator(), 0xA6);
        let (bytes, reencoded) = serializer.serialize_document(&matrix).unwrap();
        assert!(reencoded);
        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text, "\"Name\"¦\"City\"\n\"Zoë\"¦\"Köln\"");
    }

    #[test]
    fn every_cell_is_quoted_and_quotes_doubled() {
        let mut matrix = OutputMatrix::new(vec!["Name".to_string(), "Note".to_string()]);
        matrix.push_row(vec!["Al \"Big\" Lee".to_string(), String::new()]);
        let bytes = TableSerializer::default().serialize(&matrix).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text, "\"Name\",\"Note\"\n\"Al \"\"Big\"\" Lee\",\"\"");
    }

    #[test]
    fn custom_separator() {
        let mut matrix = OutputMatrix::new(vec!["A".to_string(), "B".to_string()]);
        matrix.push_row(vec!["1;2".to_string(), "3".to_string()]);
        let bytes = TableSerializer::new(b';').serialize(&matrix).unwrap();
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text, "\"A\";\"B\"\n\"1;2\";\"3\"");
    }
}
