//! Property tests: serialized cells read back unchanged by a CSV parser.

use csv::ReaderBuilder;
use mfx_export::{TableSerializer, UTF8_BOM};
use mfx_model::OutputMatrix;
use proptest::prelude::*;

fn read_back(bytes: &[u8], separator: u8) -> Vec<Vec<String>> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap();
    ReaderBuilder::new()
        .has_headers(false)
        .delimiter(separator)
        .from_reader(body)
        .records()
        .map(|record| record.unwrap().iter().map(str::to_string).collect())
        .collect()
}

proptest! {
    #[test]
    fn cells_survive_quoting(
        rows in prop::collection::vec(
            prop::collection::vec("[a-zA-Z0-9 ,;\"\n]{0,12}", 3),
            0..8,
        ),
        separator in prop::sample::select(vec![b',', b';', b'\t']),
    ) {
        let mut matrix = OutputMatrix::new(vec!["A".into(), "B".into(), "C".into()]);
        for row in &rows {
            matrix.push_row(row.clone());
        }
        let bytes = TableSerializer::new(separator).serialize(&matrix).unwrap();

        let parsed = read_back(&bytes, separator);
        prop_assert_eq!(parsed.len(), rows.len() + 1);
        prop_assert_eq!(&parsed[0], &matrix.header);
        prop_assert_eq!(&parsed[1..], &rows[..]);
    }

    #[test]
    fn document_never_ends_with_newline(
        cell in "[a-z\"]{0,8}",
    ) {
        let mut matrix = OutputMatrix::new(vec!["Only".into()]);
        matrix.push_row(vec![cell]);
        let bytes = TableSerializer::default().serialize(&matrix).unwrap();
        prop_assert!(bytes.starts_with(UTF8_BOM));
        prop_assert!(!bytes.ends_with(b"\n"));
    }
}
