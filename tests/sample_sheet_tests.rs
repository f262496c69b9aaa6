//! Reading sample sheets from disk.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::io::Write;

use dilution_plate::sample_sheet::{ColumnMapping, ColumnRef, Delimiter, SampleSheetReader};
use dilution_plate::PlateError;

fn sheet_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_read_tsv_without_headers() {
    let file = sheet_file("A1\tsample_1\t12.5\nH12\tsample_96\t0.8\n");
    let records = SampleSheetReader::default()
        .has_headers(false)
        .read_path(file.path())
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].well, "H12");
    assert_eq!(records[1].concentration, Some(0.8));
}

#[test]
fn test_read_space_aligned_sheet() {
    let file = sheet_file(
        "Well  Sample     ng/uL   uL_DNA\n\
         A1    sample_1   12.5    2\n\
         A02   sample_2    0.8    1\n",
    );
    let mapping = ColumnMapping {
        input_volume: Some(ColumnRef::Name("ul_dna".into())),
        ..ColumnMapping::default()
    };
    let records = SampleSheetReader::new(mapping).read_path(file.path()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].sample_id, "sample_1");
    assert_eq!(records[0].input_volume, Some(2.0));
    assert_eq!(records[1].well, "A02");
    assert_eq!(records[1].concentration, Some(0.8));
}

#[test]
fn test_forced_whitespace_delimiter() {
    let records = SampleSheetReader::default()
        .has_headers(false)
        .delimiter(Delimiter::Whitespace)
        .read_bytes(b"H12 last 3\n")
        .unwrap();
    assert_eq!(records[0].well, "H12");
    assert_eq!(records[0].concentration, Some(3.0));
}

#[test]
fn test_explicit_diluent_column() {
    let file = sheet_file("well;id;dil\nA1;x;12.3\nA2;y;\n");
    let mapping = ColumnMapping {
        well: ColumnRef::Name("well".into()),
        sample_id: ColumnRef::Name("id".into()),
        concentration: None,
        input_volume: None,
        diluent_volume: Some(ColumnRef::Name("dil".into())),
    };
    // Semicolons are neither sniffed nor supported, so the whole line is one field.
    let err = SampleSheetReader::new(mapping.clone())
        .read_path(file.path())
        .unwrap_err();
    assert!(matches!(err, PlateError::SampleSheet(_)));

    let file = sheet_file("well,id,dil\nA1,x,12.3\nA2,y,\n");
    let records = SampleSheetReader::new(mapping)
        .delimiter(Delimiter::Comma)
        .read_path(file.path())
        .unwrap();
    assert_eq!(records[0].diluent_volume, Some(12.3));
    assert_eq!(records[1].diluent_volume, None);
}

#[test]
fn test_named_column_without_headers_fails() {
    let mapping = ColumnMapping {
        well: ColumnRef::Name("well".into()),
        ..ColumnMapping::default()
    };
    let err = SampleSheetReader::new(mapping)
        .has_headers(false)
        .read_bytes(b"A1,x,1\n")
        .unwrap_err();
    match err {
        PlateError::SampleSheet(message) => assert!(message.contains("header"), "{message}"),
        other => panic!("expected SampleSheet error, got {other:?}"),
    }
}

#[test]
fn test_non_numeric_concentration_reports_line() {
    let err = SampleSheetReader::default()
        .read_bytes(b"well,id,conc\nA1,x,1\nA2,y,lots\n")
        .unwrap_err();
    match err {
        PlateError::SampleSheet(message) => {
            assert!(message.contains("line 3"), "{message}");
            assert!(message.contains("lots"), "{message}");
        }
        other => panic!("expected SampleSheet error, got {other:?}"),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let err = SampleSheetReader::default()
        .read_path(std::path::Path::new("/nonexistent/sheet.csv"))
        .unwrap_err();
    assert!(matches!(err, PlateError::Io(_)));
}
