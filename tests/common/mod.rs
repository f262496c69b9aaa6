//! Shared builders for plate tests.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use dilution_plate::{SampleRecord, SampleVolume, WellCoordinate};

/// Parse a well label, panicking on bad test input.
#[must_use]
pub fn well(label: &str) -> WellCoordinate {
    WellCoordinate::parse(label).expect("valid well label")
}

/// A sample with an explicit diluent volume.
#[must_use]
pub fn sample(label: &str, diluent: f64) -> SampleVolume {
    SampleVolume::new(well(label), format!("sample_{label}"), diluent)
}

/// A sheet record with an explicit diluent volume.
#[must_use]
pub fn record(label: &str, diluent: f64) -> SampleRecord {
    SampleRecord {
        well: label.to_string(),
        sample_id: format!("sample_{label}"),
        diluent_volume: Some(diluent),
        ..SampleRecord::default()
    }
}

/// Records for consecutive wells from A1 in plate order.
#[must_use]
pub fn records_in_order(diluents: &[f64]) -> Vec<SampleRecord> {
    diluents
        .iter()
        .enumerate()
        .map(|(i, &v)| record(&WellCoordinate::from_index(i).unwrap().to_label(), v))
        .collect()
}

/// Split a document into its lines (every line is `\n`-terminated).
#[must_use]
pub fn lines(text: &str) -> Vec<&str> {
    assert!(text.ends_with('\n'), "document must end with a newline");
    text.trim_end_matches('\n').split('\n').collect()
}
