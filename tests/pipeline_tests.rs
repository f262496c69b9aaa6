//! Sample sheet to dispense file, end to end.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::io::Write;

use common::{lines, record, records_in_order, well};
use dilution_plate::review::{review_plate, WellFlag};
use dilution_plate::sample_sheet::{ColumnMapping, SampleSheetReader};
use dilution_plate::well::WELL_COUNT;
use dilution_plate::{DispenseAmount, DispensePipeline, PipelineConfig, PlateError, SampleRecord};

fn pipeline() -> DispensePipeline {
    DispensePipeline::new(PipelineConfig::default()).unwrap()
}

#[test]
fn test_masked_wells_and_single_track() {
    let output = pipeline().run(&records_in_order(&[12.3, 0.0, -5.0, 191.0])).unwrap();

    assert_eq!(output.plan.amounts[0], DispenseAmount::new(12, 3));
    assert!(output.plan.amounts[1..].iter().all(|a| a.is_zero()));
    assert_eq!(output.plan.tracks.len(), 1);
    assert_eq!(output.plan.tracks[0].wells(), 0..WELL_COUNT);

    let lines = lines(output.document.as_str());
    assert_eq!(lines[2], "5\t0\t\tU\t");
    assert_eq!(lines[7], "12\t0\t0\t0\t0\t0\t0\t0\t0\t0\t0\t0");
    assert_eq!(lines[17], "0.3\t0\t0\t0\t0\t0\t0\t0\t0\t0\t0\t0");

    // The grid keeps the raw values for review.
    assert_eq!(output.grid.get(well("A3")), -5.0);
    assert_eq!(output.grid.get(well("A4")), 191.0);

    let summary = output.summary();
    assert_eq!(summary.samples, 4);
    assert_eq!(summary.non_zero_wells, 3);
    assert_eq!(summary.masked_wells, 2);
    assert_eq!(summary.coarse_tracks, 1);
    assert_eq!(summary.total_coarse_volume, 12);
    assert!((summary.total_fine_volume - 0.3).abs() < 1e-9);
}

#[test]
fn test_runs_are_byte_identical() {
    let records = records_in_order(&[55.5, 120.2, 189.0, 3.3, 0.05, 77.7, 140.0, 99.9]);
    let pipeline = pipeline();
    let first = pipeline.run(&records).unwrap();
    let second = pipeline.run(&records).unwrap();
    assert_eq!(first.document.as_str(), second.document.as_str());
    assert_eq!(first.grid, second.grid);

    let fresh = DispensePipeline::new(PipelineConfig::default())
        .unwrap()
        .run(&records)
        .unwrap();
    assert_eq!(first.document, fresh.document);
}

#[test]
fn test_full_plate_splits_into_tracks() {
    let diluents = [150.0; WELL_COUNT];
    let output = pipeline().run(&records_in_order(&diluents)).unwrap();
    // 150 µL per well: five wells reach 750, the sixth would make 900.
    let tracks = &output.plan.tracks;
    assert_eq!(tracks.len(), 20);
    assert!(tracks[..19].iter().all(|t| t.placed().len() == 5));
    assert_eq!(tracks[19].placed(), &[150]);
    assert_eq!(output.document.track_count(), 20);
    let declared = lines(output.document.as_str())[2].matches('U').count();
    assert_eq!(declared, 20);
}

#[test]
fn test_concentrations_from_sheet() {
    let sheet = b"Well,Sample,ng/uL\nA1,s1,10\nA2,s2,0.4294\nA3,s3,2000\nA4,s4,30\n";
    let records = SampleSheetReader::default().read_bytes(sheet).unwrap();
    let pipeline = pipeline();
    let output = pipeline.run(&records).unwrap();

    // 10 ng/µL, 1 µL in, 5 ng/µL target: 1 µL diluent.
    assert_eq!(output.grid.get(well("A1")), 1.0);
    assert_eq!(output.grid.get(well("A2")), -0.9);
    assert_eq!(output.grid.get(well("A3")), 399.0);
    assert_eq!(output.plan.amounts[3], DispenseAmount::new(5, 0));

    let occupied: Vec<_> = output.samples.iter().map(|s| s.well).collect();
    let flags: Vec<(String, WellFlag)> = review_plate(&output.grid, &occupied, pipeline.config())
        .into_iter()
        .map(|r| (r.well.to_label(), r.flag))
        .collect();
    assert_eq!(
        flags,
        vec![
            ("A1".to_string(), WellFlag::Underfilled),
            ("A2".to_string(), WellFlag::BelowTarget),
            ("A3".to_string(), WellFlag::Overfilled),
        ]
    );
}

#[test]
fn test_config_file_drives_the_run() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "capacity_threshold = 20.0\nduplicate_wells = \"reject\"\n\n[instrument]\nversion = 7"
    )
    .unwrap();
    let config = PipelineConfig::load_from(file.path()).unwrap();
    let pipeline = DispensePipeline::new(config).unwrap();

    let output = pipeline.run(&records_in_order(&[10.0, 10.0, 10.0])).unwrap();
    assert_eq!(output.plan.tracks.len(), 3);
    assert!(output.document.as_str().starts_with("[ Version: 7 ]\n"));

    let duplicated = [record("B2", 1.0), record("B02", 2.0)];
    assert!(matches!(
        pipeline.run(&duplicated),
        Err(PlateError::DuplicateWell { .. })
    ));
}

#[test]
fn test_bad_records_fail_the_run() {
    let bad_well = [record("Z9", 1.0)];
    assert!(matches!(
        pipeline().run(&bad_well),
        Err(PlateError::MalformedWellLabel { .. })
    ));

    let no_volume = [SampleRecord {
        well: "C1".into(),
        sample_id: "blank".into(),
        ..SampleRecord::default()
    }];
    match pipeline().run(&no_volume) {
        Err(PlateError::MissingVolume { well }) => assert_eq!(well, "C1"),
        other => panic!("expected MissingVolume, got {other:?}"),
    }
}

#[test]
fn test_bad_threshold_is_rejected() {
    let config = PipelineConfig {
        capacity_threshold: 0.0,
        ..PipelineConfig::default()
    };
    assert!(matches!(
        DispensePipeline::new(config),
        Err(PlateError::CapacityThresholdMisconfigured(_))
    ));
}

#[test]
fn test_per_sample_stock_volume_limits_the_well() {
    let sheet = b"well sample ng/ul ul_dna\nA1 big 100 20\nA2 small 100 1\n";
    let mapping = ColumnMapping {
        input_volume: Some("ul_dna".parse().unwrap()),
        ..ColumnMapping::default()
    };
    let records = SampleSheetReader::new(mapping).read_bytes(sheet).unwrap();
    let output = pipeline().run(&records).unwrap();

    // 100 ng/µL down to 5 ng/µL: 20 µL of stock needs 380 µL, 1 µL needs 19 µL.
    assert_eq!(output.grid.get(well("A1")), 380.0);
    assert_eq!(output.plan.amounts[0], DispenseAmount::ZERO);
    assert_eq!(output.plan.amounts[1], DispenseAmount::new(19, 0));

    // 185 µL of diluent fits next to 1 µL of stock but not next to 20 µL.
    let records = [
        SampleRecord {
            input_volume: Some(20.0),
            ..record("B1", 185.0)
        },
        record("B2", 185.0),
    ];
    let pipeline = pipeline();
    let output = pipeline.run(&records).unwrap();
    assert_eq!(output.plan.amounts[12], DispenseAmount::ZERO);
    assert_eq!(output.plan.amounts[13], DispenseAmount::new(185, 0));
    assert_eq!(output.summary().masked_wells, 1);

    let occupied: Vec<_> = output.samples.iter().map(|s| s.well).collect();
    let flagged = review_plate(&output.grid, &occupied, pipeline.config());
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].well, well("B1"));
    assert_eq!(flagged[0].flag, WellFlag::Overfilled);
}
