//! Coarse/fine split over the whole dispensable range.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]

mod common;

use common::{sample, well};
use dilution_plate::dispense::{split, split_plate, VolumeLimits};
use dilution_plate::{
    DispenseAmount, DuplicateWellPolicy, PipelineConfig, PlateGrid, SampleVolume,
};
use proptest::prelude::*;

const MAX_CAPACITY: f64 = 189.0;

#[test]
fn test_split_recombines_within_half_a_tenth() {
    // Every hundredth of a microlitre from 0 to capacity.
    for hundredths in 0..=18_900u32 {
        let volume = f64::from(hundredths) / 100.0;
        let amount = split(volume, MAX_CAPACITY);
        assert!(amount.fine_tenths() <= 9, "{volume}");
        assert!(
            (amount.total() - volume).abs() <= 0.05 + 1e-9,
            "{volume} split into {amount:?}"
        );
    }
}

#[test]
fn test_fine_is_always_one_decimal() {
    for hundredths in 0..=1_000u32 {
        let fine = split(f64::from(hundredths) / 100.0, MAX_CAPACITY).fine();
        assert_eq!((fine * 10.0).round() / 10.0, fine);
        assert!((0.0..1.0).contains(&fine));
    }
}

proptest! {
    /// Coarse plus fine stays within half a tenth of the requested volume.
    #[test]
    fn split_recombines(volume in 0.0f64..=MAX_CAPACITY) {
        let amount = split(volume, MAX_CAPACITY);
        prop_assert!(amount.fine_tenths() <= 9);
        prop_assert!((amount.total() - volume).abs() <= 0.05 + 1e-9, "{volume} -> {amount:?}");
    }

    /// Anything outside `[0, capacity]` is not dispensed at all.
    #[test]
    fn out_of_range_is_zero(excess in 1e-6f64..10_000.0) {
        prop_assert_eq!(split(MAX_CAPACITY + excess, MAX_CAPACITY), DispenseAmount::ZERO);
        prop_assert_eq!(split(-excess, MAX_CAPACITY), DispenseAmount::ZERO);
    }

    /// A well's own stock volume shrinks its headroom.
    #[test]
    fn stock_volume_bounds_dispense(input in 0.5f64..100.0, diluent in 0.0f64..250.0) {
        let c5 = well("C5");
        let grid = PlateGrid::build(
            &[SampleVolume::new(c5, "s", diluent).with_input_volume(input)],
            DuplicateWellPolicy::default(),
        )
        .unwrap();
        let amounts = split_plate(&grid, VolumeLimits::new(190.0, 1.0));
        let amount = amounts[c5.index()];
        if diluent > 190.0 - input {
            prop_assert_eq!(amount, DispenseAmount::ZERO);
        } else {
            prop_assert!(amount.total() + input <= 190.0 + 0.05 + 1e-9);
        }
    }
}

#[test]
fn test_split_plate_keeps_plate_order() {
    let grid = PlateGrid::build(
        &[sample("A1", 12.3), sample("A2", 0.0), sample("A3", -5.0), sample("A4", 191.0)],
        DuplicateWellPolicy::default(),
    )
    .unwrap();
    let amounts = split_plate(&grid, PipelineConfig::default().volume_limits());

    assert_eq!(amounts[0], DispenseAmount::new(12, 3));
    assert_eq!(amounts[1], DispenseAmount::ZERO);
    assert_eq!(amounts[2], DispenseAmount::ZERO);
    assert_eq!(amounts[3], DispenseAmount::ZERO);
    assert!(amounts[4..].iter().all(|a| a.is_zero()));
}

#[test]
fn test_values_near_ties_follow_their_stored_value() {
    assert_eq!(split(0.45, MAX_CAPACITY), DispenseAmount::new(0, 5));
    assert_eq!(split(0.15, MAX_CAPACITY), DispenseAmount::new(0, 1));
    assert_eq!(split(0.25, MAX_CAPACITY), DispenseAmount::new(0, 2));
    assert_eq!(split(1.05, MAX_CAPACITY), DispenseAmount::new(1, 1));
}
