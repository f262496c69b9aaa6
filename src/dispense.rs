//! Splitting a diluent volume across the high- and low-volume chips.
//!
//! The high-volume chip dispenses whole microlitres, the low-volume chip the
//! remaining tenths. Both channels are programmed independently.
//!
//! Rounding rule: volumes are rounded to one decimal place on their exact
//! binary value, half-to-even for exact ties (the rule of `format!("{:.1}")`).
//! `0.45` is stored just above 0.45 and becomes `0.5`, `0.15` is stored just
//! below and becomes `0.1`, the exact tie `0.25` becomes `0.2`. A remainder
//! that rounds up to a whole microlitre is carried into the coarse amount.

use crate::types::{DispenseAmount, PlateGrid};
use crate::well::{WellCoordinate, WELL_COUNT};

/// Round to one decimal place on the exact value of `value`.
#[must_use]
pub fn round_tenths(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Whole microlitres and tenths of `volume` after rounding to one decimal.
fn decimal_parts(volume: f64) -> Option<(u32, u8)> {
    let text = format!("{volume:.1}");
    let (whole, tenths) = text.split_once('.')?;
    Some((whole.parse().ok()?, tenths.parse().ok()?))
}

/// Well size and the stock volume assumed for wells that do not carry
/// their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeLimits {
    pub max_well_volume: f64,
    pub default_input_volume: f64,
}

impl VolumeLimits {
    #[must_use]
    pub fn new(max_well_volume: f64, default_input_volume: f64) -> Self {
        Self {
            max_well_volume,
            default_input_volume,
        }
    }

    /// Diluent headroom of a well holding `input_volume` µL of stock.
    #[must_use]
    pub fn capacity(self, input_volume: Option<f64>) -> f64 {
        self.max_well_volume - input_volume.unwrap_or(self.default_input_volume)
    }

    /// Headroom of `well` on `grid`.
    #[must_use]
    pub fn capacity_at(self, grid: &PlateGrid, well: WellCoordinate) -> f64 {
        self.capacity(grid.input_volume(well))
    }
}

/// Split `volume` into whole and tenth microlitres.
///
/// Volumes below zero, above `max_capacity` or not finite are *not*
/// dispensed: they come back as [`DispenseAmount::ZERO`] instead of failing
/// the plate. `max_capacity` is the headroom left in the well after its stock
/// input volume (see [`VolumeLimits::capacity`]).
#[must_use]
pub fn split(volume: f64, max_capacity: f64) -> DispenseAmount {
    if is_masked(volume, max_capacity) {
        return DispenseAmount::ZERO;
    }
    match decimal_parts(volume) {
        Some((coarse, tenths)) => DispenseAmount::new(coarse, tenths),
        None => DispenseAmount::ZERO,
    }
}

/// Split every well of `grid` in plate order, each against its own headroom.
#[must_use]
pub fn split_plate(grid: &PlateGrid, limits: VolumeLimits) -> [DispenseAmount; WELL_COUNT] {
    let mut amounts = [DispenseAmount::ZERO; WELL_COUNT];
    for (slot, (well, volume)) in amounts.iter_mut().zip(grid.iter()) {
        *slot = split(volume, limits.capacity_at(grid, well));
    }
    amounts
}

/// Whether `volume` falls outside what [`split`] will dispense.
#[must_use]
pub fn is_masked(volume: f64, max_capacity: f64) -> bool {
    !volume.is_finite() || volume < 0.0 || volume > max_capacity
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::types::{DuplicateWellPolicy, SampleVolume};
    use test_case::test_case;

    #[test_case(12.3, 12, 3 ; "typical")]
    #[test_case(0.0, 0, 0 ; "zero")]
    #[test_case(40.1, 40, 1 ; "small remainder")]
    #[test_case(7.0, 7, 0 ; "whole number")]
    #[test_case(0.04, 0, 0 ; "remainder rounds to zero")]
    #[test_case(3.25, 3, 2 ; "tie goes to even below")]
    #[test_case(3.75, 3, 8 ; "tie goes to even above")]
    #[test_case(0.45, 0, 5 ; "stored above the tie rounds up")]
    #[test_case(0.15, 0, 1 ; "stored below the tie rounds down")]
    #[test_case(0.25, 0, 2 ; "exact tie rounds to even")]
    #[test_case(12.45, 12, 4 ; "large value stored below the tie")]
    #[test_case(4.96, 5, 0 ; "carry into coarse")]
    #[test_case(190.0, 190, 0 ; "exactly at capacity")]
    fn test_split(volume: f64, coarse: u32, tenths: u8) {
        let amount = split(volume, 190.0);
        assert_eq!(amount.coarse, coarse);
        assert_eq!(amount.fine_tenths(), tenths);
    }

    #[test_case(-5.0 ; "negative")]
    #[test_case(191.0 ; "above capacity")]
    #[test_case(190.05 ; "just above capacity")]
    #[test_case(f64::NAN ; "nan")]
    #[test_case(f64::INFINITY ; "infinite")]
    fn test_out_of_range_is_masked(volume: f64) {
        assert_eq!(split(volume, 190.0), DispenseAmount::ZERO);
        assert!(is_masked(volume, 190.0));
    }

    #[test]
    fn test_zero_fine_is_exact_zero() {
        let amount = split(5.01, 190.0);
        assert_eq!(amount.fine(), 0.0);
        assert!(amount.fine().is_sign_positive());
    }

    #[test]
    fn test_round_tenths() {
        assert_eq!(round_tenths(0.25), 0.2);
        assert_eq!(round_tenths(0.75), 0.8);
        assert_eq!(round_tenths(-1.04), -1.0);
        assert_eq!(round_tenths(12.34), 12.3);
        assert_eq!(round_tenths(0.45), 0.5);
        assert_eq!(round_tenths(0.15), 0.1);
        assert!(round_tenths(f64::NAN).is_nan());
    }

    #[test]
    fn test_split_plate_uses_each_wells_stock_volume() {
        let a1 = WellCoordinate::parse("A1").unwrap();
        let a2 = WellCoordinate::parse("A2").unwrap();
        let grid = PlateGrid::build(
            &[
                SampleVolume::new(a1, "big stock", 185.0).with_input_volume(20.0),
                SampleVolume::new(a2, "default stock", 185.0),
            ],
            DuplicateWellPolicy::default(),
        )
        .unwrap();
        let limits = VolumeLimits::new(190.0, 1.0);
        assert_eq!(limits.capacity_at(&grid, a1), 170.0);
        assert_eq!(limits.capacity_at(&grid, a2), 189.0);

        let amounts = split_plate(&grid, limits);
        assert_eq!(amounts[0], DispenseAmount::ZERO);
        assert_eq!(amounts[1], DispenseAmount::new(185, 0));
    }
}
