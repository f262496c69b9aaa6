//! Long-form samples to a fixed 8×12 plate layout.

use std::collections::HashSet;

use crate::error::{PlateError, Result};
use crate::types::{DuplicateWellPolicy, PlateGrid, SampleVolume};

impl PlateGrid {
    /// Lay out `volumes` on a fresh plate.
    ///
    /// Wells without an entry are `0.0`. A well listed more than once keeps
    /// its last value under [`DuplicateWellPolicy::LastWriteWins`].
    ///
    /// # Errors
    /// Returns [`PlateError::DuplicateWell`] for a repeated well under
    /// [`DuplicateWellPolicy::Reject`].
    pub fn build(volumes: &[SampleVolume], policy: DuplicateWellPolicy) -> Result<Self> {
        let mut grid = Self::default();
        let mut seen = HashSet::with_capacity(volumes.len());

        for sample in volumes {
            if !seen.insert(sample.well) {
                match policy {
                    DuplicateWellPolicy::Reject => {
                        return Err(PlateError::DuplicateWell {
                            well: sample.well.to_label(),
                        });
                    }
                    DuplicateWellPolicy::LastWriteWins => {
                        tracing::warn!(
                            well = %sample.well,
                            previous = grid.get(sample.well),
                            replacement = sample.diluent_volume,
                            "duplicate well overwritten"
                        );
                    }
                }
            }
            grid.set(sample.well, sample.diluent_volume);
            grid.set_input_volume(sample.well, sample.input_volume);
        }

        Ok(grid)
    }
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
    use crate::well::{WellCoordinate, WELL_COUNT};

    fn sample(label: &str, volume: f64) -> SampleVolume {
        SampleVolume::new(WellCoordinate::parse(label).unwrap(), label, volume)
    }

    #[test]
    fn test_empty_input_gives_zero_plate() {
        let grid = PlateGrid::build(&[], DuplicateWellPolicy::default()).unwrap();
        assert_eq!(grid.iter().count(), WELL_COUNT);
        assert!(grid.iter().all(|(_, v)| v == 0.0));
    }

    #[test]
    fn test_values_land_in_their_wells() {
        let grid = PlateGrid::build(
            &[sample("A1", 12.3), sample("B07", 4.5), sample("H12", 1.0)],
            DuplicateWellPolicy::default(),
        )
        .unwrap();
        assert_eq!(grid.rows()[0][0], 12.3);
        assert_eq!(grid.rows()[1][6], 4.5);
        assert_eq!(grid.rows()[7][11], 1.0);
        assert_eq!(grid.non_zero_count(), 3);

        let flat = grid.values_row_major();
        assert_eq!(flat[0], 12.3);
        assert_eq!(flat[18], 4.5);
        assert_eq!(flat[95], 1.0);
    }

    #[test]
    fn test_last_write_wins() {
        let grid = PlateGrid::build(
            &[sample("C3", 1.0), sample("C03", 7.0)],
            DuplicateWellPolicy::LastWriteWins,
        )
        .unwrap();
        assert_eq!(grid.get(WellCoordinate::parse("C3").unwrap()), 7.0);
    }

    #[test]
    fn test_stock_volumes_follow_their_wells() {
        let c3 = WellCoordinate::parse("C3").unwrap();
        let grid = PlateGrid::build(
            &[
                sample("C3", 1.0).with_input_volume(20.0),
                sample("D4", 2.0),
            ],
            DuplicateWellPolicy::default(),
        )
        .unwrap();
        assert_eq!(grid.input_volume(c3), Some(20.0));
        assert_eq!(grid.input_volume(WellCoordinate::parse("D4").unwrap()), None);

        // A later entry replaces the stock volume along with the diluent.
        let grid = PlateGrid::build(
            &[sample("C3", 1.0).with_input_volume(20.0), sample("C03", 7.0)],
            DuplicateWellPolicy::LastWriteWins,
        )
        .unwrap();
        assert_eq!(grid.input_volume(c3), None);
    }

    #[test]
    fn test_reject_duplicates() {
        let err = PlateGrid::build(
            &[sample("C3", 1.0), sample("C03", 7.0)],
            DuplicateWellPolicy::Reject,
        )
        .unwrap_err();
        assert!(matches!(err, PlateError::DuplicateWell { ref well } if well == "C3"));
    }

    #[test]
    fn test_serialized_shape() {
        let grid = PlateGrid::build(&[sample("A2", 3.5)], DuplicateWellPolicy::default()).unwrap();
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json["rows"].as_array().unwrap().len(), 8);
        assert_eq!(json["columns"][11], "12");
        assert_eq!(json["values"][0][1], 3.5);
    }
}
