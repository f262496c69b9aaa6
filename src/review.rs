//! Review flags for wells an operator should look at before dispensing.
//!
//! These are a pure classification of each diluent volume; mapping them to
//! colours or warnings is up to the host.

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::types::PlateGrid;
use crate::well::WellCoordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WellFlag {
    /// Stock is already below the target concentration (negative diluent).
    BelowTarget,
    /// Diluent plus stock would overflow the well; nothing is dispensed.
    Overfilled,
    /// Final volume is below the configured minimum.
    Underfilled,
    Ok,
}

/// Classify one diluent volume added to `input_volume` µL of stock. Checks
/// run in order: below target, overfilled, underfilled.
#[must_use]
pub fn classify(diluent_volume: f64, input_volume: f64, config: &PipelineConfig) -> WellFlag {
    if diluent_volume < 0.0 {
        WellFlag::BelowTarget
    } else if diluent_volume > config.volume_limits().capacity(Some(input_volume)) {
        WellFlag::Overfilled
    } else if diluent_volume + input_volume < config.min_final_volume {
        WellFlag::Underfilled
    } else {
        WellFlag::Ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellReview {
    pub well: WellCoordinate,
    pub diluent_volume: f64,
    pub flag: WellFlag,
}

/// Flagged wells of `grid` in plate order. `occupied` limits the review to
/// wells that actually received a sample; empty wells would otherwise all be
/// flagged as underfilled.
#[must_use]
pub fn review_plate(
    grid: &PlateGrid,
    occupied: &[WellCoordinate],
    config: &PipelineConfig,
) -> Vec<WellReview> {
    grid.iter()
        .filter(|(well, _)| occupied.contains(well))
        .filter_map(|(well, diluent_volume)| {
            let input_volume = grid.input_volume(well).unwrap_or(config.input_volume);
            let flag = classify(diluent_volume, input_volume, config);
            (flag != WellFlag::Ok).then_some(WellReview {
                well,
                diluent_volume,
                flag,
            })
        })
        .collect()
}
