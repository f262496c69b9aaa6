use serde::{Deserialize, Serialize};

use crate::well::WellCoordinate;

/// One row of the long-form sample sheet, as supplied by the host.
///
/// Only `well` and a diluent volume (given directly or derived from
/// `concentration`) are required by the plate pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRecord {
    /// Well label as typed by the operator (`A1`, `A01`, ...)
    pub well: String,
    /// Sample identifier
    #[serde(default)]
    pub sample_id: String,
    /// Stock concentration in ng/µL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration: Option<f64>,
    /// Per-sample stock input volume in µL (overrides the configured default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_volume: Option<f64>,
    /// Explicit diluent volume in µL (skips the dilution arithmetic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diluent_volume: Option<f64>,
}

/// A validated sample: well position plus the diluent volume to dispense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleVolume {
    pub well: WellCoordinate,
    pub sample_id: String,
    /// Diluent volume in µL
    pub diluent_volume: f64,
    /// Stock input volume in µL; `None` means the configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_volume: Option<f64>,
}

impl SampleVolume {
    #[must_use]
    pub fn new(well: WellCoordinate, sample_id: impl Into<String>, diluent_volume: f64) -> Self {
        Self {
            well,
            sample_id: sample_id.into(),
            diluent_volume,
            input_volume: None,
        }
    }

    #[must_use]
    pub fn with_input_volume(mut self, input_volume: f64) -> Self {
        self.input_volume = Some(input_volume);
        self
    }
}
