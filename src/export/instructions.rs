//! Generates the Mantis dispense file from a [`DispensePlan`].
//!
//! Layout (all lines `\n`-terminated, fields tab-separated):
//!
//! ```text
//! [ Version: 5 ]
//! AB0800-96well-on-silver-metal-base.pd.txt
//! 5␉0␉␉U␉␉U␉        one "U" per high-volume track
//! 1
//! 5␉0␉␉0␉␉0␉        one "0" per high-volume track
//! Wash + T HV␉␉Normal
//! Well␉1
//! <8 rows of 12 whole-µL amounts>                  repeated per track
//! Wash + T LV␉␉Normal
//! Well␉1
//! <8 rows of 12 tenth-µL amounts>                  whole plate, one pass
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{DispenseAmount, DispensePlan, InstructionDocument, Track};
use crate::well::COLUMNS;

/// Instrument-specific strings written into the dispense file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct InstrumentProfile {
    /// File format version in the first line
    pub version: u32,
    /// Plate definition file the instrument should load
    pub plate_definition: String,
    /// Reagent name for the high-volume chip
    pub coarse_reagent: String,
    /// Reagent name for the low-volume chip
    pub fine_reagent: String,
    /// Dispense mode following each reagent name
    pub dispense_mode: String,
}

impl Default for InstrumentProfile {
    fn default() -> Self {
        Self {
            version: 5,
            plate_definition: "AB0800-96well-on-silver-metal-base.pd.txt".to_string(),
            coarse_reagent: "Wash + T HV".to_string(),
            fine_reagent: "Wash + T LV".to_string(),
            dispense_mode: "Normal".to_string(),
        }
    }
}

/// Serializes dispense plans for one instrument profile.
#[derive(Debug, Clone, Default)]
pub struct InstructionFormatter {
    profile: InstrumentProfile,
}

impl InstructionFormatter {
    #[must_use]
    pub fn new(profile: InstrumentProfile) -> Self {
        Self { profile }
    }

    #[must_use]
    pub fn profile(&self) -> &InstrumentProfile {
        &self.profile
    }

    /// Write the dispense file for `plan`.
    ///
    /// Values are written as given; clamping has already happened in the
    /// splitter.
    #[must_use]
    pub fn format(&self, plan: &DispensePlan) -> InstructionDocument {
        let track_count = plan.tracks.len();
        let mut out = String::with_capacity(1024 + track_count * 512);

        out.push_str(&format!("[ Version: {} ]\n", self.profile.version));
        out.push_str(&self.profile.plate_definition);
        out.push('\n');
        out.push_str(&track_declaration("U", track_count));
        out.push_str("1\n");
        out.push_str(&track_declaration("0", track_count));

        for track in &plan.tracks {
            self.write_reagent_header(&mut out, &self.profile.coarse_reagent);
            write_coarse_rows(&mut out, track);
        }

        self.write_reagent_header(&mut out, &self.profile.fine_reagent);
        write_fine_rows(&mut out, &plan.amounts);

        InstructionDocument::new(out, track_count)
    }

    fn write_reagent_header(&self, out: &mut String, reagent: &str) {
        out.push_str(&format!(
            "{}\t\t{}\nWell\t1\n",
            reagent, self.profile.dispense_mode
        ));
    }
}

/// `5\t0\t\t` followed by one placeholder per track joined by `\t\t`.
fn track_declaration(placeholder: &str, track_count: usize) -> String {
    let placeholders = vec![placeholder; track_count].join("\t\t");
    format!("5\t0\t\t{placeholders}\t\n")
}

fn write_coarse_rows(out: &mut String, track: &Track) {
    for row in track.slots().chunks(COLUMNS) {
        let fields: Vec<String> = row.iter().map(u32::to_string).collect();
        out.push_str(&fields.join("\t"));
        out.push('\n');
    }
}

fn write_fine_rows(out: &mut String, amounts: &[DispenseAmount]) {
    for row in amounts.chunks(COLUMNS) {
        let fields: Vec<String> = row.iter().map(|a| fine_field(*a)).collect();
        out.push_str(&fields.join("\t"));
        out.push('\n');
    }
}

/// `0` when nothing is dispensed, otherwise one decimal place (`0.3`).
fn fine_field(amount: DispenseAmount) -> String {
    match amount.fine_tenths() {
        0 => "0".to_string(),
        tenths => format!("0.{tenths}"),
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

    #[test]
    fn test_track_declaration() {
        assert_eq!(track_declaration("U", 1), "5\t0\t\tU\t\n");
        assert_eq!(track_declaration("U", 3), "5\t0\t\tU\t\tU\t\tU\t\n");
        assert_eq!(track_declaration("0", 2), "5\t0\t\t0\t\t0\t\n");
    }

    #[test]
    fn test_fine_field() {
        assert_eq!(fine_field(DispenseAmount::ZERO), "0");
        assert_eq!(fine_field(DispenseAmount::new(12, 3)), "0.3");
        assert_eq!(fine_field(DispenseAmount::new(0, 9)), "0.9");
    }

    #[test]
    fn test_profile_from_partial_toml() {
        let profile: InstrumentProfile =
            toml::from_str("plate_definition = \"custom-plate.pd.txt\"").unwrap();
        assert_eq!(profile.plate_definition, "custom-plate.pd.txt");
        assert_eq!(profile.version, 5);
        assert_eq!(profile.coarse_reagent, "Wash + T HV");
    }
}
