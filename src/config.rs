//! Pipeline configuration.
//!
//! Loaded from a TOML file; every field has a default so a partial (or
//! missing) file is fine. Values are validated before a pipeline is built.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dispense::VolumeLimits;
use crate::error::{PlateError, Result};
use crate::export::InstrumentProfile;
use crate::tracks::DEFAULT_CAPACITY_THRESHOLD;
use crate::types::DuplicateWellPolicy;

/// Settings for one plate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Stock DNA volume (µL) put into every well unless a sample overrides it
    #[serde(default = "default_input_volume")]
    pub input_volume: f64,

    /// Target concentration (ng/µL) after dilution
    #[serde(default = "default_target_concentration")]
    pub target_concentration: f64,

    /// Minimum useful final volume (µL); smaller wells are flagged for review
    #[serde(default = "default_min_final_volume")]
    pub min_final_volume: f64,

    /// Largest volume (µL) a well can safely hold
    #[serde(default = "default_max_well_volume")]
    pub max_well_volume: f64,

    /// High-volume chip capacity (µL) per track
    #[serde(default = "default_capacity_threshold")]
    pub capacity_threshold: f64,

    /// Handling of wells listed more than once
    #[serde(default)]
    pub duplicate_wells: DuplicateWellPolicy,

    /// Strings written into the dispense file
    #[serde(default)]
    pub instrument: InstrumentProfile,
}

fn default_input_volume() -> f64 {
    1.0
}

fn default_target_concentration() -> f64 {
    5.0
}

fn default_min_final_volume() -> f64 {
    5.0
}

fn default_max_well_volume() -> f64 {
    190.0
}

fn default_capacity_threshold() -> f64 {
    DEFAULT_CAPACITY_THRESHOLD
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_volume: default_input_volume(),
            target_concentration: default_target_concentration(),
            min_final_volume: default_min_final_volume(),
            max_well_volume: default_max_well_volume(),
            capacity_threshold: default_capacity_threshold(),
            duplicate_wells: DuplicateWellPolicy::default(),
            instrument: InstrumentProfile::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file. A missing file gives the defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails [`PipelineConfig::validate`].
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate configuration text.
    ///
    /// # Errors
    /// Returns an error for invalid TOML or out-of-range values.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every numeric setting.
    ///
    /// # Errors
    /// Returns [`PlateError::CapacityThresholdMisconfigured`] for a bad track
    /// capacity and [`PlateError::InvalidConfig`] for anything else.
    pub fn validate(&self) -> Result<()> {
        if !self.capacity_threshold.is_finite() || self.capacity_threshold <= 0.0 {
            return Err(PlateError::CapacityThresholdMisconfigured(
                self.capacity_threshold,
            ));
        }

        for (name, value) in [
            ("input_volume", self.input_volume),
            ("target_concentration", self.target_concentration),
            ("max_well_volume", self.max_well_volume),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlateError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if !self.min_final_volume.is_finite() || self.min_final_volume < 0.0 {
            return Err(PlateError::InvalidConfig(format!(
                "min_final_volume must not be negative, got {}",
                self.min_final_volume
            )));
        }

        if self.max_well_volume <= self.input_volume {
            return Err(PlateError::InvalidConfig(format!(
                "max_well_volume ({}) must exceed input_volume ({})",
                self.max_well_volume, self.input_volume
            )));
        }

        Ok(())
    }

    /// Well size and default stock volume for per-well headroom checks.
    #[must_use]
    pub fn volume_limits(&self) -> VolumeLimits {
        VolumeLimits::new(self.max_well_volume, self.input_volume)
    }

    /// Largest diluent volume that fits in a well next to the default stock.
    #[must_use]
    pub fn dispensable_capacity(&self) -> f64 {
        self.volume_limits().capacity(None)
    }

    /// Default configuration rendered as TOML.
    #[must_use]
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
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
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.dispensable_capacity(), 189.0);
        assert_eq!(config.capacity_threshold, 850.0);
        assert_eq!(config.duplicate_wells, DuplicateWellPolicy::LastWriteWins);
    }

    #[test]
    fn test_config_roundtrip_toml() {
        let text = PipelineConfig::default_toml();
        let parsed = PipelineConfig::from_toml(&text).unwrap();
        assert_eq!(parsed, PipelineConfig::default());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PipelineConfig::from_toml(
            "input_volume = 2.5\nduplicate_wells = \"reject\"\n[instrument]\nversion = 6\n",
        )
        .unwrap();
        assert_eq!(config.input_volume, 2.5);
        assert_eq!(config.duplicate_wells, DuplicateWellPolicy::Reject);
        assert_eq!(config.instrument.version, 6);
        assert_eq!(config.max_well_volume, 190.0);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = PipelineConfig::from_toml("capacity_threshold = 0.0").unwrap_err();
        assert!(matches!(err, PlateError::CapacityThresholdMisconfigured(_)));
        let err = PipelineConfig::from_toml("capacity_threshold = -850.0").unwrap_err();
        assert!(matches!(err, PlateError::CapacityThresholdMisconfigured(_)));
    }

    #[test]
    fn test_invalid_volumes_rejected() {
        for text in [
            "input_volume = 0.0",
            "target_concentration = -1.0",
            "max_well_volume = 1.0",
            "min_final_volume = -2.0",
        ] {
            let err = PipelineConfig::from_toml(text).unwrap_err();
            assert!(matches!(err, PlateError::InvalidConfig(_)), "{text}: {err}");
        }
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(matches!(
            PipelineConfig::from_toml("input_volume = \"lots\""),
            Err(PlateError::Toml(_))
        ));
    }

    #[test]
    fn test_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.toml");
        std::fs::write(&path, "target_concentration = 2.0\n").unwrap();
        let config = PipelineConfig::load_from(&path).unwrap();
        assert_eq!(config.target_concentration, 2.0);
    }
}
