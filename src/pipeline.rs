//! End-to-end run: sample records to plate grid and dispense file.
//!
//! Every run starts from scratch; nothing is cached between runs, so running
//! twice on the same input gives byte-identical output.

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::dilution::resolve_samples;
use crate::dispense::{is_masked, split_plate, VolumeLimits};
use crate::error::Result;
use crate::export::InstructionFormatter;
use crate::tracks::TrackBatcher;
use crate::types::{DispensePlan, InstructionDocument, PlateGrid, SampleRecord, SampleVolume};

/// A validated configuration ready to process plates.
#[derive(Debug, Clone)]
pub struct DispensePipeline {
    config: PipelineConfig,
    batcher: TrackBatcher,
    formatter: InstructionFormatter,
}

/// Everything produced by one run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub samples: Vec<SampleVolume>,
    pub grid: PlateGrid,
    pub plan: DispensePlan,
    pub document: InstructionDocument,
    limits: VolumeLimits,
}

/// Counts and totals for a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub samples: usize,
    pub non_zero_wells: usize,
    /// Wells whose volume was out of range and will not be dispensed
    pub masked_wells: usize,
    pub coarse_tracks: usize,
    pub total_coarse_volume: u64,
    pub total_fine_volume: f64,
}

impl DispensePipeline {
    /// # Errors
    /// Returns an error if `config` fails validation.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let batcher = TrackBatcher::new(config.capacity_threshold)?;
        let formatter = InstructionFormatter::new(config.instrument.clone());
        Ok(Self {
            config,
            batcher,
            formatter,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resolve sheet records and run the plate.
    ///
    /// # Errors
    /// Returns an error for malformed wells, records without a volume, or a
    /// duplicate well in strict mode.
    pub fn run(&self, records: &[SampleRecord]) -> Result<PipelineOutput> {
        let samples = resolve_samples(records, &self.config)?;
        self.run_volumes(samples)
    }

    /// Run the plate from already validated samples.
    ///
    /// # Errors
    /// Returns [`crate::PlateError::DuplicateWell`] in strict mode.
    #[tracing::instrument(level = "debug", skip_all, fields(samples = samples.len()))]
    pub fn run_volumes(&self, samples: Vec<SampleVolume>) -> Result<PipelineOutput> {
        let grid = PlateGrid::build(&samples, self.config.duplicate_wells)?;
        let limits = self.config.volume_limits();

        for (well, volume) in grid.iter() {
            let max_capacity = limits.capacity_at(&grid, well);
            if is_masked(volume, max_capacity) {
                tracing::warn!(
                    %well,
                    volume,
                    max_capacity,
                    "volume out of range, well will not be dispensed"
                );
            }
        }

        let amounts = split_plate(&grid, limits);
        let tracks = self.batcher.batch(&amounts.map(|a| a.coarse));
        let plan = DispensePlan {
            grid: grid.clone(),
            amounts,
            tracks,
        };
        let document = self.formatter.format(&plan);

        tracing::info!(
            wells = grid.non_zero_count(),
            tracks = document.track_count(),
            "dispense plan ready"
        );

        Ok(PipelineOutput {
            samples,
            grid,
            plan,
            document,
            limits,
        })
    }
}

impl PipelineOutput {
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            samples: self.samples.len(),
            non_zero_wells: self.grid.non_zero_count(),
            masked_wells: self
                .grid
                .iter()
                .filter(|(well, v)| is_masked(*v, self.limits.capacity_at(&self.grid, *well)))
                .count(),
            coarse_tracks: self.plan.tracks.len(),
            total_coarse_volume: self.plan.amounts.iter().map(|a| u64::from(a.coarse)).sum(),
            total_fine_volume: self.plan.amounts.iter().map(|a| a.fine()).sum(),
        }
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
    use crate::types::DispenseAmount;
    use crate::PlateError;

    fn record(well: &str, diluent: f64) -> SampleRecord {
        SampleRecord {
            well: well.into(),
            sample_id: format!("sample_{well}"),
            diluent_volume: Some(diluent),
            ..SampleRecord::default()
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = PipelineConfig {
            capacity_threshold: -1.0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            DispensePipeline::new(config),
            Err(PlateError::CapacityThresholdMisconfigured(_))
        ));
    }

    #[test]
    fn test_summary_counts() {
        let pipeline = DispensePipeline::new(PipelineConfig::default()).unwrap();
        let output = pipeline
            .run(&[record("A1", 12.3), record("A2", -4.0), record("A3", 500.0)])
            .unwrap();
        let summary = output.summary();
        assert_eq!(summary.samples, 3);
        assert_eq!(summary.non_zero_wells, 3);
        assert_eq!(summary.masked_wells, 2);
        assert_eq!(summary.coarse_tracks, 1);
        assert_eq!(summary.total_coarse_volume, 12);
        assert!((summary.total_fine_volume - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_large_stock_volume_masks_overfilled_well() {
        let pipeline = DispensePipeline::new(PipelineConfig::default()).unwrap();
        let big_stock = SampleRecord {
            input_volume: Some(20.0),
            ..record("A1", 185.0)
        };
        let output = pipeline.run(&[big_stock, record("A2", 185.0)]).unwrap();

        // 20 + 185 overflows a 190 µL well; 1 + 185 does not.
        assert_eq!(output.plan.amounts[0], DispenseAmount::ZERO);
        assert_eq!(output.plan.amounts[1], DispenseAmount::new(185, 0));
        assert_eq!(output.summary().masked_wells, 1);
        assert_eq!(output.summary().total_coarse_volume, 185);
    }

    #[test]
    fn test_strict_duplicates_fail_the_run() {
        let config = PipelineConfig {
            duplicate_wells: crate::types::DuplicateWellPolicy::Reject,
            ..PipelineConfig::default()
        };
        let pipeline = DispensePipeline::new(config).unwrap();
        let err = pipeline.run(&[record("A1", 1.0), record("A01", 2.0)]).unwrap_err();
        assert!(matches!(err, PlateError::DuplicateWell { .. }));
    }
}
