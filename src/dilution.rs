//! Diluent volumes from stock concentrations.
//!
//! To bring `input_volume` µL of stock at `concentration` ng/µL down to the
//! target concentration, add
//! `concentration * input_volume / target - input_volume` µL of diluent.
//! Results are rounded to one decimal place with the same half-to-even rule
//! as the dispense splitter.

use crate::config::PipelineConfig;
use crate::dispense::round_tenths;
use crate::error::{PlateError, Result};
use crate::types::{SampleRecord, SampleVolume};
use crate::well::WellCoordinate;

/// Diluent to add to reach `target_concentration`. Negative when the stock is
/// already below the target.
#[must_use]
pub fn diluent_volume(concentration: f64, input_volume: f64, target_concentration: f64) -> f64 {
    round_tenths(concentration * input_volume / target_concentration - input_volume)
}

/// Final well volume after dilution.
#[must_use]
pub fn total_volume(diluent_volume: f64, input_volume: f64) -> f64 {
    round_tenths(diluent_volume + input_volume)
}

/// Turn sheet records into validated samples.
///
/// An explicit `diluent_volume` on a record wins; otherwise it is derived from
/// `concentration` and the record's input volume (or the configured one).
///
/// # Errors
/// Returns [`PlateError::MalformedWellLabel`] for a bad well,
/// [`PlateError::InvalidInputVolume`] for a stock volume that is not positive
/// and [`PlateError::MissingVolume`] for a record with nothing to dispense from.
pub fn resolve_samples(
    records: &[SampleRecord],
    config: &PipelineConfig,
) -> Result<Vec<SampleVolume>> {
    records
        .iter()
        .map(|record| resolve_sample(record, config))
        .collect()
}

fn resolve_sample(record: &SampleRecord, config: &PipelineConfig) -> Result<SampleVolume> {
    let well = WellCoordinate::parse(&record.well)?;
    let input_volume = record.input_volume.unwrap_or(config.input_volume);
    if !input_volume.is_finite() || input_volume <= 0.0 {
        return Err(PlateError::InvalidInputVolume {
            well: record.well.clone(),
            volume: input_volume,
        });
    }

    let diluent = match (record.diluent_volume, record.concentration) {
        (Some(diluent), _) => diluent,
        (None, Some(concentration)) => {
            diluent_volume(concentration, input_volume, config.target_concentration)
        }
        (None, None) => {
            return Err(PlateError::MissingVolume {
                well: record.well.clone(),
            })
        }
    };

    let sample = SampleVolume::new(well, record.sample_id.clone(), diluent);
    Ok(sample.with_input_volume(input_volume))
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
    use test_case::test_case;

    #[test_case(10.0, 1.0, 5.0, 1.0 ; "twice the target")]
    #[test_case(5.0, 1.0, 5.0, 0.0 ; "already at target")]
    #[test_case(0.4294, 1.0, 5.0, -0.9 ; "below target")]
    #[test_case(2.4305, 4.0, 0.5, 15.4 ; "larger input volume")]
    fn test_diluent_volume(concentration: f64, input: f64, target: f64, expected: f64) {
        assert_eq!(diluent_volume(concentration, input, target), expected);
    }

    #[test]
    fn test_total_volume() {
        assert_eq!(total_volume(15.4, 4.0), 19.4);
        assert_eq!(total_volume(-0.9, 1.0), 0.1);
    }

    #[test]
    fn test_resolve_prefers_explicit_diluent() {
        let config = PipelineConfig::default();
        let records = vec![
            SampleRecord {
                well: "A01".into(),
                sample_id: "s1".into(),
                concentration: Some(100.0),
                diluent_volume: Some(3.3),
                ..SampleRecord::default()
            },
            SampleRecord {
                well: "A2".into(),
                sample_id: "s2".into(),
                concentration: Some(20.0),
                input_volume: Some(2.0),
                ..SampleRecord::default()
            },
        ];
        let samples = resolve_samples(&records, &config).unwrap();
        assert_eq!(samples[0].well.to_label(), "A1");
        assert_eq!(samples[0].diluent_volume, 3.3);
        assert_eq!(samples[0].input_volume, Some(config.input_volume));
        assert_eq!(samples[1].diluent_volume, 6.0);
        assert_eq!(samples[1].input_volume, Some(2.0));
    }

    #[test]
    fn test_resolve_errors() {
        let config = PipelineConfig::default();
        let missing = SampleRecord {
            well: "B1".into(),
            ..SampleRecord::default()
        };
        assert!(matches!(
            resolve_samples(&[missing], &config),
            Err(PlateError::MissingVolume { .. })
        ));

        let bad_well = SampleRecord {
            well: "Z9".into(),
            concentration: Some(1.0),
            ..SampleRecord::default()
        };
        assert!(matches!(
            resolve_samples(&[bad_well], &config),
            Err(PlateError::MalformedWellLabel { .. })
        ));

        let no_stock = SampleRecord {
            well: "C2".into(),
            concentration: Some(1.0),
            input_volume: Some(-2.0),
            ..SampleRecord::default()
        };
        assert!(matches!(
            resolve_samples(&[no_stock], &config),
            Err(PlateError::InvalidInputVolume { ref well, .. }) if well == "C2"
        ));
    }
}
