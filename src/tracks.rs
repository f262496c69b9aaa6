//! Grouping high-volume dispenses into tracks.
//!
//! The high-volume chip has to be topped up once the volume it has dispensed
//! reaches the capacity threshold, so the plate is split into sequential
//! tracks. Wells are taken in plate order; a well's amount is never split
//! across two tracks.

use crate::error::{PlateError, Result};
use crate::types::Track;
use crate::well::WELL_COUNT;

/// Default high-volume track capacity in µL.
pub const DEFAULT_CAPACITY_THRESHOLD: f64 = 850.0;

/// Batcher state between wells. A sealed track has been handed over and
/// the next well opens a fresh one.
#[derive(Debug)]
enum BatchState {
    Accumulating { track: Track, running_sum: u64 },
    Sealed,
}

/// Greedy batcher over the 96 coarse amounts of a plate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackBatcher {
    capacity_threshold: f64,
}

impl Default for TrackBatcher {
    fn default() -> Self {
        Self {
            capacity_threshold: DEFAULT_CAPACITY_THRESHOLD,
        }
    }
}

impl TrackBatcher {
    /// # Errors
    /// Returns [`PlateError::CapacityThresholdMisconfigured`] if the threshold
    /// is zero, negative or not finite.
    pub fn new(capacity_threshold: f64) -> Result<Self> {
        if !capacity_threshold.is_finite() || capacity_threshold <= 0.0 {
            return Err(PlateError::CapacityThresholdMisconfigured(capacity_threshold));
        }
        Ok(Self { capacity_threshold })
    }

    #[must_use]
    pub fn capacity_threshold(&self) -> f64 {
        self.capacity_threshold
    }

    /// Partition `coarse` (plate order) into tracks.
    ///
    /// A non-empty track is sealed when the next amount would bring its sum
    /// to or past the threshold; that amount opens the next track. After the
    /// last well the open track is sealed as well. Every well ends up in
    /// exactly one track, in order.
    #[must_use]
    pub fn batch(&self, coarse: &[u32; WELL_COUNT]) -> Vec<Track> {
        let mut tracks = Vec::new();
        let mut state = BatchState::Sealed;

        for (index, &amount) in coarse.iter().enumerate() {
            state = match state {
                BatchState::Accumulating { track, running_sum }
                    if self.reaches_threshold(running_sum + u64::from(amount)) =>
                {
                    tracing::trace!(
                        track = tracks.len(),
                        total = running_sum,
                        "track sealed at capacity"
                    );
                    tracks.push(track);
                    BatchState::Sealed
                }
                other => other,
            };

            state = match state {
                BatchState::Sealed => {
                    let mut track = Track::starting_at(index);
                    track.place(index, amount);
                    BatchState::Accumulating {
                        track,
                        running_sum: u64::from(amount),
                    }
                }
                BatchState::Accumulating {
                    mut track,
                    running_sum,
                } => {
                    track.place(index, amount);
                    BatchState::Accumulating {
                        track,
                        running_sum: running_sum + u64::from(amount),
                    }
                }
            };
        }

        if let BatchState::Accumulating { track, .. } = state {
            tracks.push(track);
        }

        tracing::debug!(
            tracks = tracks.len(),
            threshold = self.capacity_threshold,
            "coarse amounts batched"
        );
        tracks
    }

    #[allow(clippy::cast_precision_loss)]
    fn reaches_threshold(&self, sum: u64) -> bool {
        sum as f64 >= self.capacity_threshold
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

    fn plate_of(amount: u32) -> [u32; WELL_COUNT] {
        [amount; WELL_COUNT]
    }

    #[test]
    fn test_rejects_bad_threshold() {
        for threshold in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                TrackBatcher::new(threshold),
                Err(PlateError::CapacityThresholdMisconfigured(_))
            ));
        }
    }

    #[test]
    fn test_all_zero_plate_is_one_track() {
        let tracks = TrackBatcher::default().batch(&plate_of(0));
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].wells(), 0..WELL_COUNT);
        assert_eq!(tracks[0].total(), 0);
    }

    #[test]
    fn test_seals_when_threshold_reached() {
        // 10 µL per well: 84 wells sum to 840, the 85th would make 850.
        let tracks = TrackBatcher::default().batch(&plate_of(10));
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].wells(), 0..84);
        assert_eq!(tracks[0].total(), 840);
        assert_eq!(tracks[1].wells(), 84..WELL_COUNT);
        assert_eq!(tracks[1].total(), 120);
        // Unplaced slots stay zero.
        assert_eq!(tracks[1].slots()[0], 0);
        assert_eq!(tracks[0].slots()[84], 0);
    }

    #[test]
    fn test_oversized_well_gets_own_track() {
        let mut coarse = plate_of(0);
        coarse[0] = 5;
        coarse[1] = 900;
        coarse[2] = 3;
        let tracks = TrackBatcher::default().batch(&coarse);
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].placed(), &[5]);
        assert_eq!(tracks[1].placed(), &[900]);
        assert_eq!(tracks[2].placed()[0], 3);
    }

    #[test]
    fn test_oversized_first_well_is_not_preceded_by_empty_track() {
        let mut coarse = plate_of(1);
        coarse[0] = 1000;
        let tracks = TrackBatcher::default().batch(&coarse);
        assert_eq!(tracks[0].placed(), &[1000]);
        assert_eq!(tracks.len(), 2);
    }

    #[test]
    fn test_last_well_is_kept() {
        let mut coarse = plate_of(0);
        coarse[95] = 42;
        let tracks = TrackBatcher::default().batch(&coarse);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].last_placed(), Some(42));
        let (first, last) = tracks[0].span().unwrap();
        assert_eq!(first.to_label(), "A1");
        assert_eq!(last.to_label(), "H12");
    }

    #[test]
    fn test_custom_threshold() {
        let batcher = TrackBatcher::new(100.0).unwrap();
        let tracks = batcher.batch(&plate_of(50));
        // 50 + 50 = 100 reaches the threshold, so every track holds one well.
        assert_eq!(tracks.len(), WELL_COUNT);
    }
}
