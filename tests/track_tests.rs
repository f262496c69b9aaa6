//! Track batching on generated plates.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::cast_precision_loss
)]

use dilution_plate::tracks::TrackBatcher;
use dilution_plate::well::WELL_COUNT;
use dilution_plate::Track;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

/// 96 coarse amounts, roughly a third of them empty wells.
fn arb_plate(max_amount: u32) -> impl Strategy<Value = [u32; WELL_COUNT]> {
    prop::collection::vec(prop_oneof![1 => Just(0u32), 2 => 0..=max_amount], WELL_COUNT)
        .prop_map(|amounts| <[u32; WELL_COUNT]>::try_from(amounts).unwrap())
}

/// Track capacities from tiny to larger than a full plate.
fn arb_threshold() -> impl Strategy<Value = f64> {
    prop_oneof![Just(850.0), 0.5f64..100.0, 100.0f64..20_000.0]
}

fn check_partition(
    tracks: &[Track],
    coarse: &[u32; WELL_COUNT],
    threshold: f64,
) -> Result<(), TestCaseError> {
    prop_assert!(!tracks.is_empty());

    let mut next = 0;
    let mut concatenated = Vec::with_capacity(WELL_COUNT);
    for track in tracks {
        prop_assert!(!track.is_empty());
        prop_assert_eq!(track.wells().start, next, "tracks must be contiguous");
        next = track.wells().end;
        concatenated.extend_from_slice(track.placed());

        let placed_sum: u64 = track.placed().iter().map(|&v| u64::from(v)).sum();
        prop_assert_eq!(placed_sum, track.total());
        prop_assert_eq!(
            track.slots().iter().map(|&v| u64::from(v)).sum::<u64>(),
            placed_sum
        );
        prop_assert!(
            (placed_sum as f64) < threshold || track.placed().len() == 1,
            "track {:?} over threshold {}",
            track.wells(),
            threshold
        );
    }
    prop_assert_eq!(next, WELL_COUNT);
    prop_assert_eq!(concatenated.as_slice(), coarse.as_slice());
    Ok(())
}

proptest! {
    /// Tracks concatenate back to the plate and stay under the threshold.
    #[test]
    fn tracks_partition_the_plate(threshold in arb_threshold(), coarse in arb_plate(190)) {
        let tracks = TrackBatcher::new(threshold).unwrap().batch(&coarse);
        check_partition(&tracks, &coarse, threshold)?;
    }

    /// Same partition properties when single wells often exceed the threshold.
    #[test]
    fn oversized_wells_get_their_own_track(coarse in arb_plate(2_000)) {
        let tracks = TrackBatcher::default().batch(&coarse);
        check_partition(&tracks, &coarse, 850.0)?;
    }

    #[test]
    fn batching_is_deterministic(coarse in arb_plate(150)) {
        let batcher = TrackBatcher::default();
        prop_assert_eq!(batcher.batch(&coarse), batcher.batch(&coarse));
    }
}

#[test]
fn test_sum_just_below_threshold_stays_together() {
    let mut coarse = [0; WELL_COUNT];
    coarse[0] = 400;
    coarse[1] = 449;
    let tracks = TrackBatcher::default().batch(&coarse);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].total(), 849);

    coarse[1] = 450;
    let tracks = TrackBatcher::default().batch(&coarse);
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].placed(), &[400]);
    assert_eq!(tracks[1].wells(), 1..WELL_COUNT);
}
