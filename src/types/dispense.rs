use serde::{Deserialize, Serialize};

use super::PlateGrid;
use crate::well::{WellCoordinate, WELL_COUNT};

/// One well's volume split across the two dispense channels.
///
/// `coarse` is whole microlitres for the high-volume chip, the fine part is
/// the sub-microlitre remainder for the low-volume chip, kept as tenths so
/// it always prints exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispenseAmount {
    pub coarse: u32,
    fine_tenths: u8,
}

impl DispenseAmount {
    /// Nothing dispensed on either channel.
    pub const ZERO: Self = Self {
        coarse: 0,
        fine_tenths: 0,
    };

    /// `fine_tenths` is clamped to `0..=9`.
    #[must_use]
    pub fn new(coarse: u32, fine_tenths: u8) -> Self {
        Self {
            coarse,
            fine_tenths: fine_tenths.min(9),
        }
    }

    /// Fine component in tenths of a microlitre (`0..=9`).
    #[must_use]
    pub fn fine_tenths(self) -> u8 {
        self.fine_tenths
    }

    /// Fine component in microlitres, in `[0, 1)`.
    #[must_use]
    pub fn fine(self) -> f64 {
        f64::from(self.fine_tenths) / 10.0
    }

    /// Coarse plus fine, in microlitres.
    #[must_use]
    pub fn total(self) -> f64 {
        f64::from(self.coarse) + self.fine()
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.coarse == 0 && self.fine_tenths == 0
    }
}

/// A batch of high-volume dispenses whose cumulative volume stays under the
/// chip's capacity before a refill.
///
/// Slots are indexed by plate order; wells outside `wells()` stay `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    slots: [u32; WELL_COUNT],
    start: usize,
    end: usize,
    total: u64,
}

impl Track {
    /// Empty track whose first well will be `start`.
    pub(crate) fn starting_at(start: usize) -> Self {
        Self {
            slots: [0; WELL_COUNT],
            start,
            end: start,
            total: 0,
        }
    }

    /// Place `amount` in the next slot. Wells are always placed in order, so
    /// the placed range stays contiguous.
    pub(crate) fn place(&mut self, index: usize, amount: u32) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = amount;
            self.end = index + 1;
            self.total += u64::from(amount);
        }
    }

    /// The 96-slot layout, zero outside the placed wells.
    #[must_use]
    pub fn slots(&self) -> &[u32; WELL_COUNT] {
        &self.slots
    }

    /// Amounts placed in this track, in plate order.
    #[must_use]
    pub fn placed(&self) -> &[u32] {
        self.slots.get(self.start..self.end).unwrap_or(&[])
    }

    /// Plate-order indices of the placed wells.
    #[must_use]
    pub fn wells(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// First and last placed wells.
    #[must_use]
    pub fn span(&self) -> Option<(WellCoordinate, WellCoordinate)> {
        let first = WellCoordinate::from_index(self.start)?;
        let last = WellCoordinate::from_index(self.end.checked_sub(1)?)?;
        Some((first, last))
    }

    /// Amount in the last placed well.
    #[must_use]
    pub fn last_placed(&self) -> Option<u32> {
        self.placed().last().copied()
    }

    /// Sum of all placed amounts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Everything the instruction writer needs: the reviewed plate, the split
/// amounts in plate order and the high-volume tracks built from them.
#[derive(Debug, Clone, PartialEq)]
pub struct DispensePlan {
    pub grid: PlateGrid,
    pub amounts: [DispenseAmount; WELL_COUNT],
    pub tracks: Vec<Track>,
}

impl DispensePlan {
    /// Coarse amounts in plate order.
    #[must_use]
    pub fn coarse(&self) -> [u32; WELL_COUNT] {
        self.amounts.map(|a| a.coarse)
    }
}
