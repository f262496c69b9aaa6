use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::well::{WellCoordinate, COLUMNS, ROWS, ROW_LABELS, WELL_COUNT};

/// What to do when the same well appears more than once in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateWellPolicy {
    /// Later entries overwrite earlier ones (operators entering corrections).
    #[default]
    LastWriteWins,
    /// Strict mode: a repeated well is an error.
    Reject,
}

/// Diluent volumes laid out on the 8×12 plate. Every well is present;
/// wells without a sample hold `0.0`.
///
/// Each well also remembers the stock volume its sample was made with, when
/// the sample carried one, so overfill checks see the real well contents.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateGrid {
    pub(crate) cells: [[f64; COLUMNS]; ROWS],
    pub(crate) inputs: [[Option<f64>; COLUMNS]; ROWS],
}

impl Default for PlateGrid {
    fn default() -> Self {
        Self {
            cells: [[0.0; COLUMNS]; ROWS],
            inputs: [[None; COLUMNS]; ROWS],
        }
    }
}

impl PlateGrid {
    /// Value at `well`.
    #[must_use]
    pub fn get(&self, well: WellCoordinate) -> f64 {
        self.cells
            .get(well.row())
            .and_then(|row| row.get(well.column() - 1))
            .copied()
            .unwrap_or(0.0)
    }

    pub(crate) fn set(&mut self, well: WellCoordinate, value: f64) {
        if let Some(cell) = self
            .cells
            .get_mut(well.row())
            .and_then(|row| row.get_mut(well.column() - 1))
        {
            *cell = value;
        }
    }

    /// Stock volume recorded for `well`, if its sample carried one.
    #[must_use]
    pub fn input_volume(&self, well: WellCoordinate) -> Option<f64> {
        self.inputs
            .get(well.row())
            .and_then(|row| row.get(well.column() - 1))
            .copied()
            .flatten()
    }

    pub(crate) fn set_input_volume(&mut self, well: WellCoordinate, input_volume: Option<f64>) {
        if let Some(cell) = self
            .inputs
            .get_mut(well.row())
            .and_then(|row| row.get_mut(well.column() - 1))
        {
            *cell = input_volume;
        }
    }

    /// One plate row (`0` = `A`).
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[f64; COLUMNS]> {
        self.cells.get(row)
    }

    /// All rows, `A` first.
    #[must_use]
    pub fn rows(&self) -> &[[f64; COLUMNS]; ROWS] {
        &self.cells
    }

    /// Wells and values in plate order.
    pub fn iter(&self) -> impl Iterator<Item = (WellCoordinate, f64)> + '_ {
        WellCoordinate::all().map(|well| (well, self.get(well)))
    }

    /// The 96 values in plate order.
    #[must_use]
    pub fn values_row_major(&self) -> [f64; WELL_COUNT] {
        let mut out = [0.0; WELL_COUNT];
        for (slot, value) in out.iter_mut().zip(self.cells.iter().flatten()) {
            *slot = *value;
        }
        out
    }

    /// Number of wells holding a non-zero volume.
    #[must_use]
    pub fn non_zero_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|v| v.abs() > f64::EPSILON)
            .count()
    }
}

impl Serialize for PlateGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<String> = ROW_LABELS.iter().map(char::to_string).collect();
        let columns: Vec<String> = (1..=COLUMNS).map(|c| c.to_string()).collect();
        let mut state = serializer.serialize_struct("PlateGrid", 3)?;
        state.serialize_field("rows", &rows)?;
        state.serialize_field("columns", &columns)?;
        state.serialize_field("values", &self.cells)?;
        state.end()
    }
}
