//! Well labels of a 96-well microplate.
//!
//! A label is a row letter (`A`-`H`) followed by a column number (`1`-`12`).
//! One- and two-digit columns are equivalent, so `A1` and `A01` name the same
//! well. Plate order is row-major: `A1, A2, ..., A12, B1, ..., H12`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PlateError, Result};

/// Number of rows on the plate (`A`-`H`).
pub const ROWS: usize = 8;
/// Number of columns on the plate (`1`-`12`).
pub const COLUMNS: usize = 12;
/// Number of wells on the plate.
pub const WELL_COUNT: usize = ROWS * COLUMNS;
/// Row letters in plate order.
pub const ROW_LABELS: [char; ROWS] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// A validated well position.
///
/// Ordering follows plate order (rows outer, columns inner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WellCoordinate {
    row: u8,    // 0-indexed, 0..8
    column: u8, // 1-indexed, 1..=12
}

impl WellCoordinate {
    /// Build a coordinate from a zero-based row index and a one-based column.
    #[must_use]
    pub fn new(row: usize, column: usize) -> Option<Self> {
        if row >= ROWS || !(1..=COLUMNS).contains(&column) {
            return None;
        }
        Some(Self {
            row: u8::try_from(row).ok()?,
            column: u8::try_from(column).ok()?,
        })
    }

    /// Parse a label like `"B7"` or `"B07"`.
    ///
    /// Surrounding whitespace is ignored and lowercase row letters are
    /// accepted. The column must be all digits; leading zeros are allowed.
    ///
    /// # Errors
    /// Returns [`PlateError::MalformedWellLabel`] if the row is not `A`-`H` or
    /// the column is missing, non-numeric or outside `1`-`12`.
    pub fn parse(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        let mut chars = trimmed.chars();
        let Some(row_char) = chars.next() else {
            return Err(PlateError::malformed_well(label, "empty label"));
        };

        let upper = row_char.to_ascii_uppercase();
        let Some(row) = ROW_LABELS.iter().position(|&r| r == upper) else {
            return Err(PlateError::malformed_well(
                label,
                format!("row {row_char:?} is not one of A-H"),
            ));
        };

        let digits = chars.as_str();
        if digits.is_empty() {
            return Err(PlateError::malformed_well(label, "missing column number"));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PlateError::malformed_well(
                label,
                format!("column {digits:?} is not a number"),
            ));
        }
        let column: usize = digits
            .parse()
            .map_err(|_| PlateError::malformed_well(label, "column number too large"))?;

        Self::new(row, column).ok_or_else(|| {
            PlateError::malformed_well(label, format!("column {column} is not in 1-12"))
        })
    }

    /// Zero-based row index (`A` = 0).
    #[must_use]
    pub fn row(self) -> usize {
        usize::from(self.row)
    }

    /// One-based column number.
    #[must_use]
    pub fn column(self) -> usize {
        usize::from(self.column)
    }

    /// Row letter.
    #[must_use]
    pub fn row_letter(self) -> char {
        ROW_LABELS.get(self.row()).copied().unwrap_or('?')
    }

    /// Canonical label without leading zeros, e.g. `A1`.
    #[must_use]
    pub fn to_label(self) -> String {
        format!("{}{}", self.row_letter(), self.column)
    }

    /// Position in plate order, `0..96`.
    #[must_use]
    pub fn index(self) -> usize {
        self.row() * COLUMNS + self.column() - 1
    }

    /// Inverse of [`WellCoordinate::index`].
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= WELL_COUNT {
            return None;
        }
        Self::new(index / COLUMNS, index % COLUMNS + 1)
    }

    /// All 96 wells in plate order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..WELL_COUNT).filter_map(Self::from_index)
    }
}

impl fmt::Display for WellCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.column)
    }
}

impl FromStr for WellCoordinate {
    type Err = PlateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for WellCoordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WellCoordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Self::parse(&label).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let well = WellCoordinate::parse("C5").unwrap();
        assert_eq!(well.row(), 2);
        assert_eq!(well.column(), 5);
        assert_eq!(well.row_letter(), 'C');
    }

    #[test]
    fn test_leading_zero_is_equivalent() {
        assert_eq!(
            WellCoordinate::parse("A01").unwrap(),
            WellCoordinate::parse("A1").unwrap()
        );
        assert_eq!(
            WellCoordinate::parse("H012").unwrap(),
            WellCoordinate::parse("H12").unwrap()
        );
    }

    #[test]
    fn test_lowercase_and_whitespace() {
        let well = WellCoordinate::parse(" d10 ").unwrap();
        assert_eq!(well.to_label(), "D10");
    }

    #[test]
    fn test_rejects_bad_labels() {
        for label in ["", "A", "I1", "A0", "A13", "A1x", "1A", "A-1", "A+1", "ZZ"] {
            let err = WellCoordinate::parse(label).unwrap_err();
            assert!(
                matches!(err, PlateError::MalformedWellLabel { .. }),
                "{label:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_huge_column_is_malformed() {
        let err = WellCoordinate::parse("A99999999999999999999999").unwrap_err();
        assert!(matches!(err, PlateError::MalformedWellLabel { .. }));
    }

    #[test]
    fn test_index_roundtrip_and_order() {
        let wells: Vec<_> = WellCoordinate::all().collect();
        assert_eq!(wells.len(), WELL_COUNT);
        assert_eq!(wells[0].to_label(), "A1");
        assert_eq!(wells[11].to_label(), "A12");
        assert_eq!(wells[12].to_label(), "B1");
        assert_eq!(wells[95].to_label(), "H12");
        for (i, well) in wells.iter().enumerate() {
            assert_eq!(well.index(), i);
        }
        assert!(wells.windows(2).all(|w| w[0] < w[1]));
        assert!(WellCoordinate::from_index(WELL_COUNT).is_none());
    }

    #[test]
    fn test_serde_uses_label() {
        let well = WellCoordinate::parse("B03").unwrap();
        let json = serde_json::to_string(&well).unwrap();
        assert_eq!(json, "\"B3\"");
        let back: WellCoordinate = serde_json::from_str("\"b03\"").unwrap();
        assert_eq!(back, well);
        assert!(serde_json::from_str::<WellCoordinate>("\"Q1\"").is_err());
    }
}
