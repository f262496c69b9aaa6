//! Tab-separated plate view for review and spreadsheet import.

use crate::types::PlateGrid;
use crate::well::{COLUMNS, ROW_LABELS};

/// Write `grid` as TSV: a `row` header followed by columns `1`-`12`, then one
/// line per plate row.
#[must_use]
pub fn write_plate_tsv(grid: &PlateGrid) -> String {
    let mut out = String::with_capacity(1024);

    out.push_str("row");
    for col in 1..=COLUMNS {
        out.push_str(&format!("\t{col}"));
    }
    out.push('\n');

    for (label, row) in ROW_LABELS.iter().zip(grid.rows()) {
        out.push(*label);
        for value in row {
            out.push('\t');
            out.push_str(&value.to_string());
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::{DuplicateWellPolicy, SampleVolume};
    use crate::well::WellCoordinate;

    #[test]
    fn test_plate_tsv() {
        let grid = PlateGrid::build(
            &[SampleVolume::new(WellCoordinate::parse("B2").unwrap(), "s1", 4.5)],
            DuplicateWellPolicy::default(),
        )
        .unwrap();
        let tsv = write_plate_tsv(&grid);
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "row\t1\t2\t3\t4\t5\t6\t7\t8\t9\t10\t11\t12");
        assert_eq!(lines[1], "A\t0\t0\t0\t0\t0\t0\t0\t0\t0\t0\t0\t0");
        assert_eq!(lines[2], "B\t0\t4.5\t0\t0\t0\t0\t0\t0\t0\t0\t0\t0");
    }
}
