//! Reader for the long-form sample sheet (one row per well).
//!
//! Sheets are comma-, tab- or space-separated, with or without a header row. The
//! columns holding the well, sample id and concentration are chosen by a
//! [`ColumnMapping`], either by header name (case-insensitive) or by
//! zero-based position.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlateError, Result};
use crate::types::SampleRecord;

/// Field separator of a sample sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Comma,
    Tab,
    /// Runs of spaces and tabs. Fields cannot contain blanks.
    Whitespace,
}

impl Delimiter {
    /// Looks at the first non-empty line: tab, then comma, then blanks
    /// between fields. A single-column sheet is read as comma-separated.
    #[must_use]
    pub fn sniff(data: &[u8]) -> Self {
        let first_line = data
            .split(|&b| b == b'\n')
            .find(|line| line.iter().any(|b| !b.is_ascii_whitespace()))
            .unwrap_or_default()
            .trim_ascii();
        if first_line.contains(&b'\t') {
            Self::Tab
        } else if first_line.contains(&b',') {
            Self::Comma
        } else if first_line.contains(&b' ') {
            Self::Whitespace
        } else {
            Self::Comma
        }
    }
}

/// Rewrite every line with single tabs between its blank-separated fields.
/// Line count is preserved so errors still point at the right line.
fn collapse_whitespace(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A column picked by header name or zero-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl FromStr for ColumnRef {
    type Err = PlateError;

    /// All-digit strings are positions, anything else is a header name.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PlateError::SampleSheet("empty column reference".into()));
        }
        Ok(match s.parse::<usize>() {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Name(s.to_lowercase()),
        })
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "column {i}"),
            Self::Name(name) => write!(f, "column {name:?}"),
        }
    }
}

/// Which sheet columns feed which record fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub well: ColumnRef,
    pub sample_id: ColumnRef,
    pub concentration: Option<ColumnRef>,
    #[serde(default)]
    pub input_volume: Option<ColumnRef>,
    #[serde(default)]
    pub diluent_volume: Option<ColumnRef>,
}

impl Default for ColumnMapping {
    /// Well, sample and concentration in the first three columns.
    fn default() -> Self {
        Self {
            well: ColumnRef::Index(0),
            sample_id: ColumnRef::Index(1),
            concentration: Some(ColumnRef::Index(2)),
            input_volume: None,
            diluent_volume: None,
        }
    }
}

/// Column positions after matching the mapping against the header row.
struct ResolvedColumns {
    well: usize,
    sample_id: usize,
    concentration: Option<(usize, String)>,
    input_volume: Option<(usize, String)>,
    diluent_volume: Option<(usize, String)>,
}

impl ColumnMapping {
    fn resolve(&self, headers: Option<&[String]>) -> Result<ResolvedColumns> {
        let optional = |column: &Option<ColumnRef>| -> Result<Option<(usize, String)>> {
            column
                .as_ref()
                .map(|c| resolve_column(c, headers).map(|index| (index, c.to_string())))
                .transpose()
        };
        Ok(ResolvedColumns {
            well: resolve_column(&self.well, headers)?,
            sample_id: resolve_column(&self.sample_id, headers)?,
            concentration: optional(&self.concentration)?,
            input_volume: optional(&self.input_volume)?,
            diluent_volume: optional(&self.diluent_volume)?,
        })
    }
}

fn resolve_column(column: &ColumnRef, headers: Option<&[String]>) -> Result<usize> {
    match column {
        ColumnRef::Index(index) => Ok(*index),
        ColumnRef::Name(name) => {
            let Some(headers) = headers else {
                return Err(PlateError::SampleSheet(format!(
                    "{column} needs a header row"
                )));
            };
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    PlateError::SampleSheet(format!(
                        "{column} not found in header ({})",
                        headers.join(", ")
                    ))
                })
        }
    }
}

/// Configured sample-sheet reader.
#[derive(Debug, Clone)]
pub struct SampleSheetReader {
    mapping: ColumnMapping,
    has_headers: bool,
    delimiter: Option<Delimiter>,
}

impl Default for SampleSheetReader {
    fn default() -> Self {
        Self {
            mapping: ColumnMapping::default(),
            has_headers: true,
            delimiter: None,
        }
    }
}

impl SampleSheetReader {
    #[must_use]
    pub fn new(mapping: ColumnMapping) -> Self {
        Self {
            mapping,
            ..Self::default()
        }
    }

    /// Whether the first row holds column names (default `true`).
    #[must_use]
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    /// Force a delimiter instead of sniffing it.
    #[must_use]
    pub fn delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Read a sheet from a file.
    ///
    /// # Errors
    /// See [`SampleSheetReader::read_bytes`]; also fails if the file cannot be read.
    pub fn read_path(&self, path: &Path) -> Result<Vec<SampleRecord>> {
        let data = std::fs::read(path)?;
        self.read_bytes(&data)
    }

    /// Read a sheet held in memory.
    ///
    /// # Errors
    /// Returns [`PlateError::SampleSheet`] for unknown columns, short rows or
    /// non-numeric volumes, and [`PlateError::Csv`] for malformed CSV.
    pub fn read_bytes(&self, data: &[u8]) -> Result<Vec<SampleRecord>> {
        let delimiter = self.delimiter.unwrap_or_else(|| Delimiter::sniff(data));
        let collapsed;
        let (data, separator) = match delimiter {
            Delimiter::Comma => (data, b','),
            Delimiter::Tab => (data, b'\t'),
            Delimiter::Whitespace => {
                collapsed = collapse_whitespace(data);
                (collapsed.as_bytes(), b'\t')
            }
        };
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(separator)
            .has_headers(self.has_headers)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data);

        let headers: Option<Vec<String>> = if self.has_headers {
            Some(reader.headers()?.iter().map(str::to_lowercase).collect())
        } else {
            None
        };
        let columns = self.mapping.resolve(headers.as_deref())?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            if row.iter().all(str::is_empty) {
                continue;
            }
            let line = row.position().map_or(0, csv::Position::line);
            records.push(read_record(&row, &columns, line)?);
        }

        tracing::debug!(
            records = records.len(),
            delimiter = ?delimiter,
            "sample sheet read"
        );
        Ok(records)
    }
}

fn read_record(
    row: &csv::StringRecord,
    columns: &ResolvedColumns,
    line: u64,
) -> Result<SampleRecord> {
    let field = |index: usize| -> Result<&str> {
        row.get(index).ok_or_else(|| {
            PlateError::SampleSheet(format!("line {line}: no column {index} in this row"))
        })
    };
    let number = |column: &Option<(usize, String)>| -> Result<Option<f64>> {
        let Some((index, name)) = column else {
            return Ok(None);
        };
        let text = field(*index)?;
        if text.is_empty() {
            return Ok(None);
        }
        text.parse::<f64>().map(Some).map_err(|_| {
            PlateError::SampleSheet(format!("line {line}: {name} value {text:?} is not a number"))
        })
    };

    Ok(SampleRecord {
        well: field(columns.well)?.to_string(),
        sample_id: field(columns.sample_id)?.to_string(),
        concentration: number(&columns.concentration)?,
        input_volume: number(&columns.input_volume)?,
        diluent_volume: number(&columns.diluent_volume)?,
    })
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
    fn test_sniff_delimiter() {
        assert_eq!(Delimiter::sniff(b"Well,Sample,ng/uL\nA1,s,1"), Delimiter::Comma);
        assert_eq!(Delimiter::sniff(b"\n\nWell\tSample\n"), Delimiter::Tab);
        assert_eq!(Delimiter::sniff(b""), Delimiter::Comma);
        assert_eq!(Delimiter::sniff(b"Well  Sample   ng/uL \r\n"), Delimiter::Whitespace);
        assert_eq!(Delimiter::sniff(b"Well, Sample, ng/uL\n"), Delimiter::Comma);
        assert_eq!(Delimiter::sniff(b"  Well\n"), Delimiter::Comma);
    }

    #[test]
    fn test_read_space_separated() {
        let data = b"Well   Sample  ng/uL\nA1 sample_1   12.5\n\n  B02\tsample_2 0.8  \r\n";
        let records = SampleSheetReader::default().read_bytes(data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].well, "A1");
        assert_eq!(records[0].concentration, Some(12.5));
        assert_eq!(records[1].well, "B02");
        assert_eq!(records[1].sample_id, "sample_2");
        assert_eq!(records[1].concentration, Some(0.8));
    }

    #[test]
    fn test_space_separated_errors_keep_line_numbers() {
        let err = SampleSheetReader::default()
            .read_bytes(b"well id conc\nA1 x 1\nA2 y lots\n")
            .unwrap_err();
        assert!(matches!(err, PlateError::SampleSheet(ref m) if m.contains("line 3")));
    }

    #[test]
    fn test_column_ref_from_str() {
        assert_eq!("2".parse::<ColumnRef>().unwrap(), ColumnRef::Index(2));
        assert_eq!(
            "ng/uL".parse::<ColumnRef>().unwrap(),
            ColumnRef::Name("ng/ul".into())
        );
        assert!(" ".parse::<ColumnRef>().is_err());
    }

    #[test]
    fn test_read_default_mapping() {
        let data = b"Well,Sample,ng/uL\nA1,sample_1,0.4294\nA02,sample_2,0.0312\n\n";
        let records = SampleSheetReader::default().read_bytes(data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].well, "A1");
        assert_eq!(records[1].well, "A02");
        assert_eq!(records[1].sample_id, "sample_2");
        assert_eq!(records[0].concentration, Some(0.4294));
        assert_eq!(records[0].diluent_volume, None);
    }

    #[test]
    fn test_read_by_header_names_tsv() {
        let data = b"conc\tid\tWELL\tuL DNA\n 12.5\tx\tB3\t2\n";
        let mapping = ColumnMapping {
            well: "well".parse().unwrap(),
            sample_id: "ID".parse().unwrap(),
            concentration: Some("Conc".parse().unwrap()),
            input_volume: Some("ul dna".parse().unwrap()),
            diluent_volume: None,
        };
        let records = SampleSheetReader::new(mapping).read_bytes(data).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].well, "B3");
        assert_eq!(records[0].sample_id, "x");
        assert_eq!(records[0].concentration, Some(12.5));
        assert_eq!(records[0].input_volume, Some(2.0));
    }

    #[test]
    fn test_read_without_headers() {
        let data = b"A1,s1,3.0\nA2,s2,4.0\n";
        let records = SampleSheetReader::default()
            .has_headers(false)
            .read_bytes(data)
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_name_without_headers_is_error() {
        let mapping = ColumnMapping {
            well: "well".parse().unwrap(),
            ..ColumnMapping::default()
        };
        let err = SampleSheetReader::new(mapping)
            .has_headers(false)
            .read_bytes(b"A1,s1,3.0\n")
            .unwrap_err();
        assert!(matches!(err, PlateError::SampleSheet(_)));
    }

    #[test]
    fn test_unknown_column_and_bad_number() {
        let mapping = ColumnMapping {
            concentration: Some("missing".parse().unwrap()),
            ..ColumnMapping::default()
        };
        let err = SampleSheetReader::new(mapping)
            .read_bytes(b"well,sample,conc\nA1,s,1\n")
            .unwrap_err();
        assert!(err.to_string().contains("not found"));

        let err = SampleSheetReader::default()
            .read_bytes(b"well,sample,conc\nA1,s,lots\n")
            .unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_short_row_is_error() {
        let err = SampleSheetReader::default()
            .read_bytes(b"well,sample,conc\nA1\n")
            .unwrap_err();
        assert!(matches!(err, PlateError::SampleSheet(_)));
    }
}
