//! Sample metadata handling for the summary pipeline.

use crate::error::{Result, SummaryError};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Column holding the integer timepoint index.
pub const TIMEPOINT_COLUMN: &str = "timepoint";
/// Column holding the ISO sampling date.
pub const SAMPLE_DATE_COLUMN: &str = "sample_date";
/// Column holding the sample identifier used for file matching.
pub const SAMPLE_COLUMN: &str = "sample";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One metadata record.
#[derive(Debug, Clone)]
pub struct MetaRow {
    /// Timepoint index.
    pub timepoint: i64,
    /// Sampling date.
    pub sample_date: NaiveDate,
    /// Sample identifier.
    pub sample: String,
    values: HashMap<String, String>,
}

impl MetaRow {
    /// Raw field value for a column, as read from the file.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(|s| s.as_str())
    }
}

/// Metadata table loaded from a TSV file.
///
/// `timepoint`, `sample_date` and `sample` columns are required and typed;
/// all other columns are carried through verbatim in file order.
#[derive(Debug, Clone)]
pub struct MetaTable {
    columns: Vec<String>,
    rows: Vec<MetaRow>,
}

impl MetaTable {
    /// Load metadata from a TSV file with a header row.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header_line = lines.next().ok_or_else(|| {
            SummaryError::EmptyData(format!("Empty metadata file {}", path.display()))
        })??;
        let columns: Vec<String> = header_line.split('\t').map(|s| s.trim().to_string()).collect();

        for required in [TIMEPOINT_COLUMN, SAMPLE_DATE_COLUMN, SAMPLE_COLUMN] {
            if !columns.iter().any(|c| c.as_str() == required) {
                return Err(SummaryError::MissingColumn {
                    column: required.to_string(),
                    path: path.to_path_buf(),
                });
            }
        }

        let mut rows = Vec::new();
        for line_result in lines {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();

            let mut values = HashMap::new();
            for (idx, column) in columns.iter().enumerate() {
                let raw = fields.get(idx).map_or("", |s| s.trim());
                values.insert(column.clone(), raw.to_string());
            }

            let timepoint_raw = &values[TIMEPOINT_COLUMN];
            let timepoint: i64 = timepoint_raw.parse().map_err(|_| {
                SummaryError::InvalidMetadataValue {
                    column: TIMEPOINT_COLUMN.to_string(),
                    value: timepoint_raw.clone(),
                    reason: "expected an integer".to_string(),
                }
            })?;

            let date_raw = &values[SAMPLE_DATE_COLUMN];
            let sample_date = NaiveDate::parse_from_str(date_raw, DATE_FORMAT).map_err(|_| {
                SummaryError::InvalidMetadataValue {
                    column: SAMPLE_DATE_COLUMN.to_string(),
                    value: date_raw.clone(),
                    reason: format!("expected a {} date", DATE_FORMAT),
                }
            })?;

            let sample = values[SAMPLE_COLUMN].clone();

            rows.push(MetaRow {
                timepoint,
                sample_date,
                sample,
                values,
            });
        }

        Ok(Self { columns, rows })
    }

    /// Column names in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in file order.
    pub fn rows(&self) -> &[MetaRow] {
        &self.rows
    }

    /// Number of metadata records.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Rows matching a timepoint, in file order.
    ///
    /// The join with abundance data has inner-join semantics: a timepoint
    /// with no metadata row is silently dropped by the caller.
    pub fn rows_for_timepoint(&self, timepoint: i64) -> Vec<&MetaRow> {
        self.rows
            .iter()
            .filter(|r| r.timepoint == timepoint)
            .collect()
    }
}
