//! The merged per-sample summary table and its CSV writer.

use crate::error::{Result, SummaryError};
use serde::Serialize;
use std::path::Path;

/// Derived sequencing-quality metrics for one sample.
///
/// All four stay `None` when no coverage file matched the sample; only
/// `mapq_avg` stays `None` when the coverage file matched but no stat file
/// did. `coverage_sd` is also `None` for a single-position coverage table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QcMetrics {
    pub coverage_avg: Option<f64>,
    pub coverage_sd: Option<f64>,
    pub uniformity_wg_per: Option<f64>,
    pub mapq_avg: Option<f64>,
}

/// One output row: a (timepoint, metadata sample) pair.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    /// Timepoint index.
    pub timepoint: i64,
    /// Lineage fractions, parallel to the table's lineage columns.
    pub abundances: Vec<Option<f64>>,
    /// Metadata values, parallel to the table's metadata columns.
    pub meta: Vec<String>,
    /// Derived quality metrics.
    pub qc: QcMetrics,
}

/// The merged summary table.
///
/// Column order is fixed: `timepoint`, lineage columns in accumulation
/// order, metadata columns in file order (minus `timepoint`), then the four
/// quality metric columns.
#[derive(Debug, Clone)]
pub struct SummaryTable {
    lineage_columns: Vec<String>,
    meta_columns: Vec<String>,
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Create an empty table with the given columns.
    pub fn new(lineage_columns: Vec<String>, meta_columns: Vec<String>) -> Self {
        Self {
            lineage_columns,
            meta_columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, checking it against the column layout.
    pub fn push(&mut self, row: SummaryRow) -> Result<()> {
        if row.abundances.len() != self.lineage_columns.len() {
            return Err(SummaryError::InvalidParameter(format!(
                "row has {} abundance values, table has {} lineage columns",
                row.abundances.len(),
                self.lineage_columns.len()
            )));
        }
        if row.meta.len() != self.meta_columns.len() {
            return Err(SummaryError::InvalidParameter(format!(
                "row has {} metadata values, table has {} metadata columns",
                row.meta.len(),
                self.meta_columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Lineage column names.
    pub fn lineage_columns(&self) -> &[String] {
        &self.lineage_columns
    }

    /// Metadata column names (without `timepoint`).
    pub fn meta_columns(&self) -> &[String] {
        &self.meta_columns
    }

    /// Rows in output order.
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table as CSV; missing values become empty fields.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        let mut header: Vec<&str> = vec!["timepoint"];
        header.extend(self.lineage_columns.iter().map(|s| s.as_str()));
        header.extend(self.meta_columns.iter().map(|s| s.as_str()));
        header.extend(["coverage_avg", "coverage_sd", "uniformity_wg_per", "MAPQ_avg"]);
        writer.write_record(&header)?;

        for row in &self.rows {
            let mut record: Vec<String> = Vec::with_capacity(header.len());
            record.push(row.timepoint.to_string());
            record.extend(row.abundances.iter().map(|v| fmt_opt(*v)));
            record.extend(row.meta.iter().cloned());
            record.push(fmt_opt(row.qc.coverage_avg));
            record.push(fmt_opt(row.qc.coverage_sd));
            record.push(fmt_opt(row.qc.uniformity_wg_per));
            record.push(fmt_opt(row.qc.mapq_avg));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
