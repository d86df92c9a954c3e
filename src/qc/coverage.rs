//! Per-position coverage statistics.

use crate::error::{Result, SummaryError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read depths for one sample, extracted from a per-position coverage TSV.
#[derive(Debug, Clone)]
pub struct CoverageTable {
    depths: Vec<f64>,
}

/// Summary statistics over a coverage table.
#[derive(Debug, Clone, Copy)]
pub struct CoverageStats {
    /// Mean depth across all positions.
    pub avg: f64,
    /// Sample standard deviation of depth; `None` for a single position.
    pub sd: Option<f64>,
    /// Percentage (0-100) of positions at or above the depth threshold.
    pub uniformity_pct: f64,
}

impl CoverageTable {
    /// Load the depth column named after `sample` from a coverage TSV.
    ///
    /// The file must have a header row containing a column whose name equals
    /// the sample identifier exactly; each data row is one genomic position.
    pub fn from_tsv<P: AsRef<Path>>(path: P, sample: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header_line = lines.next().ok_or_else(|| {
            SummaryError::EmptyData(format!("Empty coverage file {}", path.display()))
        })??;
        let col_idx = header_line
            .split('\t')
            .position(|h| h.trim() == sample)
            .ok_or_else(|| SummaryError::MissingColumn {
                column: sample.to_string(),
                path: path.to_path_buf(),
            })?;

        let mut depths = Vec::new();
        for (line_idx, line_result) in lines.enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            let raw = line.split('\t').nth(col_idx).unwrap_or("").trim();
            let depth: f64 = raw.parse().map_err(|_| SummaryError::InvalidDepth {
                path: path.to_path_buf(),
                line: line_idx + 2,
                value: raw.to_string(),
            })?;
            depths.push(depth);
        }

        if depths.is_empty() {
            return Err(SummaryError::EmptyData(format!(
                "No positions in coverage file {}",
                path.display()
            )));
        }

        Ok(Self { depths })
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// Check if the table has no positions. Construction rejects empty
    /// tables, so this only holds for manually built values.
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Mean depth.
    pub fn mean(&self) -> f64 {
        self.depths.iter().sum::<f64>() / self.depths.len() as f64
    }

    /// Sample standard deviation (n-1 denominator); `None` for one position.
    pub fn sd(&self) -> Option<f64> {
        let n = self.depths.len();
        if n < 2 {
            return None;
        }
        let mean = self.mean();
        let ss: f64 = self.depths.iter().map(|d| (d - mean).powi(2)).sum();
        Some((ss / (n - 1) as f64).sqrt())
    }

    /// Percentage of positions with depth >= `min_read_count`.
    pub fn uniformity(&self, min_read_count: u32) -> f64 {
        let passed = self
            .depths
            .iter()
            .filter(|&&d| d >= min_read_count as f64)
            .count();
        passed as f64 / self.depths.len() as f64 * 100.0
    }

    /// All three metrics at once.
    pub fn stats(&self, min_read_count: u32) -> CoverageStats {
        CoverageStats {
            avg: self.mean(),
            sd: self.sd(),
            uniformity_pct: self.uniformity(min_read_count),
        }
    }
}
