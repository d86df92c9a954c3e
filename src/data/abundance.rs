//! Lineage abundance profiles and their accumulation across timepoints.

use crate::error::{Result, SummaryError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Suffix appended to lineage names by the upstream consensus-genome step.
const CONSENSUS_SUFFIX: &str = "-cons";

/// Tolerance for deciding whether an abundance column is on the 0-100 scale.
const SCALE_TOLERANCE: f64 = 1e-6;

/// Lineage fractions reported for a single timepoint.
#[derive(Debug, Clone)]
pub struct AbundanceProfile {
    /// Timepoint index derived from the file name.
    pub timepoint: i64,
    /// (lineage, fraction) pairs in file order, fractions in [0, 1].
    pub fractions: Vec<(String, f64)>,
}

impl AbundanceProfile {
    /// Load a profile from a two-column TSV (`lineage<TAB>abundance`, no header).
    ///
    /// Upstream tools report either fractions (column sums to 1) or
    /// percentages (column sums to 100); a column summing to 100 is rescaled
    /// to fractions. The `-cons` suffix is stripped from lineage names, and
    /// the timepoint is the integer between the last `-` and the last `.` of
    /// the file name.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let timepoint = timepoint_from_name(path)?;

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut fractions: Vec<(String, f64)> = Vec::new();

        for (line_idx, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.splitn(2, '\t');
            let lineage = fields.next().unwrap_or("").trim();
            let raw = fields.next().unwrap_or("").trim();
            let fraction: f64 = raw.parse().map_err(|_| SummaryError::InvalidAbundance {
                path: path.to_path_buf(),
                line: line_idx + 1,
                value: raw.to_string(),
            })?;
            fractions.push((lineage.replace(CONSENSUS_SUFFIX, ""), fraction));
        }

        if fractions.is_empty() {
            return Err(SummaryError::EmptyData(format!(
                "No abundance records in {}",
                path.display()
            )));
        }

        let total: f64 = fractions.iter().map(|(_, f)| f).sum();
        if (total - 100.0).abs() < SCALE_TOLERANCE {
            for (_, f) in &mut fractions {
                *f /= 100.0;
            }
        }

        Ok(Self {
            timepoint,
            fractions,
        })
    }
}

/// Extract the timepoint index from an abundance file name.
///
/// Convention: `<name>-<timepoint>.<ext>`, e.g. `abundance-3.tsv` -> 3.
pub fn timepoint_from_name(path: &Path) -> Result<i64> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SummaryError::TimepointFromName(path.display().to_string()))?;

    let dash = name.rfind('-');
    let dot = name.rfind('.');
    match (dash, dot) {
        (Some(dash), Some(dot)) if dash + 1 < dot => name[dash + 1..dot]
            .parse()
            .map_err(|_| SummaryError::TimepointFromName(name.to_string())),
        _ => Err(SummaryError::TimepointFromName(name.to_string())),
    }
}

/// One row of the accumulated abundance matrix.
///
/// Only non-zero fractions are stored: a reported zero is indistinguishable
/// from an absent lineage downstream, both surface as missing.
#[derive(Debug, Clone)]
pub struct AbundanceRow {
    /// Timepoint this row was observed at.
    pub timepoint: i64,
    pub(crate) values: HashMap<String, f64>,
}

impl AbundanceRow {
    /// Fraction for a lineage, `None` when absent or reported as zero.
    pub fn get(&self, lineage: &str) -> Option<f64> {
        self.values.get(lineage).copied()
    }
}

/// Abundance profiles accumulated into a timepoint × lineage table.
///
/// Columns are the union of all lineages seen, in first-seen order; rows are
/// kept sorted by timepoint (stable, so input order breaks ties).
#[derive(Debug, Clone, Default)]
pub struct AbundanceMatrix {
    lineages: Vec<String>,
    rows: Vec<AbundanceRow>,
}

impl AbundanceMatrix {
    /// Create an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one profile as a new row, extending the lineage columns as needed.
    pub fn push_profile(&mut self, profile: AbundanceProfile) {
        let mut values = HashMap::new();
        for (lineage, fraction) in profile.fractions {
            if !self.lineages.iter().any(|l| l == &lineage) {
                self.lineages.push(lineage.clone());
            }
            if fraction != 0.0 {
                values.insert(lineage, fraction);
            }
        }
        self.rows.push(AbundanceRow {
            timepoint: profile.timepoint,
            values,
        });
        self.rows.sort_by_key(|r| r.timepoint);
    }

    /// Lineage column names in first-seen order.
    pub fn lineages(&self) -> &[String] {
        &self.lineages
    }

    /// Rows sorted by timepoint.
    pub fn rows(&self) -> &[AbundanceRow] {
        &self.rows
    }

    /// Number of lineage columns.
    pub fn n_lineages(&self) -> usize {
        self.lineages.len()
    }

    /// Number of rows (loaded profiles).
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Check if no profiles have been added.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Maximum observed fraction for a lineage, `None` if never non-zero.
    pub fn column_max(&self, lineage: &str) -> Option<f64> {
        self.rows
            .iter()
            .filter_map(|r| r.get(lineage))
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    /// Keep the lineage columns at `keep` and fold all remaining mass into
    /// the `others` column, appended last.
    ///
    /// An existing `others` column contributes its mass and is not
    /// duplicated. A row whose folded mass is zero keeps `others` missing.
    pub fn fold_lineages(&self, keep: &[usize], others: &str) -> Result<AbundanceMatrix> {
        let mut kept: Vec<String> = Vec::with_capacity(keep.len());
        for &idx in keep {
            let lineage = self.lineages.get(idx).ok_or_else(|| {
                SummaryError::InvalidParameter(format!(
                    "lineage index {} out of bounds ({} columns)",
                    idx,
                    self.lineages.len()
                ))
            })?;
            if lineage.as_str() != others {
                kept.push(lineage.clone());
            }
        }

        let folded: Vec<String> = self
            .lineages
            .iter()
            .filter(|l| l.as_str() != others && !kept.contains(*l))
            .cloned()
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut values = HashMap::new();
                for lineage in &kept {
                    if let Some(v) = row.get(lineage) {
                        values.insert(lineage.clone(), v);
                    }
                }
                let mut other_mass: f64 = row.get(others).unwrap_or(0.0);
                for lineage in &folded {
                    other_mass += row.get(lineage).unwrap_or(0.0);
                }
                if other_mass != 0.0 {
                    values.insert(others.to_string(), other_mass);
                }
                AbundanceRow {
                    timepoint: row.timepoint,
                    values,
                }
            })
            .collect();

        kept.push(others.to_string());
        Ok(AbundanceMatrix {
            lineages: kept,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_profile(dir: &TempDir, name: &str, lines: &[(&str, &str)]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        for (lineage, abundance) in lines {
            writeln!(file, "{}\t{}", lineage, abundance).unwrap();
        }
        path
    }

    #[test]
    fn test_load_fractional_profile() {
        let dir = TempDir::new().unwrap();
        let path = write_profile(&dir, "abundance-1.tsv", &[("BA.2", "0.75"), ("XBB.1", "0.25")]);

        let profile = AbundanceProfile::from_tsv(&path).unwrap();
        assert_eq!(profile.timepoint, 1);
        assert_eq!(profile.fractions.len(), 2);
        assert!((profile.fractions[0].1 - 0.75).abs() < 1e-12);
        assert!((profile.fractions[1].1 - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_percentage_scale_normalized() {
        let dir = TempDir::new().unwrap();
        let path = write_profile(&dir, "abundance-2.tsv", &[("BA.2", "60"), ("XBB.1", "40")]);

        let profile = AbundanceProfile::from_tsv(&path).unwrap();
        assert!((profile.fractions[0].1 - 0.6).abs() < 1e-12);
        assert!((profile.fractions[1].1 - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_consensus_suffix_stripped() {
        let dir = TempDir::new().unwrap();
        let path = write_profile(&dir, "abundance-1.tsv", &[("BA.2-cons", "1.0")]);

        let profile = AbundanceProfile::from_tsv(&path).unwrap();
        assert_eq!(profile.fractions[0].0, "BA.2");
    }

    #[test]
    fn test_timepoint_from_name() {
        assert_eq!(timepoint_from_name(Path::new("run/abund-12.tsv")).unwrap(), 12);
        assert!(timepoint_from_name(Path::new("noextension-3")).is_err());
        assert!(timepoint_from_name(Path::new("abund-x.tsv")).is_err());
        assert!(timepoint_from_name(Path::new("nodash.tsv")).is_err());
    }

    #[test]
    fn test_invalid_abundance_value() {
        let dir = TempDir::new().unwrap();
        let path = write_profile(&dir, "abundance-1.tsv", &[("BA.2", "not-a-number")]);

        assert!(matches!(
            AbundanceProfile::from_tsv(&path),
            Err(SummaryError::InvalidAbundance { line: 1, .. })
        ));
    }

    #[test]
    fn test_matrix_union_and_zero_to_missing() {
        let mut matrix = AbundanceMatrix::new();
        matrix.push_profile(AbundanceProfile {
            timepoint: 2,
            fractions: vec![("BA.2".into(), 0.0), ("XBB.1".into(), 1.0)],
        });
        matrix.push_profile(AbundanceProfile {
            timepoint: 1,
            fractions: vec![("BA.2".into(), 0.3), ("BQ.1".into(), 0.7)],
        });

        // Union in first-seen order, rows sorted by timepoint
        assert_eq!(matrix.lineages(), &["BA.2", "XBB.1", "BQ.1"]);
        assert_eq!(matrix.rows()[0].timepoint, 1);
        assert_eq!(matrix.rows()[1].timepoint, 2);

        // Zero recorded as missing, non-zero entries untouched
        assert_eq!(matrix.rows()[1].get("BA.2"), None);
        assert_eq!(matrix.rows()[1].get("XBB.1"), Some(1.0));
        assert_eq!(matrix.rows()[0].get("BA.2"), Some(0.3));
        // Lineage absent from a row is missing
        assert_eq!(matrix.rows()[0].get("XBB.1"), None);
    }

    #[test]
    fn test_fold_lineages() {
        let mut matrix = AbundanceMatrix::new();
        matrix.push_profile(AbundanceProfile {
            timepoint: 1,
            fractions: vec![
                ("BA.2".into(), 0.6),
                ("BQ.1".into(), 0.05),
                ("others".into(), 0.35),
            ],
        });

        let folded = matrix.fold_lineages(&[0], "others").unwrap();
        assert_eq!(folded.lineages(), &["BA.2", "others"]);
        assert_eq!(folded.rows()[0].get("BA.2"), Some(0.6));
        let others = folded.rows()[0].get("others").unwrap();
        assert!((others - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_fold_lineages_zero_others_stays_missing() {
        let mut matrix = AbundanceMatrix::new();
        matrix.push_profile(AbundanceProfile {
            timepoint: 1,
            fractions: vec![("BA.2".into(), 1.0)],
        });

        let folded = matrix.fold_lineages(&[0], "others").unwrap();
        assert_eq!(folded.rows()[0].get("others"), None);
    }
}
