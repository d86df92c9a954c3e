//! End-to-end summary generation: load, filter, join, annotate.

use crate::data::{
    AbundanceMatrix, AbundanceProfile, MetaTable, QcMetrics, SummaryRow, SummaryTable,
    TIMEPOINT_COLUMN,
};
use crate::error::{Result, SummaryError};
use crate::filter::filter_lineages;
use crate::qc::{matches_sample, read_mapq, CoverageTable};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;

/// Inputs and thresholds for one summary run.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Abundance files, one per timepoint.
    pub abundance_files: Vec<PathBuf>,
    /// Per-position coverage files, one per sample directory.
    pub coverage_files: Vec<PathBuf>,
    /// Alignment stat files, one per sample directory.
    pub stat_files: Vec<PathBuf>,
    /// Metadata table path.
    pub meta_file: PathBuf,
    /// Order output rows by sample date instead of timepoint index.
    pub real_timecourse: bool,
    /// Minimum depth for a position to count towards uniformity.
    pub min_read_count: u32,
    /// Minimum fraction a lineage must reach to keep its own column.
    pub lineage_min_threshold: f64,
}

/// Statistics describing one summary run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Abundance profiles loaded.
    pub n_profiles: usize,
    /// Lineage columns before filtering (`others` excluded).
    pub n_lineages_before: usize,
    /// Lineage columns kept.
    pub n_lineages_kept: usize,
    /// Lineages folded into `others`.
    pub dropped_lineages: Vec<String>,
    /// Output rows (timepoint × metadata sample pairs).
    pub n_rows: usize,
    /// Rows with no matching coverage file (all metrics missing).
    pub n_rows_without_coverage: usize,
    /// Rows with coverage but no matching stat file (MAPQ missing).
    pub n_rows_without_stat: usize,
}

impl RunReport {
    /// Pretty-printed JSON rendering of the report.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A joined (abundance row × metadata row) pair awaiting QC annotation.
struct JoinedRow {
    timepoint: i64,
    sample: String,
    sample_date: NaiveDate,
    abundances: Vec<Option<f64>>,
    meta: Vec<String>,
}

/// Run the full summary pipeline.
pub fn run(config: &SummaryConfig) -> Result<(SummaryTable, RunReport)> {
    let meta = MetaTable::from_tsv(&config.meta_file)?;

    let mut matrix = AbundanceMatrix::new();
    for path in &config.abundance_files {
        matrix.push_profile(AbundanceProfile::from_tsv(path)?);
    }
    if matrix.is_empty() {
        return Err(SummaryError::EmptyData(
            "No abundance profiles loaded".to_string(),
        ));
    }

    let n_profiles = matrix.n_rows();
    let (matrix, filter_result) = filter_lineages(&matrix, config.lineage_min_threshold)?;

    // Metadata columns pass through verbatim; timepoint leads the table.
    let meta_columns: Vec<String> = meta
        .columns()
        .iter()
        .filter(|c| c.as_str() != TIMEPOINT_COLUMN)
        .cloned()
        .collect();

    // Inner join on timepoint: one output row per matching metadata row,
    // abundance rows without metadata are dropped.
    let mut joined: Vec<JoinedRow> = Vec::new();
    for row in matrix.rows() {
        let abundances: Vec<Option<f64>> =
            matrix.lineages().iter().map(|l| row.get(l)).collect();
        for meta_row in meta.rows_for_timepoint(row.timepoint) {
            joined.push(JoinedRow {
                timepoint: row.timepoint,
                sample: meta_row.sample.clone(),
                sample_date: meta_row.sample_date,
                abundances: abundances.clone(),
                meta: meta_columns
                    .iter()
                    .map(|c| meta_row.get(c).unwrap_or("").to_string())
                    .collect(),
            });
        }
    }

    // Rows arrive timepoint-ordered; a real timecourse is ordered by date.
    if config.real_timecourse {
        joined.sort_by_key(|r| r.sample_date);
    }

    // Each lookup reads at most two small files, independent per row.
    let metrics: Vec<Result<(QcMetrics, bool, bool)>> = joined
        .par_iter()
        .map(|row| annotate_row(row, config))
        .collect();

    let mut table = SummaryTable::new(matrix.lineages().to_vec(), meta_columns);
    let mut n_rows_without_coverage = 0;
    let mut n_rows_without_stat = 0;

    for (row, metric) in joined.into_iter().zip(metrics) {
        let (qc, had_coverage, had_stat) = metric?;
        if !had_coverage {
            n_rows_without_coverage += 1;
        } else if !had_stat {
            n_rows_without_stat += 1;
        }
        table.push(SummaryRow {
            timepoint: row.timepoint,
            abundances: row.abundances,
            meta: row.meta,
            qc,
        })?;
    }

    let report = RunReport {
        n_profiles,
        n_lineages_before: filter_result.n_before,
        n_lineages_kept: filter_result.n_kept,
        dropped_lineages: filter_result.dropped,
        n_rows: table.n_rows(),
        n_rows_without_coverage,
        n_rows_without_stat,
    };

    Ok((table, report))
}

/// Compute QC metrics for one joined row.
///
/// The stat lookup is nested inside the coverage match: a row with no
/// coverage file keeps all four metrics missing, stat file present or not.
fn annotate_row(row: &JoinedRow, config: &SummaryConfig) -> Result<(QcMetrics, bool, bool)> {
    let mut qc = QcMetrics::default();
    let mut had_coverage = false;
    let mut had_stat = false;

    if let Some(cov_path) = config
        .coverage_files
        .iter()
        .find(|f| matches_sample(f, &row.sample))
    {
        had_coverage = true;
        let coverage = CoverageTable::from_tsv(cov_path, &row.sample)?;
        let stats = coverage.stats(config.min_read_count);
        qc.coverage_avg = Some(stats.avg);
        qc.coverage_sd = stats.sd;
        qc.uniformity_wg_per = Some(stats.uniformity_pct);

        if let Some(stat_path) = config
            .stat_files
            .iter()
            .find(|f| matches_sample(f, &row.sample))
        {
            had_stat = true;
            qc.mapq_avg = Some(read_mapq(stat_path)?);
        }
    }

    Ok((qc, had_coverage, had_stat))
}
