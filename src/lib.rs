//! Per-sample sequencing summary generation for lineage surveillance runs.
//!
//! Merges the per-sample outputs of an abundance-estimation and
//! variant-calling pipeline into one summary table:
//!
//! - **data**: abundance matrix, metadata table and the output summary table
//! - **filter**: low-abundance lineage filtering (folded into `others`)
//! - **qc**: coverage statistics, uniformity and MAPQ extraction
//! - **pipeline**: end-to-end run orchestration and the run report
//!
//! # Example
//!
//! ```no_run
//! use lineage_summary::pipeline::{self, SummaryConfig};
//!
//! let config = SummaryConfig {
//!     abundance_files: vec!["abundance-1.tsv".into(), "abundance-2.tsv".into()],
//!     coverage_files: vec!["out/S1/coverage.tsv".into()],
//!     stat_files: vec!["out/S1/stats.txt".into()],
//!     meta_file: "metadata.tsv".into(),
//!     real_timecourse: false,
//!     min_read_count: 10,
//!     lineage_min_threshold: 0.01,
//! };
//!
//! let (table, report) = pipeline::run(&config).unwrap();
//! table.to_csv("summary.csv").unwrap();
//! eprintln!("{} rows written", report.n_rows);
//! ```

pub mod data;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod qc;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::{
        AbundanceMatrix, AbundanceProfile, MetaTable, QcMetrics, SummaryRow, SummaryTable,
    };
    pub use crate::error::{Result, SummaryError};
    pub use crate::filter::{filter_lineages, LineageFilterResult, OTHERS_LINEAGE};
    pub use crate::pipeline::{run, RunReport, SummaryConfig};
    pub use crate::qc::{matches_sample, read_mapq, CoverageStats, CoverageTable};
}
