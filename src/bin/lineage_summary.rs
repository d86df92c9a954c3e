//! lineage-summary CLI
//!
//! Merges per-sample pipeline outputs (lineage abundances, coverage tables,
//! mapping-quality stats) and a metadata table into one summary CSV.

use clap::Parser;
use lineage_summary::error::Result;
use lineage_summary::pipeline::{self, SummaryConfig};
use std::path::PathBuf;

/// Merge lineage abundance, coverage and mapping-quality outputs into one summary table
#[derive(Parser)]
#[command(name = "lineage-summary")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Abundance files, one per timepoint (lineage<TAB>abundance, no header)
    #[arg(short = 'a', long = "abundances_files", num_args = 1.., required = true)]
    abundances_files: Vec<PathBuf>,

    /// Per-position coverage files, one per sample directory
    #[arg(short = 'c', long = "coverage_files", num_args = 1..)]
    coverage_files: Vec<PathBuf>,

    /// Alignment stat files, one per sample directory
    #[arg(short = 'v', long = "stat_files", num_args = 1..)]
    stat_files: Vec<PathBuf>,

    /// Metadata TSV with timepoint, sample_date and sample columns
    #[arg(short = 'm', long = "meta_file")]
    meta_file: PathBuf,

    /// Order output rows by sample date instead of timepoint index
    #[arg(
        short = 'r',
        long = "real_timecourse",
        action = clap::ArgAction::Set,
        default_value_t = false
    )]
    real_timecourse: bool,

    /// Minimum read depth for a position to count towards uniformity
    #[arg(short = 'z', long = "min_read_count")]
    min_read_count: u32,

    /// Drop lineages never reaching this relative abundance (0-1)
    #[arg(short = 'l', long = "lineage_min_threshold")]
    lineage_min_threshold: f64,

    /// Output CSV path
    #[arg(short = 'o', long = "output_file")]
    output_file: PathBuf,

    /// Optional path for a JSON run report
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = SummaryConfig {
        abundance_files: cli.abundances_files,
        coverage_files: cli.coverage_files,
        stat_files: cli.stat_files,
        meta_file: cli.meta_file,
        real_timecourse: cli.real_timecourse,
        min_read_count: cli.min_read_count,
        lineage_min_threshold: cli.lineage_min_threshold,
    };

    eprintln!(
        "Summarizing {} abundance files against {:?}...",
        config.abundance_files.len(),
        config.meta_file
    );
    let (table, report) = pipeline::run(&config)?;

    eprintln!("Writing {} rows to {:?}...", table.n_rows(), cli.output_file);
    table.to_csv(&cli.output_file)?;

    if let Some(path) = &cli.report {
        std::fs::write(path, report.to_json()?)?;
        eprintln!("Run report written to {:?}", path);
    }

    eprintln!(
        "Done! {} of {} lineages kept, {} folded into 'others'",
        report.n_lineages_kept,
        report.n_lineages_before,
        report.dropped_lineages.len()
    );
    if report.n_rows_without_coverage > 0 {
        eprintln!(
            "  {} row(s) had no matching coverage file",
            report.n_rows_without_coverage
        );
    }
    if report.n_rows_without_stat > 0 {
        eprintln!(
            "  {} row(s) had no matching stat file",
            report.n_rows_without_stat
        );
    }

    Ok(())
}
