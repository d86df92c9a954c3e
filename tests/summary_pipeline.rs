//! Integration tests for the end-to-end summary pipeline.

use lineage_summary::pipeline::{self, SummaryConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Lay out a miniature two-timepoint run:
///
/// - `abundance-1.tsv`: fractions summing to 1 (with `-cons` suffixes)
/// - `abundance-2.tsv`: percentages summing to 100 (scale normalization)
/// - metadata: S1 at timepoint 1, S2 and S3 at timepoint 2
/// - coverage: S1 = [5, 10, 0], S2 = [20, 20], none for S3
/// - stats: MAPQ for S1; S3 has a stat file but no coverage file
fn create_run(dir: &TempDir) -> SummaryConfig {
    let root = dir.path();

    let ab1 = root.join("abundance-1.tsv");
    let mut file = File::create(&ab1).unwrap();
    writeln!(file, "BA.2-cons\t0.75").unwrap();
    writeln!(file, "XBB.1-cons\t0.25").unwrap();

    let ab2 = root.join("abundance-2.tsv");
    let mut file = File::create(&ab2).unwrap();
    writeln!(file, "BA.2\t10").unwrap();
    writeln!(file, "XBB.1\t88").unwrap();
    writeln!(file, "BQ.1\t2").unwrap();

    let meta = root.join("metadata.tsv");
    let mut file = File::create(&meta).unwrap();
    writeln!(file, "sample_name\ttool_name\tsample\ttimepoint\tsample_date").unwrap();
    writeln!(file, "wwA\tfreyja\tS1\t1\t2023-01-05").unwrap();
    writeln!(file, "wwA\tfreyja\tS2\t2\t2023-01-12").unwrap();
    writeln!(file, "wwB\tfreyja\tS3\t2\t2023-01-12").unwrap();

    let cov_s1 = write_coverage(root, "S1", &[5, 10, 0]);
    let cov_s2 = write_coverage(root, "S2", &[20, 20]);

    let stat_s1 = root.join("S1").join("stats.txt");
    fs::write(&stat_s1, "MAPQ_avg=58.7\n").unwrap();
    fs::create_dir_all(root.join("S3")).unwrap();
    let stat_s3 = root.join("S3").join("stats.txt");
    fs::write(&stat_s3, "MAPQ_avg=12.0\n").unwrap();

    SummaryConfig {
        abundance_files: vec![ab1, ab2],
        coverage_files: vec![cov_s1, cov_s2],
        stat_files: vec![stat_s1, stat_s3],
        meta_file: meta,
        real_timecourse: false,
        min_read_count: 5,
        lineage_min_threshold: 0.05,
    }
}

fn write_coverage(root: &Path, sample: &str, depths: &[u32]) -> PathBuf {
    let dir = root.join(sample);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("coverage.tsv");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "pos\t{}", sample).unwrap();
    for (i, d) in depths.iter().enumerate() {
        writeln!(file, "{}\t{}", i + 1, d).unwrap();
    }
    path
}

#[test]
fn test_full_summary_run() {
    let dir = TempDir::new().unwrap();
    let config = create_run(&dir);

    let (table, report) = pipeline::run(&config).unwrap();

    // One row per (timepoint × metadata sample) pair
    assert_eq!(table.n_rows(), 3);
    assert_eq!(report.n_profiles, 2);
    assert_eq!(report.n_rows, 3);

    // BQ.1 peaks at 0.02 < 0.05 and is folded into others
    assert_eq!(table.lineage_columns(), &["BA.2", "XBB.1", "others"]);
    assert_eq!(report.dropped_lineages, vec!["BQ.1"]);
    assert_eq!(report.n_lineages_before, 3);
    assert_eq!(report.n_lineages_kept, 2);

    // Metadata passes through minus the timepoint key
    assert_eq!(
        table.meta_columns(),
        &["sample_name", "tool_name", "sample", "sample_date"]
    );

    let rows = table.rows();

    // Timepoint 1 / S1: depths [5, 10, 0] at threshold 5
    assert_eq!(rows[0].timepoint, 1);
    assert_eq!(rows[0].meta[2], "S1");
    assert_eq!(rows[0].abundances[0], Some(0.75));
    assert_eq!(rows[0].abundances[1], Some(0.25));
    assert_eq!(rows[0].abundances[2], None); // no folded mass at timepoint 1
    assert!((rows[0].qc.coverage_avg.unwrap() - 5.0).abs() < 1e-12);
    assert!((rows[0].qc.coverage_sd.unwrap() - 5.0).abs() < 1e-12);
    assert!((rows[0].qc.uniformity_wg_per.unwrap() - 200.0 / 3.0).abs() < 1e-9);
    assert!((rows[0].qc.mapq_avg.unwrap() - 58.7).abs() < 1e-12);

    // Timepoint 2 / S2: percentage file rescaled to fractions
    assert_eq!(rows[1].timepoint, 2);
    assert_eq!(rows[1].meta[2], "S2");
    assert!((rows[1].abundances[0].unwrap() - 0.10).abs() < 1e-12);
    assert!((rows[1].abundances[1].unwrap() - 0.88).abs() < 1e-12);
    assert!((rows[1].abundances[2].unwrap() - 0.02).abs() < 1e-12);
    assert!((rows[1].qc.coverage_avg.unwrap() - 20.0).abs() < 1e-12);
    assert_eq!(rows[1].qc.coverage_sd, Some(0.0));
    assert_eq!(rows[1].qc.uniformity_wg_per, Some(100.0));
    // Coverage matched but no stat file: only MAPQ stays missing
    assert_eq!(rows[1].qc.mapq_avg, None);

    // Timepoint 2 / S3: no coverage file, so the stat file is never read
    assert_eq!(rows[2].meta[2], "S3");
    assert_eq!(rows[2].qc.coverage_avg, None);
    assert_eq!(rows[2].qc.coverage_sd, None);
    assert_eq!(rows[2].qc.uniformity_wg_per, None);
    assert_eq!(rows[2].qc.mapq_avg, None);

    assert_eq!(report.n_rows_without_coverage, 1);
    assert_eq!(report.n_rows_without_stat, 1);
}

#[test]
fn test_csv_output_shape() {
    let dir = TempDir::new().unwrap();
    let config = create_run(&dir);

    let (table, _) = pipeline::run(&config).unwrap();
    let out = dir.path().join("summary.csv");
    table.to_csv(&out).unwrap();

    let content = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "timepoint,BA.2,XBB.1,others,sample_name,tool_name,sample,sample_date,\
         coverage_avg,coverage_sd,uniformity_wg_per,MAPQ_avg"
    );
    assert!(lines[1].starts_with("1,0.75,0.25,,wwA,freyja,S1,2023-01-05,5,5,"));
    assert!(lines[1].ends_with(",58.7"));
    assert!(lines[2].starts_with("2,0.1,0.88,0.02,wwA,freyja,S2,2023-01-12,20,0,100,"));
    // S3 row: all four metric fields empty
    assert!(lines[3].ends_with("wwB,freyja,S3,2023-01-12,,,,"));
}

#[test]
fn test_metadata_inner_join_drops_unmatched_timepoints() {
    let dir = TempDir::new().unwrap();
    let mut config = create_run(&dir);

    // Metadata only covers timepoint 2
    let meta = dir.path().join("metadata_partial.tsv");
    let mut file = File::create(&meta).unwrap();
    writeln!(file, "sample\ttimepoint\tsample_date").unwrap();
    writeln!(file, "S2\t2\t2023-01-12").unwrap();
    config.meta_file = meta;

    let (table, report) = pipeline::run(&config).unwrap();
    assert_eq!(table.n_rows(), 1);
    assert_eq!(table.rows()[0].timepoint, 2);
    assert_eq!(report.n_profiles, 2);
}

#[test]
fn test_real_timecourse_orders_by_sample_date() {
    let dir = TempDir::new().unwrap();
    let mut config = create_run(&dir);

    // Timepoint 1 was sampled after timepoint 2
    let meta = dir.path().join("metadata_dates.tsv");
    let mut file = File::create(&meta).unwrap();
    writeln!(file, "sample\ttimepoint\tsample_date").unwrap();
    writeln!(file, "S1\t1\t2023-02-01").unwrap();
    writeln!(file, "S2\t2\t2023-01-12").unwrap();
    config.meta_file = meta;

    config.real_timecourse = false;
    let (table, _) = pipeline::run(&config).unwrap();
    assert_eq!(table.rows()[0].timepoint, 1);

    config.real_timecourse = true;
    let (table, _) = pipeline::run(&config).unwrap();
    assert_eq!(table.rows()[0].timepoint, 2);
    assert_eq!(table.rows()[1].timepoint, 1);
}

#[test]
fn test_malformed_stat_file_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let mut config = create_run(&dir);

    let bad_stat = dir.path().join("S1").join("stats.txt");
    fs::write(&bad_stat, "no separator\n").unwrap();
    config.stat_files = vec![bad_stat];

    assert!(pipeline::run(&config).is_err());
}
