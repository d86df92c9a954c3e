//! Sequencing-quality metrics: coverage statistics and MAPQ extraction.

pub mod coverage;
pub mod mapq;

pub use coverage::{CoverageStats, CoverageTable};
pub use mapq::read_mapq;

use std::path::Path;

/// Check whether a per-sample file belongs to `sample`.
///
/// Pipeline convention: outputs live one directory per sample, so the path's
/// second-to-last segment (the parent directory name) must equal the sample
/// identifier exactly.
pub fn matches_sample(path: &Path, sample: &str) -> bool {
    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .is_some_and(|n| n == sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_sample() {
        assert!(matches_sample(Path::new("out/S1/coverage.tsv"), "S1"));
        assert!(!matches_sample(Path::new("out/S1/coverage.tsv"), "S2"));
        // The file name itself never matches, only the parent directory
        assert!(!matches_sample(Path::new("out/other/S1.tsv"), "S1"));
        assert!(!matches_sample(Path::new("S1.tsv"), "S1"));
    }
}
