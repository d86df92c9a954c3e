//! Low-abundance lineage filtering for abundance matrices.

use crate::data::AbundanceMatrix;
use crate::error::{Result, SummaryError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Name of the catch-all column low-abundance mass is folded into.
pub const OTHERS_LINEAGE: &str = "others";

/// Result of lineage filtering with statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageFilterResult {
    /// Number of lineage columns before filtering (`others` excluded).
    pub n_before: usize,
    /// Number of lineage columns kept.
    pub n_kept: usize,
    /// Names of dropped lineages, folded into `others`.
    pub dropped: Vec<String>,
}

impl std::fmt::Display for LineageFilterResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Lineage Filter Result")?;
        writeln!(f, "  Lineages before: {}", self.n_before)?;
        writeln!(f, "  Lineages kept:   {}", self.n_kept)?;
        writeln!(f, "  Lineages folded: {}", self.dropped.len())?;
        if !self.dropped.is_empty() {
            writeln!(f, "  Folded into '{}': {}", OTHERS_LINEAGE, self.dropped.join(", "))?;
        }
        Ok(())
    }
}

/// Drop lineages whose abundance never reaches `min_threshold`.
///
/// A lineage is kept when its maximum observed fraction across all rows is at
/// least the threshold. Dropped mass is folded into the `others` column,
/// which is never itself dropped and ends up as the last lineage column.
///
/// # Arguments
/// * `matrix` - The accumulated abundance matrix
/// * `min_threshold` - Minimum fraction (0.0 to 1.0) a lineage must reach
///
/// # Returns
/// The filtered matrix and statistics about what was folded.
pub fn filter_lineages(
    matrix: &AbundanceMatrix,
    min_threshold: f64,
) -> Result<(AbundanceMatrix, LineageFilterResult)> {
    if !(0.0..=1.0).contains(&min_threshold) {
        return Err(SummaryError::InvalidParameter(
            "lineage_min_threshold must be between 0 and 1".to_string(),
        ));
    }
    if matrix.is_empty() {
        return Err(SummaryError::EmptyData(
            "Cannot filter an empty abundance matrix".to_string(),
        ));
    }

    let lineages = matrix.lineages();
    let keep: Vec<usize> = (0..lineages.len())
        .into_par_iter()
        .filter(|&idx| {
            lineages[idx] != OTHERS_LINEAGE
                && matrix.column_max(&lineages[idx]).is_some_and(|max| max >= min_threshold)
        })
        .collect();

    let dropped: Vec<String> = lineages
        .iter()
        .enumerate()
        .filter(|(idx, lineage)| lineage.as_str() != OTHERS_LINEAGE && !keep.contains(idx))
        .map(|(_, lineage)| lineage.clone())
        .collect();

    let n_before = lineages.iter().filter(|l| l.as_str() != OTHERS_LINEAGE).count();
    let filtered = matrix.fold_lineages(&keep, OTHERS_LINEAGE)?;

    let result = LineageFilterResult {
        n_before,
        n_kept: keep.len(),
        dropped,
    };

    Ok((filtered, result))
}
