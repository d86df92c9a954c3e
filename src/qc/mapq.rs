//! Mean mapping quality extraction from alignment stat files.

use crate::error::{Result, SummaryError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read the mean MAPQ from a stat file.
///
/// Only the first line matters, expected shape `<label>=<value>`. Anything
/// else (empty file, no `=`, non-numeric value) is a [`SummaryError::MalformedStat`].
pub fn read_mapq<P: AsRef<Path>>(path: P) -> Result<f64> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut first_line = String::new();
    reader.read_line(&mut first_line)?;

    first_line
        .split_once('=')
        .and_then(|(_, value)| value.trim().parse().ok())
        .ok_or_else(|| SummaryError::MalformedStat {
            path: path.to_path_buf(),
        })
}
