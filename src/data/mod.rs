//! Data structures for summary generation.

mod abundance;
mod metadata;
mod summary;

pub use abundance::{timepoint_from_name, AbundanceMatrix, AbundanceProfile, AbundanceRow};
pub use metadata::{MetaRow, MetaTable, SAMPLE_COLUMN, SAMPLE_DATE_COLUMN, TIMEPOINT_COLUMN};
pub use summary::{QcMetrics, SummaryRow, SummaryTable};
